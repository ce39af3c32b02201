pub mod routes;
pub mod server;
pub mod voice_token;
