//! Voice token issuance: validation, correlation id, composition and the
//! orchestration tying them to the upstream client.

pub mod compose;
pub mod correlation;
pub mod error;
pub mod issue;
pub mod request;
