//! # VoiceOps Bridge
//!
//! Keeps the Vocal Bridge API key on the server and mints short-lived
//! LiveKit session tokens for browser clients.
//!
//! Modules:
//! - `config`: service configuration, loading and validation
//! - `token`: voice token request validation, correlation ids and composition
//! - `upstream`: Vocal Bridge token API client
//! - `server`: axum router: health, voice token, policy, metrics
//! - `logs`: call-log summary used by `vb-log-summary`

pub mod config;
pub mod helpers;
pub mod logs;
pub mod observability;
pub mod server;
pub mod token;
pub mod upstream;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::token::issue::issue_voice_token;
