use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::upstream::client::UpstreamCredentialResponse;

/// Body returned to the browser: whatever upstream sent plus `session_id`.
///
/// Upstream is trusted at this boundary; fields such as `livekit_url` are
/// not checked for presence and pass through as received.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct TokenPayload(Map<String, Value>);

impl TokenPayload {
    pub fn session_id(&self) -> Option<&str> {
        self.0.get("session_id").and_then(Value::as_str)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Typed view of a well-formed [`TokenPayload`], for clients of the endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct VoiceToken {
    pub livekit_url: String,
    pub token: String,
    pub room_name: String,
    pub participant_identity: String,
    pub expires_in: i64,
    #[serde(default)]
    pub agent_mode: Option<String>,
    pub session_id: String,
}

/// Backfill `session_id` only when upstream did not echo one.
pub fn compose(upstream: UpstreamCredentialResponse, correlation_id: String) -> TokenPayload {
    let mut body = upstream.0;
    body.entry("session_id")
        .or_insert_with(|| Value::String(correlation_id));
    TokenPayload(body)
}
