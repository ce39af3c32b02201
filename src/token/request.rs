use serde::Deserialize;

use crate::token::error::TokenError;
use crate::utils::constants::{
    DEFAULT_PARTICIPANT_NAME, MAX_PARTICIPANT_NAME_CHARS, MAX_SESSION_ID_CHARS,
};

/// Raw query string of `GET /api/voice-token`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct TokenQuery {
    pub participant_name: Option<String>,
    pub session_id: Option<String>,
}

/// A request that passed validation; nothing has been sent anywhere yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub participant_name: String,
    pub session_id: Option<String>,
}

impl TokenQuery {
    /// Build from raw query pairs. A repeated key keeps its last value,
    /// unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        pairs
            .into_iter()
            .fold(TokenQuery::default(), |mut query, (key, value)| {
                match key.as_str() {
                    "participant_name" => query.participant_name = Some(value),
                    "session_id" => query.session_id = Some(value),
                    _ => {}
                }
                query
            })
    }

    pub fn validate(self) -> Result<TokenRequest, TokenError> {
        let participant_name = self
            .participant_name
            .unwrap_or_else(|| DEFAULT_PARTICIPANT_NAME.to_string());
        if participant_name.chars().count() > MAX_PARTICIPANT_NAME_CHARS {
            return Err(TokenError::Validation(format!(
                "participant_name must be at most {} characters",
                MAX_PARTICIPANT_NAME_CHARS
            )));
        }

        // an empty session_id means "generate one for me"
        let session_id = self.session_id.filter(|id| !id.is_empty());
        if let Some(id) = &session_id {
            if id.chars().count() > MAX_SESSION_ID_CHARS {
                return Err(TokenError::Validation(format!(
                    "session_id must be at most {} characters",
                    MAX_SESSION_ID_CHARS
                )));
            }
        }

        Ok(TokenRequest {
            participant_name,
            session_id,
        })
    }
}
