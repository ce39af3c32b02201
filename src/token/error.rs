use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::upstream::client::UpstreamError;

/// Every way a voice token request can fail.
///
/// Messages are built from the violated constraint, a sanitized transport
/// description or an upstream body excerpt only. The api key never flows
/// into any of them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("{0}")]
    Validation(String),
    #[error("Token service is not configured")]
    MissingSecret,
    #[error("Token request failed: {0}")]
    UpstreamUnreachable(String),
    #[error("Token endpoint error: {excerpt}")]
    UpstreamRejected { status: u16, excerpt: String },
    #[error("Token endpoint returned an invalid payload")]
    UpstreamMalformed(String),
}

impl TokenError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TokenError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TokenError::MissingSecret => StatusCode::INTERNAL_SERVER_ERROR,
            TokenError::UpstreamUnreachable(_) | TokenError::UpstreamMalformed(_) => {
                StatusCode::BAD_GATEWAY
            }
            TokenError::UpstreamRejected { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|code| code.as_u16() >= 400)
                .unwrap_or(StatusCode::BAD_GATEWAY),
        }
    }

    /// Short label for logs and the `outcome` metric.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Validation(_) => "validation_error",
            TokenError::MissingSecret => "missing_secret",
            TokenError::UpstreamUnreachable(_) => "upstream_unreachable",
            TokenError::UpstreamRejected { .. } => "upstream_rejected",
            TokenError::UpstreamMalformed(_) => "upstream_malformed",
        }
    }
}

impl From<UpstreamError> for TokenError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unreachable(message) => TokenError::UpstreamUnreachable(message),
            UpstreamError::Rejected { status, excerpt } => {
                TokenError::UpstreamRejected { status, excerpt }
            }
            UpstreamError::Malformed(reason) => TokenError::UpstreamMalformed(reason),
        }
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_status_is_propagated_when_it_is_an_error_status() {
        let err = TokenError::UpstreamRejected {
            status: 404,
            excerpt: "nope".into(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Token endpoint error: nope");

        let err = TokenError::UpstreamRejected {
            status: 304,
            excerpt: String::new(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn fault_classes() {
        assert!(TokenError::Validation("x".into()).status_code().is_client_error());
        assert_eq!(
            TokenError::MissingSecret.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            TokenError::UpstreamUnreachable("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert!(TokenError::UpstreamMalformed("eof".into())
            .status_code()
            .is_server_error());
    }

    #[test]
    fn malformed_detail_hides_parser_output() {
        let err = TokenError::from(UpstreamError::Malformed("expected value at line 1".into()));
        assert_eq!(err.to_string(), "Token endpoint returned an invalid payload");
    }

    #[test]
    fn unreachable_detail_is_prefixed() {
        let err = TokenError::from(UpstreamError::Unreachable("could not connect to upstream".into()));
        assert_eq!(err.to_string(), "Token request failed: could not connect to upstream");
    }
}
