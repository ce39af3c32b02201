use std::fmt;

use tracing::{debug, info, warn};

use crate::config::secret::ApiKey;
use crate::token::compose::{compose, TokenPayload};
use crate::token::correlation::resolve_correlation_id;
use crate::token::error::TokenError;
use crate::token::request::TokenQuery;
use crate::upstream::client::{IssueCredentials, UpstreamCredentialRequest};

/// Steps a token request moves through; a failure stops at the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuanceStage {
    Received,
    Validated,
    CorrelationResolved,
    UpstreamCalled,
    Composed,
}

impl fmt::Display for IssuanceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssuanceStage::Received => "received",
            IssuanceStage::Validated => "validated",
            IssuanceStage::CorrelationResolved => "correlation_resolved",
            IssuanceStage::UpstreamCalled => "upstream_called",
            IssuanceStage::Composed => "composed",
        };
        f.write_str(name)
    }
}

/// Validate, resolve the correlation id, call upstream once, compose.
///
/// The key check sits after correlation and before the call, so a missing
/// key never produces outbound traffic.
pub async fn issue_voice_token<C>(
    issuer: &C,
    api_key: Option<&ApiKey>,
    query: TokenQuery,
) -> Result<TokenPayload, TokenError>
where
    C: IssueCredentials + Sync,
{
    let mut stage = IssuanceStage::Received;
    let result = run(issuer, api_key, query, &mut stage).await;
    if let Err(err) = &result {
        warn!(stage = %stage, kind = err.kind(), "voice token request failed: {}", err);
    }
    result
}

async fn run<C>(
    issuer: &C,
    api_key: Option<&ApiKey>,
    query: TokenQuery,
    stage: &mut IssuanceStage,
) -> Result<TokenPayload, TokenError>
where
    C: IssueCredentials + Sync,
{
    let request = query.validate()?;
    advance(stage, IssuanceStage::Validated);

    let session_id = resolve_correlation_id(request.session_id.as_deref());
    advance(stage, IssuanceStage::CorrelationResolved);

    let api_key = api_key.ok_or(TokenError::MissingSecret)?;

    info!(
        participant_name = %request.participant_name,
        session_id = %session_id,
        "requesting voice token from upstream"
    );
    let upstream_request = UpstreamCredentialRequest {
        participant_name: request.participant_name,
        session_id: session_id.clone(),
    };
    let upstream = issuer.issue_credentials(api_key, &upstream_request).await?;
    advance(stage, IssuanceStage::UpstreamCalled);

    let payload = compose(upstream, session_id);
    advance(stage, IssuanceStage::Composed);
    Ok(payload)
}

fn advance(stage: &mut IssuanceStage, next: IssuanceStage) {
    debug!(from = %stage, to = %next, "voice token stage");
    *stage = next;
}
