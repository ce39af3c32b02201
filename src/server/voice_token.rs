use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use tracing::debug;

use crate::observability::metrics::get_metrics;
use crate::server::server::AppState;
use crate::token::compose::TokenPayload;
use crate::token::error::TokenError;
use crate::token::issue::issue_voice_token;
use crate::token::request::TokenQuery;

static OK_MSG: &str = "ok";
static MALFORMED_QUERY_MSG: &str = "query string is not valid url-encoded text";

/// `GET /api/voice-token`.
///
/// If the browser disconnects, axum drops this future and with it the
/// in-flight upstream request.
pub async fn voice_token(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<TokenPayload>, TokenError> {
    let metrics = get_metrics().await;

    let result = match query {
        Ok(Query(pairs)) => {
            issue_voice_token(
                &state.upstream,
                state.config.upstream.api_key.as_ref(),
                TokenQuery::from_pairs(pairs),
            )
            .await
        }
        Err(rejection) => {
            debug!("query rejected: {}", rejection.body_text());
            Err(TokenError::Validation(MALFORMED_QUERY_MSG.to_string()))
        }
    };

    let outcome = match &result {
        Ok(_) => OK_MSG,
        Err(err) => err.kind(),
    };
    metrics.token_requests.with_label_values(&[outcome]).inc();

    result.map(Json)
}
