//! Vocal Bridge token API client.
//!
//! One `POST <base_url>/api/v1/token` per call, `X-API-Key` header, no retries.
//! Failures are classified into [`UpstreamError`] so the endpoint can map
//! them to client-visible statuses without ever formatting the key.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::secret::ApiKey;
use crate::config::settings::UpstreamConfig;
use crate::helpers::time::get_instant;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::utils::constants::{
    MAX_UPSTREAM_REDIRECTS, UPSTREAM_API_KEY_HEADER, UPSTREAM_ERROR_EXCERPT_CHARS,
    UPSTREAM_TOKEN_PATH,
};

/// Wire body of the upstream call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpstreamCredentialRequest {
    pub participant_name: String,
    pub session_id: String,
}

/// Upstream JSON object, kept open: only `session_id` is ever inspected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamCredentialResponse(pub Map<String, Value>);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// Timeout or transport failure; the message is safe to show to callers.
    #[error("upstream unreachable: {0}")]
    Unreachable(String),
    #[error("upstream rejected the request with status {status}")]
    Rejected { status: u16, excerpt: String },
    #[error("upstream returned a malformed payload: {0}")]
    Malformed(String),
}

pub trait IssueCredentials {
    fn issue_credentials(
        &self,
        api_key: &ApiKey,
        request: &UpstreamCredentialRequest,
    ) -> impl Future<Output = Result<UpstreamCredentialResponse, UpstreamError>> + Send;
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    token_url: Url,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self> {
        let timeout = Duration::try_from_secs_f64(cfg.timeout_seconds)
            .context("upstream.timeout_seconds is out of range")?;
        let token_url = token_url(&cfg.base_url)?;
        let origin = token_url.clone();
        // the key header is custom, reqwest would carry it to any redirect target
        let redirects = Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_UPSTREAM_REDIRECTS {
                attempt.stop()
            } else if redirect_allowed(&origin, attempt.url()) {
                attempt.follow()
            } else {
                warn!("upstream redirected to another origin; not following");
                attempt.stop()
            }
        });
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirects)
            .build()
            .context("failed to build upstream HTTP client")?;

        Ok(Self {
            client,
            token_url,
            timeout,
        })
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }
}

impl IssueCredentials for UpstreamClient {
    async fn issue_credentials(
        &self,
        api_key: &ApiKey,
        request: &UpstreamCredentialRequest,
    ) -> Result<UpstreamCredentialResponse, UpstreamError> {
        let metrics = get_metrics().await;
        let start = get_instant();

        let result = self
            .client
            .post(self.token_url.clone())
            .header(UPSTREAM_API_KEY_HEADER, api_key.expose_secret().clone())
            .json(request)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                observe(metrics, &start, "error");
                return Err(UpstreamError::Unreachable(describe_transport_error(
                    &err,
                    self.timeout,
                )));
            }
        };

        let status = response.status();
        // the total timeout also covers reading the body
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                observe(metrics, &start, "error");
                return Err(UpstreamError::Unreachable(describe_transport_error(
                    &err,
                    self.timeout,
                )));
            }
        };
        observe(metrics, &start, status_class(status));
        debug!(status = status.as_u16(), bytes = body.len(), "upstream responded");

        if !status.is_success() {
            return Err(UpstreamError::Rejected {
                status: status.as_u16(),
                excerpt: excerpt(&body),
            });
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => Ok(UpstreamCredentialResponse(map)),
            Ok(_) => Err(UpstreamError::Malformed(
                "expected a JSON object".to_string(),
            )),
            Err(e) => Err(UpstreamError::Malformed(e.to_string())),
        }
    }
}

fn observe(metrics: &Metrics, start: &Instant, status_class: &str) {
    metrics
        .upstream_requests
        .with_label_values(&[status_class])
        .inc();
    metrics
        .upstream_duration
        .with_label_values(&[status_class])
        .observe(start.elapsed().as_secs_f64());
}

fn token_url(base_url: &str) -> Result<Url> {
    let joined = format!("{}{}", base_url.trim_end_matches('/'), UPSTREAM_TOKEN_PATH);
    Url::parse(&joined).with_context(|| format!("invalid upstream base url '{}'", base_url))
}

/// Same host and port as the token url, or the same host upgraded from
/// http to https on the default port.
fn redirect_allowed(origin: &Url, target: &Url) -> bool {
    if target.host_str() != origin.host_str() {
        return false;
    }
    match (origin.scheme(), target.scheme()) {
        (a, b) if a == b => target.port_or_known_default() == origin.port_or_known_default(),
        ("http", "https") => target.port().is_none(),
        _ => false,
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

/// First `UPSTREAM_ERROR_EXCERPT_CHARS` characters of an upstream body.
pub fn excerpt(body: &str) -> String {
    body.chars().take(UPSTREAM_ERROR_EXCERPT_CHARS).collect()
}

/// Caller-safe description of a transport failure: no URL, no headers.
fn describe_transport_error(err: &reqwest::Error, timeout: Duration) -> String {
    if err.is_timeout() {
        format!("upstream did not respond within {:.1}s", timeout.as_secs_f64())
    } else if err.is_connect() {
        "could not connect to upstream".to_string()
    } else if err.is_body() || err.is_decode() {
        "connection to upstream was interrupted".to_string()
    } else {
        "upstream request could not be completed".to_string()
    }
}
