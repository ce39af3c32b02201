use std::fmt;

use http::HeaderValue;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Upstream API key.
///
/// Held as a sensitive header value so it can only ever leave the process
/// as the `X-API-Key` header of an upstream call. `Debug` is redacted and
/// there is no `Display`, so the key cannot end up in a log line or an
/// error message through formatting.
pub struct ApiKey(HeaderValue);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("api key contains characters that are not allowed in an HTTP header")]
pub struct InvalidApiKey;

impl ApiKey {
    /// Blank input means "not configured" and yields `Ok(None)`.
    pub fn new(raw: &str) -> Result<Option<Self>, InvalidApiKey> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let mut value = HeaderValue::from_str(trimmed).map_err(|_| InvalidApiKey)?;
        value.set_sensitive(true);
        Ok(Some(Self(value)))
    }

    pub fn expose_secret(&self) -> &HeaderValue {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// serde helper for `Option<ApiKey>` fields; unset env expansions arrive as "".
pub fn deserialize_api_key<'de, D>(deserializer: D) -> Result<Option<ApiKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(raw) => ApiKey::new(&raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_unconfigured() {
        assert!(ApiKey::new("").unwrap().is_none());
        assert!(ApiKey::new("   ").unwrap().is_none());
    }

    #[test]
    fn debug_output_never_contains_the_key() {
        let key = ApiKey::new("vb_live_0123456789").unwrap().unwrap();
        let printed = format!("{:?}", key);
        assert_eq!(printed, "[REDACTED]");
        assert!(key.expose_secret().is_sensitive());
        assert_eq!(key.expose_secret().as_bytes(), b"vb_live_0123456789");
    }

    #[test]
    fn header_breaking_key_is_rejected() {
        assert_eq!(ApiKey::new("abc\ndef").unwrap_err(), InvalidApiKey);
    }

    #[test]
    fn deserializes_from_yaml() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "deserialize_api_key")]
            api_key: Option<ApiKey>,
        }

        let holder: Holder = serde_yaml::from_str("api_key: secret-123").unwrap();
        assert!(holder.api_key.is_some());

        let holder: Holder = serde_yaml::from_str("api_key: \"\"").unwrap();
        assert!(holder.api_key.is_none());

        let holder: Holder = serde_yaml::from_str("{}").unwrap();
        assert!(holder.api_key.is_none());
    }
}
