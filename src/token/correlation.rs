use uuid::Uuid;

use crate::utils::constants::CORRELATION_ID_PREFIX;

/// Caller-supplied session id, or a fresh `vo-<uuid v4>`.
pub fn resolve_correlation_id(session_id: Option<&str>) -> String {
    match session_id {
        Some(id) => id.to_owned(),
        None => format!("{}{}", CORRELATION_ID_PREFIX, Uuid::new_v4()),
    }
}

/// `true` for ids shaped like the ones `resolve_correlation_id` generates.
pub fn is_generated_correlation_id(id: &str) -> bool {
    id.strip_prefix(CORRELATION_ID_PREFIX)
        .and_then(|rest| Uuid::try_parse(rest).ok())
        .is_some()
}
