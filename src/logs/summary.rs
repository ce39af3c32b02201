//! Summary of Vocal Bridge call logs as printed by `vb-log-summary`.
//!
//! The `vb logs list --json` output is not a fixed schema, so sessions are
//! located by shape and fields are read through lists of alias keys.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

const SESSION_LIST_KEYS: [&str; 3] = ["sessions", "data", "items"];
const LATEST_SESSIONS_SHOWN: usize = 10;

pub type Session = Map<String, Value>;

/// Sessions from a top-level list, a wrapped list, or a single session object.
pub fn extract_sessions(payload: &Value) -> Vec<&Session> {
    match payload {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(map) => {
            for key in SESSION_LIST_KEYS {
                if let Some(Value::Array(items)) = map.get(key) {
                    return items.iter().filter_map(Value::as_object).collect();
                }
            }
            if map.contains_key("session_id") || map.contains_key("id") {
                vec![map]
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

/// First non-null value among `keys`.
pub fn pick<'a>(session: &'a Session, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| session.get(*key))
        .find(|value| !value.is_null())
}

fn render(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => default.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLine {
    pub session_id: String,
    pub status: String,
    pub started: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSummary {
    pub fetched: usize,
    /// most common first; ties keep first-seen order
    pub by_status: Vec<(String, usize)>,
    pub latest: Vec<SessionLine>,
}

impl LogSummary {
    pub fn from_sessions(sessions: &[&Session]) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();
        for session in sessions {
            let status = render(pick(session, &["status", "state"]), "unknown").to_lowercase();
            let count = counts.entry(status.clone()).or_insert(0);
            if *count == 0 {
                first_seen.push(status);
            }
            *count += 1;
        }
        let mut by_status: Vec<(String, usize)> = first_seen
            .into_iter()
            .map(|status| {
                let count = counts[&status];
                (status, count)
            })
            .collect();
        by_status.sort_by(|a, b| b.1.cmp(&a.1));

        let latest = sessions
            .iter()
            .take(LATEST_SESSIONS_SHOWN)
            .map(|session| SessionLine {
                session_id: render(pick(session, &["session_id", "id"]), "?"),
                status: render(pick(session, &["status", "state"]), "?"),
                started: render(
                    pick(session, &["started_at", "start_time", "created_at"]),
                    "None",
                ),
                duration: render(pick(session, &["duration_seconds", "duration"]), "None"),
            })
            .collect();

        Self {
            fetched: sessions.len(),
            by_status,
            latest,
        }
    }
}

impl fmt::Display for LogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n== VoiceOps Bridge: Vocal Bridge call log summary ==")?;
        writeln!(f, "Fetched sessions: {}", self.fetched)?;
        writeln!(f, "By status:")?;
        for (status, count) in &self.by_status {
            writeln!(f, "  - {}: {}", status, count)?;
        }
        writeln!(f, "\nLatest sessions:")?;
        for line in &self.latest {
            writeln!(
                f,
                "  - {} | {} | started={} | duration={}",
                line.session_id, line.status, line.started, line.duration
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_sessions_in_every_supported_shape() {
        let list = json!([{"id": "a"}, 3, {"id": "b"}]);
        assert_eq!(extract_sessions(&list).len(), 2);

        for key in ["sessions", "data", "items"] {
            let wrapped = json!({ key: [{"id": "a"}] });
            assert_eq!(extract_sessions(&wrapped).len(), 1, "{key}");
        }

        let single = json!({"session_id": "s1", "status": "completed"});
        assert_eq!(extract_sessions(&single).len(), 1);

        assert!(extract_sessions(&json!({"total": 0})).is_empty());
        assert!(extract_sessions(&json!("nope")).is_empty());
    }

    #[test]
    fn pick_skips_nulls_and_follows_alias_order() {
        let session = json!({"status": null, "state": "Failed"});
        let session = session.as_object().unwrap();
        assert_eq!(pick(session, &["status", "state"]), Some(&json!("Failed")));
        assert_eq!(pick(session, &["missing"]), None);
    }

    #[test]
    fn counts_statuses_case_insensitively_most_common_first() {
        let payload = json!({"sessions": [
            {"session_id": "s1", "status": "completed", "started_at": "2026-10-01T10:00:00Z", "duration_seconds": 42},
            {"session_id": "s2", "state": "FAILED"},
            {"id": "s3", "status": "failed"},
            {"id": "s4"}
        ]});
        let sessions = extract_sessions(&payload);
        let summary = LogSummary::from_sessions(&sessions);

        assert_eq!(summary.fetched, 4);
        assert_eq!(
            summary.by_status,
            vec![
                ("failed".to_string(), 2),
                ("completed".to_string(), 1),
                ("unknown".to_string(), 1)
            ]
        );
        assert_eq!(summary.latest[0].duration, "42");
        assert_eq!(summary.latest[3].status, "?");

        let printed = summary.to_string();
        assert!(printed.contains("Fetched sessions: 4"));
        assert!(printed.contains("  - s1 | completed | started=2026-10-01T10:00:00Z | duration=42"));
        assert!(printed.contains("  - s4 | ? | started=None | duration=None"));
    }

    #[test]
    fn shows_at_most_ten_latest_sessions() {
        let sessions: Vec<Value> = (0..15).map(|i| json!({"id": format!("s{i}")})).collect();
        let payload = Value::Array(sessions);
        let summary = LogSummary::from_sessions(&extract_sessions(&payload));
        assert_eq!(summary.latest.len(), 10);
        assert_eq!(summary.latest[9].session_id, "s9");
    }
}
