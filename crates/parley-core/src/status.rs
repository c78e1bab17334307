//! Liveness endpoint body and notification severity.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One `GET /status` response body.
///
/// Equality is structural over the whole body, so fields this client does not
/// know about still count as a change. An explicit `"message": null` is kept
/// in `extra` and differs from an absent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl<'de> Deserialize<'de> for StatusSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut extra = Map::<String, Value>::deserialize(deserializer)?;

        let status = match extra.remove("status") {
            Some(Value::String(status)) => status,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "`status` must be a string, got {other}"
                )));
            }
            None => return Err(D::Error::missing_field("status")),
        };

        let message = match extra.remove("message") {
            Some(Value::String(message)) => Some(message),
            Some(Value::Null) => {
                extra.insert("message".to_string(), Value::Null);
                None
            }
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "`message` must be a string, got {other}"
                )));
            }
            None => None,
        };

        Ok(Self {
            status,
            message,
            extra,
        })
    }
}

impl StatusSnapshot {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Severity implied by the status string.
    pub fn severity(&self) -> Severity {
        match self.status.as_str() {
            "online" | "ok" => Severity::Success,
            "offline" | "error" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }

    /// Text shown to the user: the server's message, or a generic line.
    pub fn headline(&self) -> String {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => format!("Server status: {}", self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_mapping() {
        let cases = [
            ("online", Severity::Success),
            ("ok", Severity::Success),
            ("offline", Severity::Error),
            ("error", Severity::Error),
            ("warning", Severity::Warning),
            ("degraded", Severity::Info),
            ("No status message available.", Severity::Info),
        ];
        for (status, expected) in cases {
            assert_eq!(StatusSnapshot::new(status).severity(), expected, "{status}");
        }
    }

    #[test]
    fn headline_prefers_message() {
        assert_eq!(StatusSnapshot::new("ok").headline(), "Server status: ok");
        assert_eq!(
            StatusSnapshot::new("offline").with_message("db down").headline(),
            "db down"
        );
        assert_eq!(
            StatusSnapshot::new("ok").with_message("").headline(),
            "Server status: ok"
        );
    }

    #[test]
    fn extra_fields_take_part_in_equality() {
        let a: StatusSnapshot = serde_json::from_str(r#"{"status":"ok","load":1}"#).unwrap();
        let b: StatusSnapshot = serde_json::from_str(r#"{"status":"ok","load":2}"#).unwrap();
        let c: StatusSnapshot = serde_json::from_str(r#"{"load":1,"status":"ok"}"#).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn null_message_differs_from_absent() {
        let absent: StatusSnapshot = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        let null: StatusSnapshot =
            serde_json::from_str(r#"{"status":"ok","message":null}"#).unwrap();

        assert_ne!(absent, null);
        assert_eq!(null.message, None);
        assert_eq!(null.headline(), "Server status: ok");
        assert_eq!(
            serde_json::to_string(&null).unwrap(),
            r#"{"status":"ok","message":null}"#
        );
    }

    #[test]
    fn message_must_be_text() {
        let parse = serde_json::from_str::<StatusSnapshot>;
        assert!(parse(r#"{"status":"ok","message":3}"#).is_err());
        assert!(parse(r#"{"status":1}"#).is_err());
    }

    #[test]
    fn status_is_required() {
        assert!(serde_json::from_str::<StatusSnapshot>(r#"{"message":"hi"}"#).is_err());
    }
}
