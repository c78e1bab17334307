//! Chat frames.
//!
//! Outbound frames are a flat `{text, target_lang}` record. Inbound frames are
//! tagged by `type` for server notices; anything without a recognized tag is
//! a chat result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chat line sent to the server for translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub text: String,
    pub target_lang: String,
}

impl OutboundMessage {
    /// A chat message asking for translation into `target_lang`.
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target_lang: target_lang.into(),
        }
    }

    /// Encode as a single text frame.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A frame received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Server notice (`{"type": "system", "message": ...}`).
    System { message: String },
    /// Pipeline progress (`{"type": "status", "message": ...}`).
    Status { message: String },
    /// Untagged chat payload, optionally carrying the translation.
    ChatResult {
        text: String,
        translation_text: Option<String>,
    },
    /// Untagged failure reply (`{"error": ...}`) sent when translation fails.
    ServerError { message: String },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Tagged {
    System { message: String },
    Status { message: String },
}

#[derive(Deserialize)]
struct Untagged {
    text: Option<String>,
    translation_text: Option<String>,
    error: Option<String>,
}

impl InboundMessage {
    /// Decode a text frame.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(raw)?;

        match value.get("type").and_then(Value::as_str) {
            Some("system" | "status") => {
                let tagged: Tagged = serde_json::from_value(value)?;
                Ok(match tagged {
                    Tagged::System { message } => Self::System { message },
                    Tagged::Status { message } => Self::Status { message },
                })
            }
            _ => {
                let body: Untagged = serde_json::from_value(value)?;
                match body {
                    Untagged {
                        text: Some(text),
                        translation_text,
                        ..
                    } => Ok(Self::ChatResult {
                        text,
                        // An empty translation renders the same as none.
                        translation_text: translation_text.filter(|t| !t.is_empty()),
                    }),
                    Untagged {
                        error: Some(message),
                        ..
                    } => Ok(Self::ServerError { message }),
                    _ => Err(ProtocolError::MissingText),
                }
            }
        }
    }
}

/// Error decoding or encoding a chat frame.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("untagged frame has neither `text` nor `error`")]
    MissingText,
}
