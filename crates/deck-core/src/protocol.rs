use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outbound command envelope, serialized as
/// `{"command": "start"|"stop"|"pause"|"resume"|"get_status", "task"?: ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Start { task: String },
    Stop,
    Pause,
    Resume,
    GetStatus,
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown event type: {0}")]
    UnknownType(String),
    #[error("event type {0} carries no message")]
    MissingMessage(&'static str),
}

/// Inbound event, parsed from `{"type": ..., "message"?, "is_running"?}`.
///
/// This is the only place the wire's string-typed `type` field is matched;
/// everything downstream dispatches on the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    StatusReport { is_running: bool },
    ToolInvocation(String),
    TaskSucceeded(String),
    TaskFailed { message: String, retrying: bool },
    SystemNotice(String),
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    is_running: Option<bool>,
}

impl RemoteEvent {
    pub fn parse(frame: &str) -> Result<Self, EnvelopeError> {
        let raw: RawEnvelope = serde_json::from_str(frame)?;
        let message = |name| raw.message.clone().ok_or(EnvelopeError::MissingMessage(name));
        match raw.kind.as_str() {
            "status" => Ok(Self::StatusReport {
                is_running: raw.is_running.unwrap_or(false),
            }),
            "tool" => Ok(Self::ToolInvocation(message("tool")?)),
            "success" => Ok(Self::TaskSucceeded(message("success")?)),
            "error" => {
                let message = message("error")?;
                // The server marks soft retries only inside the human-readable
                // text; there is no structured field to key off.
                let retrying = message.contains("Retrying");
                Ok(Self::TaskFailed { message, retrying })
            }
            "system" => Ok(Self::SystemNotice(message("system")?)),
            other => Err(EnvelopeError::UnknownType(other.to_string())),
        }
    }
}
