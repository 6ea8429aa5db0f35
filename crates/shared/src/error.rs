use serde::{Deserialize, Serialize};

/// Error payload returned by the contacts API on non-success responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    /// Best-effort extraction of the server message from a raw body.
    pub fn message_from_bytes(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ApiErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}
