use reqwest::StatusCode;
use thiserror::Error;

pub const UNKNOWN_SERVER_ERROR: &str = "unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    Rejected,
    NoResponse,
    Malformed,
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The server answered, but not with a usable success response.
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
    /// The request went out and nothing usable came back.
    #[error("no response from server: {reason}")]
    NoResponse { reason: String },
    /// The request could not be built or sent at all.
    #[error("request could not be sent: {message}")]
    Malformed { message: String },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn rejected(status: StatusCode, message: Option<String>) -> Self {
        Self::Rejected {
            status,
            message: message.unwrap_or_else(|| UNKNOWN_SERVER_ERROR.to_string()),
        }
    }

    pub fn no_response(reason: impl Into<String>) -> Self {
        Self::NoResponse {
            reason: reason.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            Self::Rejected { .. } => GatewayErrorKind::Rejected,
            Self::NoResponse { .. } => GatewayErrorKind::NoResponse,
            Self::Malformed { .. } => GatewayErrorKind::Malformed,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Classifies a transport error from reqwest. Anything that failed while
    /// building the request counts as malformed; everything else happened on
    /// the wire.
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_builder() {
            return Self::malformed(error.to_string());
        }
        if let Some(status) = error.status() {
            return Self::rejected(status, None);
        }
        Self::no_response(error.to_string())
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(value: url::ParseError) -> Self {
        Self::malformed(format!("invalid API base url: {value}"))
    }
}
