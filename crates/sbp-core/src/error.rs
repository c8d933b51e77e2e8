use thiserror::Error;

/// Failure talking to the backend REST API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("network: {0}")]
    Transport(String),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("decode: {0}")]
    Decode(String),
}

impl BackendError {
    /// Message the backend attached to a rejection, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            BackendError::Rejected {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, BackendError::Rejected { status, .. } if (400..500).contains(status))
    }
}
