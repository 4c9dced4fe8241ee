use models::ErrorCode;
use thiserror::Error;

/// Error for token persistence
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced to callers of the API client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The session is gone; the user has to log in again.
    #[error("Login required")]
    LoginRequired,

    #[error("{message}")]
    Api {
        status: u16,
        code: ErrorCode,
        message: String,
        field: Option<String>,
    },

    #[error("Unexpected response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("Invalid input: {0}")]
    Validation(#[from] models::ValidationError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Protocol error code, for errors that came back from the server.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_login_required(&self) -> bool {
        matches!(self, ClientError::LoginRequired)
    }
}
