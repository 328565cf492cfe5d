use thiserror::Error;

pub const TRANSPORT_MESSAGE: &str = "Cannot connect to server. Please ensure the backend is running.";
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please wait before trying again.";
pub const EXECUTION_FAILED_MESSAGE: &str = "Execution failed";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// Why a run did not produce a backend result.
///
/// `Display` is the text shown to the user. Transport failures and
/// application failures stay distinct because the remedy differs: retry
/// later versus fix the code.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{}", TRANSPORT_MESSAGE)]
    Transport(#[source] reqwest::Error),

    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,

    #[error("{message}")]
    Application { status: u16, message: String },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("{}", .0.as_deref().unwrap_or(UNEXPECTED_MESSAGE))]
    Unexpected(Option<String>),
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// Classify a reqwest failure that happened before a response arrived.
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Unexpected(Some("Request timed out".to_string()))
        } else if err.is_connect() || err.is_request() {
            ClientError::Transport(err)
        } else if err.is_decode() || err.is_body() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Unexpected(Some(err.to_string()))
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage corruption: {0}")]
    Corruption(String),

    #[error("storage lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}
