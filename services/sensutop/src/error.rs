//! Error types for sensutop

/// Errors that can occur in sensutop
#[derive(Debug, thiserror::Error)]
pub enum SensutopError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Fetching events from '{endpoint}' failed: {reason}")]
    FetchFailed { endpoint: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type alias for sensutop operations
pub type Result<T> = std::result::Result<T, SensutopError>;
