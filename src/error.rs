//! Error types shared by the planner and its upstream clients.

/// Result type for planner operations
pub type AstroResult<T> = Result<T, AstroError>;

/// Error type for planner operations
#[derive(Debug, thiserror::Error)]
pub enum AstroError {
    /// Upstream answered, but the payload did not have the expected shape
    #[error("Unexpected upstream data: {0}")]
    UpstreamData(String),

    /// Upstream could not be reached, timed out, or answered with a non-success status
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid {field}: {message}")]
    InvalidParameter { field: String, message: String },
}

impl AstroError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AstroError::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AstroError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AstroError::UpstreamData(e.to_string())
        } else {
            AstroError::UpstreamUnavailable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AstroError {
    fn from(e: serde_json::Error) -> Self {
        AstroError::UpstreamData(e.to_string())
    }
}
