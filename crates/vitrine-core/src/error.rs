//! Error types for Vitrine Core.

use thiserror::Error;

/// Result type alias for Vitrine operations.
pub type Result<T> = std::result::Result<T, VitrineError>;

/// Main error type for the Vitrine framework.
#[derive(Debug, Error)]
pub enum VitrineError {
    /// The commerce API returned an `errors` array or an unexpected payload.
    #[error("API error: {0}")]
    Api(String),

    /// A mutation succeeded at transport level but reported user errors.
    #[error("{0}")]
    UserError(String),

    /// A loader lookup came back empty. Propagated to the hosting
    /// framework's error boundary rather than caught at the action level.
    #[error("{0} not found")]
    NotFound(String),

    /// The customer is not logged in.
    #[error("Unauthorized")]
    Unauthorized,

    /// The form was submitted with an HTTP method the handler does not accept.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    /// Form body could not be decoded.
    #[error("Form error: {0}")]
    Form(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network request failed.
    #[error("Network error: {0}")]
    Network(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VitrineError {
    /// HTTP status the action layer reports for this error.
    pub fn status(&self) -> u16 {
        match self {
            VitrineError::Unauthorized => 401,
            VitrineError::NotFound(_) => 404,
            VitrineError::MethodNotAllowed(_) => 405,
            _ => 400,
        }
    }
}
