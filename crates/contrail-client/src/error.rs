//! Client error types.

use thiserror::Error;

use contrail_types::DeserializationError;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The server could not be reached at the transport level.
    #[error("Could not reach server: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The credential was rejected or has expired. Carries the server's
    /// detail text when it sent any.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A single-object payload was not the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] DeserializationError),

    /// Server returned a non-success status outside the 401 class.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Body text from the server.
        message: String,
    },

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `start()` was called on a log stream that already left `Idle`.
    #[error("Log stream has already been started")]
    AlreadyStarted,
}

impl Error {
    /// Check if this is an authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
