//! Error types for target persistence.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while persisting or loading a target.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem read/write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored data could not be serialized or parsed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
