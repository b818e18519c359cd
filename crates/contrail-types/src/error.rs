//! Errors attached to payloads and records that fail to decode.

use thiserror::Error;

/// Why a payload or a single record within one could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeserializationErrorKind {
    /// The payload as a whole is not the expected shape.
    InvalidFormat,
    /// A required field is absent.
    MissingField,
    /// A field exists but has the wrong type.
    TypeMismatch,
}

/// A decode failure for one payload or one record.
///
/// In list contexts this is attached to a single record and never aborts
/// its siblings; in single-object contexts (a token response, say) it is
/// fatal to the whole payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{details}")]
pub struct DeserializationError {
    /// Human-readable detail, including the field name where relevant.
    pub details: String,
    /// Error classification.
    pub kind: DeserializationErrorKind,
}

impl DeserializationError {
    /// The payload is not the expected shape.
    pub fn invalid_format(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
            kind: DeserializationErrorKind::InvalidFormat,
        }
    }

    /// A required field is missing.
    pub fn missing_field(field: &str) -> Self {
        Self {
            details: format!("Missing required '{}' field", field),
            kind: DeserializationErrorKind::MissingField,
        }
    }

    /// A field has the wrong type.
    pub fn type_mismatch(field: &str, expected: &str) -> Self {
        Self {
            details: format!("Expected value for '{}' field to be {}", field, expected),
            kind: DeserializationErrorKind::TypeMismatch,
        }
    }
}
