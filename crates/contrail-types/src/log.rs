//! Log events delivered by the live log stream.

/// One line of build log output.
///
/// Transient: produced by the log channel, never persisted. The payload
/// has already had terminal styling codes stripped by the time it reaches
/// a consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub payload: String,
}

impl LogEvent {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}
