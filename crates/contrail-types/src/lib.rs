//! Shared domain types for the Contrail CI client.
//!
//! Pure data, no I/O: auth methods and tokens, the persisted [`Target`],
//! build and job snapshots, log events, and the error kinds attached to
//! records that fail to decode.

pub mod auth;
pub mod build;
pub mod error;
pub mod job;
pub mod log;
pub mod target;

pub use auth::{AuthMethod, AuthMethodKind, Token};
pub use build::{Build, BuildStatus};
pub use error::{DeserializationError, DeserializationErrorKind};
pub use job::{group_jobs, Job, JobGroup};
pub use log::LogEvent;
pub use target::Target;
