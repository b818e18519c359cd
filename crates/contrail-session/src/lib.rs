//! Target persistence for the Contrail CI client.
//!
//! A target is the logged-in identity: server URL, team, and bearer token.
//! This crate owns the "at most one active target" rule behind an opaque
//! store abstraction.
//!
//! # Components
//!
//! - [`store`] — the [`TargetStore`] trait plus file-backed and in-memory
//!   implementations

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{
    create_memory_target_store, create_target_store, FileTargetStore, InMemoryTargetStore,
    SharedTargetStore, TargetStore, TARGET_FILE,
};
