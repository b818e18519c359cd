//! API endpoint implementations.

mod auth;
mod builds;
mod jobs;

pub use auth::{AuthApi, TokenProvider};
pub use builds::BuildsApi;
pub use jobs::JobsApi;
