//! HTTP and SSE client for Concourse-style CI servers.
//!
//! This crate covers the whole login-to-logs path: discovering what
//! authentication a team requires, resolving that into one acquisition
//! flow, trading a credential for a bearer token, fetching typed build and
//! job lists, and streaming live build logs over a long-lived server-push
//! connection.
//!
//! # Example
//!
//! ```no_run
//! use contrail_client::{AuthFlow, ConcourseClient, LogStream, TokenProvider};
//! use contrail_session::create_memory_target_store;
//! use contrail_types::Target;
//!
//! # async fn example() -> contrail_client::Result<()> {
//! let client = ConcourseClient::builder()
//!     .base_url("https://ci.example.com")
//!     .build()?;
//!
//! // What does this team require?
//! let methods = client.auth().methods("main").await?;
//! let provider = match contrail_client::resolve(&methods) {
//!     AuthFlow::Unauthenticated => TokenProvider::Unauthenticated,
//!     AuthFlow::ChooseCredential(_) => TokenProvider::Basic {
//!         username: "user".into(),
//!         password: "pass".into(),
//!     },
//!     AuthFlow::DelegatedDirect(_) | AuthFlow::Unsupported => return Ok(()),
//! };
//!
//! let token = provider.acquire(&client.auth(), "main").await?;
//! let target = Target::new("prod", "https://ci.example.com", "main", token);
//!
//! // Stream logs for a build.
//! let store = create_memory_target_store();
//! let builds = client.builds().list(&target.token).await?;
//! let mut stream = LogStream::new(client.clone(), target, builds[0].id, store);
//! let mut batches = stream.start()?;
//! while let Some(batch) = batches.recv().await {
//!     for event in batch {
//!         println!("{}", event.payload);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod decode;
pub mod error;
pub mod logs;
pub mod resolver;
pub mod styling;

pub use api::{AuthApi, BuildsApi, JobsApi, TokenProvider};
pub use client::{ClientBuilder, ConcourseClient};
pub use decode::{decode_elements, optional_str_array, optional_u64, require_i64, require_str};
pub use error::{Error, Result};
pub use logs::{LogEvents, LogStream, LogStreamState, StreamFailure};
pub use resolver::{resolve, AuthFlow};
pub use styling::strip_styling;
