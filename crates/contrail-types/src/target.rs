//! The persisted binding of server + team + token.

use serde::{Deserialize, Serialize};

use crate::auth::Token;

/// One authenticated binding to a server and team.
///
/// Created on successful token acquisition, optionally persisted by a
/// target store, and destroyed on logout or when the server rejects the
/// token mid-stream. All four fields round-trip through serde losslessly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Local label for this target.
    pub name: String,
    /// Base URL of the server's API.
    pub api_url: String,
    /// Team the token was issued for.
    pub team_name: String,
    /// The bearer token.
    pub token: Token,
}

impl Target {
    pub fn new(
        name: impl Into<String>,
        api_url: impl Into<String>,
        team_name: impl Into<String>,
        token: Token,
    ) -> Self {
        Self {
            name: name.into(),
            api_url: api_url.into(),
            team_name: team_name.into(),
            token,
        }
    }
}
