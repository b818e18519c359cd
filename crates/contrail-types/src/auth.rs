//! Auth methods and bearer tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of authentication a server can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMethodKind {
    /// Username/password credentials sent directly to the server.
    Basic,
    /// A third party issues a token the server then validates
    /// (GitHub-style OAuth).
    Delegated,
    /// Advertised by the server but not something this client can perform.
    Unsupported,
}

impl AuthMethodKind {
    /// Map the server's wire `type` string to a kind.
    ///
    /// Anything unrecognized maps to [`AuthMethodKind::Unsupported`] rather
    /// than rejecting the record; the flow resolver filters those out.
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "basic" => AuthMethodKind::Basic,
            "oauth" => AuthMethodKind::Delegated,
            _ => AuthMethodKind::Unsupported,
        }
    }
}

/// One authentication method advertised by the server for a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMethod {
    /// What kind of flow this method requires.
    pub kind: AuthMethodKind,
    /// Server-provided label for choosers.
    pub display_name: String,
    /// Where the flow starts (the third-party page for delegated auth).
    pub auth_url: String,
}

impl AuthMethod {
    pub fn new(
        kind: AuthMethodKind,
        display_name: impl Into<String>,
        auth_url: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            display_name: display_name.into(),
            auth_url: auth_url.into(),
        }
    }
}

/// An opaque bearer credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The raw bearer value.
    pub value: String,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

// Tokens end up in logs via state dumps; keep the value out of Debug.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(redacted)")
    }
}
