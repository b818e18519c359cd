//! Auth API: method discovery and token acquisition.

use serde_json::Value;

use contrail_types::{AuthMethod, AuthMethodKind, DeserializationError, Token};

use crate::client::{ConcourseClient, RequestAuth};
use crate::decode::{decode_elements, require_str};
use crate::error::Result;

/// Auth API client.
pub struct AuthApi {
    client: ConcourseClient,
}

impl AuthApi {
    pub(crate) fn new(client: ConcourseClient) -> Self {
        Self { client }
    }

    /// Fetch the auth methods the server advertises for a team.
    ///
    /// Malformed entries in the response are dropped; only a non-array
    /// payload fails the call.
    pub async fn methods(&self, team_name: &str) -> Result<Vec<AuthMethod>> {
        let path = format!("teams/{}/auth/methods", team_name);
        let body = self.client.get_bytes(&path, RequestAuth::None).await?;

        let methods = decode_elements(&body, parse_auth_method)?;
        Ok(methods.collect())
    }

    /// Request a token for a team that requires no credential.
    pub async fn unauthenticated_token(&self, team_name: &str) -> Result<Token> {
        let path = format!("teams/{}/auth/token", team_name);
        let body = self.client.get_bytes(&path, RequestAuth::None).await?;
        Ok(parse_token(&body)?)
    }

    /// Trade basic credentials for a token. A 401-class response surfaces
    /// as [`crate::Error::Unauthorized`] with the server's detail text.
    pub async fn basic_token(
        &self,
        team_name: &str,
        username: &str,
        password: &str,
    ) -> Result<Token> {
        let path = format!("teams/{}/auth/token", team_name);
        let body = self
            .client
            .get_bytes(&path, RequestAuth::Basic(username, password))
            .await?;
        Ok(parse_token(&body)?)
    }

    /// Confirm an externally obtained delegated token against the server.
    ///
    /// Success means the token is live; it does not mint a new one. Once
    /// validated, the external token itself is the session token.
    pub async fn validate_delegated(&self, token: &Token) -> Result<()> {
        self.client
            .get_ok("containers", RequestAuth::Bearer(token))
            .await
    }
}

/// One token acquisition strategy.
///
/// A closed set of variants behind one capability: [`TokenProvider::acquire`].
/// Callers must not invoke the same provider again while a prior
/// acquisition is outstanding; the triggering action stays disabled until
/// the result resolves.
#[derive(Debug, Clone)]
pub enum TokenProvider {
    /// No credential; the team allows anonymous tokens.
    Unauthenticated,
    /// Username/password validated by the server.
    Basic { username: String, password: String },
    /// A token obtained out-of-band from a third-party page, validated
    /// against the server.
    Delegated { token: Token },
}

impl TokenProvider {
    /// Acquire a session token for a team.
    pub async fn acquire(&self, api: &AuthApi, team_name: &str) -> Result<Token> {
        match self {
            TokenProvider::Unauthenticated => api.unauthenticated_token(team_name).await,
            TokenProvider::Basic { username, password } => {
                api.basic_token(team_name, username, password).await
            }
            TokenProvider::Delegated { token } => {
                api.validate_delegated(token).await?;
                Ok(token.clone())
            }
        }
    }
}

/// Parse one advertised auth method record.
fn parse_auth_method(record: &Value) -> std::result::Result<AuthMethod, DeserializationError> {
    let kind = AuthMethodKind::from_wire(require_str(record, "type")?);
    let display_name = require_str(record, "display_name")?;
    let auth_url = require_str(record, "auth_url")?;
    Ok(AuthMethod::new(kind, display_name, auth_url))
}

/// Parse a token response body.
///
/// Single-object context: any shape problem is fatal to the payload.
fn parse_token(body: &[u8]) -> std::result::Result<Token, DeserializationError> {
    let record: Value = serde_json::from_slice(body).map_err(|_| {
        DeserializationError::invalid_format("Could not interpret token response as JSON")
    })?;

    if !record.is_object() {
        return Err(DeserializationError::invalid_format(
            "Expected token response to be a JSON object",
        ));
    }

    Ok(Token::new(require_str(&record, "value")?))
}
