//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use url::Url;

use contrail_types::Token;

use crate::api::{AuthApi, BuildsApi, JobsApi};
use crate::error::{Error, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for the long-lived log stream connection.
const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(300);

/// How a request authenticates, decided per call site.
///
/// The same client serves both the pre-auth surface (discovering auth
/// methods, trading credentials for a token) and the authenticated one,
/// so auth is not baked into the client itself.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RequestAuth<'a> {
    /// No credential.
    None,
    /// `Authorization: Bearer {token}`.
    Bearer(&'a Token),
    /// HTTP basic credentials.
    Basic(&'a str, &'a str),
}

/// Concourse API client.
///
/// Provides typed access to the auth, build, and job endpoints plus the
/// live log stream.
///
/// # Example
///
/// ```no_run
/// use contrail_client::ConcourseClient;
///
/// # async fn example() -> contrail_client::Result<()> {
/// let client = ConcourseClient::builder()
///     .base_url("https://ci.example.com")
///     .build()?;
///
/// let methods = client.auth().methods("main").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConcourseClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
    /// Streaming timeout.
    pub(crate) stream_timeout: Duration,
}

impl ConcourseClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the builds API.
    pub fn builds(&self) -> BuildsApi {
        BuildsApi::new(self.clone())
    }

    /// Access the jobs API.
    pub fn jobs(&self) -> JobsApi {
        JobsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("api/v1/{}", path))
            .map_err(Error::from)
    }

    /// Apply auth to a request builder.
    fn with_auth(
        request: reqwest::RequestBuilder,
        auth: RequestAuth<'_>,
    ) -> reqwest::RequestBuilder {
        match auth {
            RequestAuth::None => request,
            RequestAuth::Bearer(token) => request.bearer_auth(&token.value),
            RequestAuth::Basic(username, password) => {
                request.basic_auth(username, Some(password))
            }
        }
    }

    /// Make a GET request and return the raw body bytes.
    pub(crate) async fn get_bytes(&self, path: &str, auth: RequestAuth<'_>) -> Result<Vec<u8>> {
        let url = self.url(path)?;
        let request = self.inner.http.get(url).timeout(self.inner.timeout);
        let response = Self::with_auth(request, auth).send().await?;

        if !response.status().is_success() {
            return Err(Self::extract_error(response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Make a GET request, discarding the body.
    pub(crate) async fn get_ok(&self, path: &str, auth: RequestAuth<'_>) -> Result<()> {
        let url = self.url(path)?;
        let request = self.inner.http.get(url).timeout(self.inner.timeout);
        let response = Self::with_auth(request, auth).send().await?;

        if !response.status().is_success() {
            return Err(Self::extract_error(response).await);
        }

        Ok(())
    }

    /// Open a server-push event stream (returns the response directly).
    pub(crate) async fn get_event_stream(
        &self,
        path: &str,
        token: &Token,
    ) -> Result<reqwest::Response> {
        let url = self.url(path)?;
        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(&token.value)
            .header(ACCEPT, "text/event-stream")
            .timeout(self.inner.stream_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::extract_error(response).await);
        }

        Ok(response)
    }

    /// Extract a typed error from a failed response.
    ///
    /// 401-class statuses classify as [`Error::Unauthorized`]; everything
    /// else surfaces as [`Error::Api`] with the server's body text.
    async fn extract_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();

        if status == 401 || status == 403 {
            Error::Unauthorized(message)
        } else {
            Error::Api { status, message }
        }
    }
}

/// Builder for creating a [`ConcourseClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    stream_timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL for the server.
    ///
    /// A URL without a scheme is assumed to be `https://`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the streaming request timeout.
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ConcourseClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Bare hostnames get an https scheme prepended.
        let base_url = if base_url.contains("://") {
            base_url
        } else {
            format!("https://{}", base_url)
        };

        // Parse and normalize base URL.
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("contrail-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(ConcourseClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                stream_timeout: self.stream_timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
