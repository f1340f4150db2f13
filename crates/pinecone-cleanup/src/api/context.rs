//! Shared HTTP context
//!
//! Provides `ApiContext` for building one `reqwest::Client` and creating
//! multiple API clients from it.

use crate::api::error::{ApiError, classify_status};
use crate::config::ApiConfig;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Per-request timeout for every REST call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How requests are authenticated
#[derive(Clone)]
pub enum Credentials {
    /// No credentials (OAuth token exchange)
    Anonymous,
    /// Project API key, sent as `Api-Key` (control plane)
    ApiKey(String),
    /// OAuth access token, sent as `Authorization: Bearer` (admin API)
    Bearer(String),
}

/// Shared HTTP configuration context for creating API clients.
///
/// # Example
/// ```ignore
/// let ctx = ApiContext::new(ApiConfig::default(), Credentials::ApiKey(key))?;
///
/// let control = ControlPlaneClient::from_context(&ctx);
/// ```
#[derive(Clone)]
pub struct ApiContext {
    http: Client,
    config: Arc<ApiConfig>,
    credentials: Credentials,
}

impl ApiContext {
    /// Build the HTTP client for the given endpoints and credentials.
    pub fn new(config: ApiConfig, credentials: Credentials) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("pinecone-cleanup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            http,
            config: Arc::new(config),
            credentials,
        })
    }

    /// Same HTTP client and endpoints, different credentials.
    pub fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            credentials,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Unauthenticated request (token exchange)
    pub(crate) fn raw(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Authenticated request carrying the API version header
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header("X-Pinecone-API-Version", &self.config.api_version);

        match &self.credentials {
            Credentials::Anonymous => builder,
            Credentials::ApiKey(key) => builder.header("Api-Key", key),
            Credentials::Bearer(token) => builder.bearer_auth(token),
        }
    }
}

/// Send a request and decode a JSON body, classifying non-success statuses.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = check(request.send().await?).await?;
    Ok(response.json::<T>().await?)
}

/// Send a request whose response body is ignored.
pub(crate) async fn send_empty(request: RequestBuilder) -> Result<(), ApiError> {
    check(request.send().await?).await?;
    Ok(())
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, &body))
}

impl std::fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiContext")
            .field("control_plane_url", &self.config.control_plane_url)
            .field("admin_url", &self.config.admin_url)
            .finish_non_exhaustive()
    }
}
