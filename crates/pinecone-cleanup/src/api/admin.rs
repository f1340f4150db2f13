//! Admin API client: service-account login, API keys and projects

use crate::api::context::{ApiContext, Credentials, send_empty, send_json};
use crate::api::error::ApiError;
use crate::config::ApiConfig;
use pinecone_cleanup_common::defaults::SCOPED_KEY_ROLE;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Audience requested for admin access tokens
const TOKEN_AUDIENCE: &str = "https://api.pinecone.io/";

/// Short-lived API key minted for one cleanup operation
#[derive(Clone)]
pub struct ScopedApiKey {
    pub id: String,
    pub name: String,
    /// Secret value; only returned once, at creation
    pub value: String,
}

impl std::fmt::Debug for ScopedApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedApiKey")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'static str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct CreateApiKeyRequest<'a> {
    name: &'a str,
    roles: [&'static str; 1],
}

#[derive(Deserialize)]
struct CreateApiKeyResponse {
    key: ApiKeyInfo,
    value: String,
}

#[derive(Deserialize)]
struct ApiKeyInfo {
    id: String,
    name: String,
}

/// Admin API client, authenticated with a service-account access token
#[derive(Clone, Debug)]
pub struct AdminClient {
    ctx: ApiContext,
}

impl AdminClient {
    /// Exchange service-account credentials for an access token and build a client
    pub async fn login(
        config: ApiConfig,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, ApiError> {
        let anonymous = ApiContext::new(config, Credentials::Anonymous)?;
        let request = TokenRequest {
            grant_type: "client_credentials",
            client_id,
            client_secret,
            audience: TOKEN_AUDIENCE,
        };

        debug!(client_id = %client_id, "Requesting service account token");
        let token: TokenResponse = send_json(
            anonymous
                .raw(Method::POST, &anonymous.config().auth_url)
                .json(&request),
        )
        .await?;

        Ok(Self::from_context(
            &anonymous.with_credentials(Credentials::Bearer(token.access_token)),
        ))
    }

    /// Create an admin client from a context holding a bearer token
    pub fn from_context(ctx: &ApiContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Context sharing this client's HTTP pool, for building control plane clients
    pub fn context(&self) -> &ApiContext {
        &self.ctx
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.ctx.config().admin_url.trim_end_matches('/'), path)
    }

    /// Mint a `ProjectEditor` key in the given project
    pub async fn create_api_key(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<ScopedApiKey, ApiError> {
        info!(project_id = %project_id, key_name = %name, "Creating scoped API key");
        let body = CreateApiKeyRequest {
            name,
            roles: [SCOPED_KEY_ROLE],
        };
        let response: CreateApiKeyResponse = send_json(
            self.ctx
                .request(
                    Method::POST,
                    &self.url(&format!("projects/{project_id}/api-keys")),
                )
                .json(&body),
        )
        .await?;

        Ok(ScopedApiKey {
            id: response.key.id,
            name: response.key.name,
            value: response.value,
        })
    }

    pub async fn delete_api_key(&self, key_id: &str) -> Result<(), ApiError> {
        info!(key_id = %key_id, "Revoking API key");
        send_empty(
            self.ctx
                .request(Method::DELETE, &self.url(&format!("api-keys/{key_id}"))),
        )
        .await
    }

    /// Delete a project; rejected by the API while it still holds resources
    pub async fn delete_project(&self, project_id: &str) -> Result<(), ApiError> {
        info!(project_id = %project_id, "Deleting project");
        send_empty(
            self.ctx
                .request(Method::DELETE, &self.url(&format!("projects/{project_id}"))),
        )
        .await
    }
}

/// Trait for admin operations used by the cleanup flows.
///
/// Abstracts the admin client so orchestration can be tested without
/// hitting the real API.
#[allow(async_fn_in_trait)] // Used with concrete types only
pub trait AdminOperations {
    /// Mint a short-lived key scoped to one project
    async fn create_api_key(&self, project_id: &str, name: &str)
    -> Result<ScopedApiKey, ApiError>;

    /// Revoke a key by id
    async fn delete_api_key(&self, key_id: &str) -> Result<(), ApiError>;

    /// Delete an (expected-empty) project
    async fn delete_project(&self, project_id: &str) -> Result<(), ApiError>;
}

impl AdminOperations for AdminClient {
    async fn create_api_key(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<ScopedApiKey, ApiError> {
        AdminClient::create_api_key(self, project_id, name).await
    }

    async fn delete_api_key(&self, key_id: &str) -> Result<(), ApiError> {
        AdminClient::delete_api_key(self, key_id).await
    }

    async fn delete_project(&self, project_id: &str) -> Result<(), ApiError> {
        AdminClient::delete_project(self, project_id).await
    }
}
