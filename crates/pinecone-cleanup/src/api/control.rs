//! Control plane client: indexes, collections and backups

use crate::api::context::{ApiContext, send_empty, send_json};
use crate::api::error::ApiError;
use chrono::{DateTime, Utc};
use pinecone_cleanup_common::ResourceState;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Page size requested when listing backups
const BACKUP_PAGE_SIZE: u32 = 100;

/// Index as returned by `GET /indexes`
#[derive(Debug, Clone, Deserialize)]
pub struct IndexModel {
    pub name: String,
    #[serde(default)]
    pub deletion_protection: DeletionProtection,
    #[serde(default)]
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionProtection {
    Enabled,
    #[default]
    Disabled,
}

impl DeletionProtection {
    pub fn is_enabled(self) -> bool {
        self == DeletionProtection::Enabled
    }
}

impl From<bool> for DeletionProtection {
    fn from(enabled: bool) -> Self {
        if enabled {
            DeletionProtection::Enabled
        } else {
            DeletionProtection::Disabled
        }
    }
}

impl IndexModel {
    pub fn state(&self) -> ResourceState {
        ResourceState::new(self.status.state.clone())
    }
}

/// Collection as returned by `GET /collections`
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionModel {
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl CollectionModel {
    pub fn state(&self) -> ResourceState {
        ResourceState::new(self.status.clone())
    }
}

/// Backup as returned by `GET /backups`
#[derive(Debug, Clone, Deserialize)]
pub struct BackupModel {
    pub backup_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source_index_name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl BackupModel {
    pub fn state(&self) -> ResourceState {
        ResourceState::new(self.status.clone())
    }
}

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Deserialize)]
struct CollectionList {
    #[serde(default)]
    collections: Vec<CollectionModel>,
}

#[derive(Deserialize)]
struct BackupPage {
    #[serde(default)]
    data: Vec<BackupModel>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct Pagination {
    next: Option<String>,
}

#[derive(Serialize)]
struct ConfigureIndexRequest {
    deletion_protection: DeletionProtection,
}

/// Control plane client, authenticated with a project API key
#[derive(Clone, Debug)]
pub struct ControlPlaneClient {
    ctx: ApiContext,
}

impl ControlPlaneClient {
    /// Create a control plane client from a context holding an API key
    pub fn from_context(ctx: &ApiContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.ctx.config().control_plane_url.trim_end_matches('/'),
            path
        )
    }

    pub async fn list_indexes(&self) -> Result<Vec<IndexModel>, ApiError> {
        let list: IndexList =
            send_json(self.ctx.request(Method::GET, &self.url("indexes"))).await?;
        Ok(list.indexes)
    }

    pub async fn describe_index(&self, name: &str) -> Result<IndexModel, ApiError> {
        send_json(self.ctx.request(Method::GET, &self.url(&format!("indexes/{name}")))).await
    }

    pub async fn delete_index(&self, name: &str) -> Result<(), ApiError> {
        debug!(index = %name, "Deleting index");
        send_empty(self.ctx.request(Method::DELETE, &self.url(&format!("indexes/{name}")))).await
    }

    pub async fn configure_deletion_protection(
        &self,
        name: &str,
        enabled: bool,
    ) -> Result<(), ApiError> {
        debug!(index = %name, enabled, "Configuring deletion protection");
        let body = ConfigureIndexRequest {
            deletion_protection: enabled.into(),
        };
        send_empty(
            self.ctx
                .request(Method::PATCH, &self.url(&format!("indexes/{name}")))
                .json(&body),
        )
        .await
    }

    pub async fn list_collections(&self) -> Result<Vec<CollectionModel>, ApiError> {
        let list: CollectionList =
            send_json(self.ctx.request(Method::GET, &self.url("collections"))).await?;
        Ok(list.collections)
    }

    pub async fn describe_collection(&self, name: &str) -> Result<CollectionModel, ApiError> {
        send_json(self.ctx.request(Method::GET, &self.url(&format!("collections/{name}")))).await
    }

    pub async fn delete_collection(&self, name: &str) -> Result<(), ApiError> {
        debug!(collection = %name, "Deleting collection");
        send_empty(
            self.ctx
                .request(Method::DELETE, &self.url(&format!("collections/{name}"))),
        )
        .await
    }

    /// List every backup in the project, following pagination tokens
    pub async fn list_backups(&self) -> Result<Vec<BackupModel>, ApiError> {
        let mut backups = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut request = self
                .ctx
                .request(Method::GET, &self.url("backups"))
                .query(&[("limit", BACKUP_PAGE_SIZE.to_string())]);

            if let Some(token) = &token {
                request = request.query(&[("paginationToken", token)]);
            }

            let page: BackupPage = send_json(request).await?;
            backups.extend(page.data);

            match page.pagination.and_then(|p| p.next) {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }

        Ok(backups)
    }

    pub async fn describe_backup(&self, backup_id: &str) -> Result<BackupModel, ApiError> {
        send_json(
            self.ctx
                .request(Method::GET, &self.url(&format!("backups/{backup_id}"))),
        )
        .await
    }

    pub async fn delete_backup(&self, backup_id: &str) -> Result<(), ApiError> {
        debug!(backup_id = %backup_id, "Deleting backup");
        send_empty(
            self.ctx
                .request(Method::DELETE, &self.url(&format!("backups/{backup_id}"))),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_model_defaults() {
        let index: IndexModel = serde_json::from_str(r#"{"name": "idx"}"#).unwrap();
        assert_eq!(index.deletion_protection, DeletionProtection::Disabled);
        assert_eq!(index.state().as_str(), "");

        let index: IndexModel = serde_json::from_str(
            r#"{"name": "idx", "deletion_protection": "enabled", "status": {"ready": true, "state": "Ready"}}"#,
        )
        .unwrap();
        assert!(index.deletion_protection.is_enabled());
        assert_eq!(index.state().class(), pinecone_cleanup_common::StateClass::Deletable);
    }

    #[test]
    fn test_backup_model_timestamp() {
        let backup: BackupModel = serde_json::from_str(
            r#"{"backup_id": "b-1", "status": "Ready", "created_at": "2025-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(backup.backup_id, "b-1");
        assert!(backup.name.is_none());
        assert_eq!(
            backup.created_at.map(|t| t.to_rfc3339()),
            Some("2025-03-01T12:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_configure_request_body() {
        let body = ConfigureIndexRequest {
            deletion_protection: false.into(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"deletion_protection":"disabled"}"#
        );
    }
}
