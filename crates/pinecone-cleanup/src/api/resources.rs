//! `DeletableResource` adapters over the control plane client

use crate::api::control::ControlPlaneClient;
use crate::api::error::ApiError;
use crate::eraser::{
    ApiOutcome, DeletableResource, ProjectResources, ProtectedResource, ResourceRef,
};
use pinecone_cleanup_common::{ResourceKind, ResourceState};

/// Indexes of a project
#[derive(Clone, Debug)]
pub struct Indexes {
    client: ControlPlaneClient,
}

impl DeletableResource for Indexes {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Index
    }

    async fn list(&self) -> Result<Vec<ResourceRef>, ApiError> {
        let indexes = self.client.list_indexes().await?;
        Ok(indexes.into_iter().map(|i| ResourceRef::new(i.name)).collect())
    }

    async fn describe_state(&self, name: &str) -> ApiOutcome<ResourceState> {
        self.client.describe_index(name).await.map(|i| i.state()).into()
    }

    async fn delete(&self, name: &str) -> ApiOutcome<()> {
        self.client.delete_index(name).await.into()
    }
}

impl ProtectedResource for Indexes {
    async fn list_protected(&self) -> Result<Vec<ResourceRef>, ApiError> {
        let indexes = self.client.list_indexes().await?;
        Ok(indexes
            .into_iter()
            .filter(|i| i.deletion_protection.is_enabled())
            .map(|i| ResourceRef::new(i.name))
            .collect())
    }

    async fn configure_deletion_protection(&self, name: &str, enabled: bool) -> ApiOutcome<()> {
        self.client
            .configure_deletion_protection(name, enabled)
            .await
            .into()
    }
}

/// Collections of a project
#[derive(Clone, Debug)]
pub struct Collections {
    client: ControlPlaneClient,
}

impl DeletableResource for Collections {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Collection
    }

    async fn list(&self) -> Result<Vec<ResourceRef>, ApiError> {
        let collections = self.client.list_collections().await?;
        Ok(collections
            .into_iter()
            .map(|c| ResourceRef::new(c.name))
            .collect())
    }

    async fn describe_state(&self, name: &str) -> ApiOutcome<ResourceState> {
        self.client
            .describe_collection(name)
            .await
            .map(|c| c.state())
            .into()
    }

    async fn delete(&self, name: &str) -> ApiOutcome<()> {
        self.client.delete_collection(name).await.into()
    }
}

/// Backups of a project, keyed by backup id
#[derive(Clone, Debug)]
pub struct Backups {
    client: ControlPlaneClient,
}

impl DeletableResource for Backups {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Backup
    }

    async fn list(&self) -> Result<Vec<ResourceRef>, ApiError> {
        let backups = self.client.list_backups().await?;
        Ok(backups
            .into_iter()
            .map(|b| ResourceRef::new(b.backup_id))
            .collect())
    }

    async fn describe_state(&self, backup_id: &str) -> ApiOutcome<ResourceState> {
        self.client
            .describe_backup(backup_id)
            .await
            .map(|b| b.state())
            .into()
    }

    async fn delete(&self, backup_id: &str) -> ApiOutcome<()> {
        self.client.delete_backup(backup_id).await.into()
    }
}

/// All three resource kinds of one project, sharing one control plane client
#[derive(Clone, Debug)]
pub struct PineconeProject {
    indexes: Indexes,
    collections: Collections,
    backups: Backups,
}

impl PineconeProject {
    pub fn new(client: ControlPlaneClient) -> Self {
        Self {
            indexes: Indexes {
                client: client.clone(),
            },
            collections: Collections {
                client: client.clone(),
            },
            backups: Backups { client },
        }
    }
}

impl ProjectResources for PineconeProject {
    type Indexes = Indexes;
    type Collections = Collections;
    type Backups = Backups;

    fn indexes(&self) -> &Indexes {
        &self.indexes
    }

    fn collections(&self) -> &Collections {
        &self.collections
    }

    fn backups(&self) -> &Backups {
        &self.backups
    }
}
