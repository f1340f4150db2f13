//! Capability contract the drain loop consumes from each resource kind

use crate::api::ApiError;
use pinecone_cleanup_common::{ResourceKind, ResourceState};

/// Minimal identity returned by `list`; state is fetched separately
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub name: String,
}

impl ResourceRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Result of a call whose "not found" answer means "already gone".
#[derive(Debug)]
pub enum ApiOutcome<T> {
    /// Call succeeded
    Done(T),
    /// Resource no longer exists
    NotFound,
    /// Any other failure
    Failed(ApiError),
}

impl<T> From<Result<T, ApiError>> for ApiOutcome<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => ApiOutcome::Done(value),
            Err(e) if e.is_not_found() => ApiOutcome::NotFound,
            Err(e) => ApiOutcome::Failed(e),
        }
    }
}

/// One kind of project resource that can be listed, polled and deleted.
#[allow(async_fn_in_trait)] // Used with concrete types only
pub trait DeletableResource {
    fn kind(&self) -> ResourceKind;

    fn label(&self) -> &'static str {
        self.kind().label()
    }

    fn label_plural(&self) -> &'static str {
        self.kind().label_plural()
    }

    /// Current resources of this kind in the project
    async fn list(&self) -> Result<Vec<ResourceRef>, ApiError>;

    async fn describe_state(&self, name: &str) -> ApiOutcome<ResourceState>;

    async fn delete(&self, name: &str) -> ApiOutcome<()>;
}

/// A resource kind carrying a deletion-protection flag (indexes).
#[allow(async_fn_in_trait)]
pub trait ProtectedResource: DeletableResource {
    /// Resources that currently have deletion protection enabled
    async fn list_protected(&self) -> Result<Vec<ResourceRef>, ApiError>;

    async fn configure_deletion_protection(&self, name: &str, enabled: bool) -> ApiOutcome<()>;
}

/// The three resource kinds of one project.
pub trait ProjectResources {
    type Indexes: ProtectedResource;
    type Collections: DeletableResource;
    type Backups: DeletableResource;

    fn indexes(&self) -> &Self::Indexes;
    fn collections(&self) -> &Self::Collections;
    fn backups(&self) -> &Self::Backups;
}

impl<P: ProjectResources> ProjectResources for &P {
    type Indexes = P::Indexes;
    type Collections = P::Collections;
    type Backups = P::Backups;

    fn indexes(&self) -> &Self::Indexes {
        (**self).indexes()
    }

    fn collections(&self) -> &Self::Collections {
        (**self).collections()
    }

    fn backups(&self) -> &Self::Backups {
        (**self).backups()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let ok: ApiOutcome<u8> = Ok(1).into();
        assert!(matches!(ok, ApiOutcome::Done(1)));

        let gone: ApiOutcome<u8> = Err(ApiError::NotFound {
            message: "gone".into(),
        })
        .into();
        assert!(matches!(gone, ApiOutcome::NotFound));

        let failed: ApiOutcome<u8> = Err(ApiError::Http {
            status: 500,
            message: "boom".into(),
        })
        .into();
        assert!(matches!(failed, ApiOutcome::Failed(ApiError::Http { status: 500, .. })));
    }
}
