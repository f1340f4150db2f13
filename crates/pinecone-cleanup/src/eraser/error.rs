//! Errors that abort an erase call instead of degrading to a failure record

use crate::api::ApiError;
use pinecone_cleanup_common::ResourceKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EraseError {
    /// Protected indexes exist and force was not requested. Nothing was touched.
    #[error(
        "Deletion protection is enabled for indexes: {}. Disable it or pass force",
        names.join(", ")
    )]
    DeletionProtectionEnabled { names: Vec<String> },

    /// The initial listing of a resource kind failed. Nothing of that kind was touched.
    #[error("Failed to list {kind}: {source}")]
    List {
        kind: &'static str,
        #[source]
        source: ApiError,
    },
}

impl EraseError {
    pub(crate) fn list(kind: ResourceKind, source: ApiError) -> Self {
        Self::List {
            kind: kind.label_plural(),
            source,
        }
    }

    /// Whether repeating the whole erase cycle can help
    pub fn is_retryable(&self) -> bool {
        match self {
            EraseError::DeletionProtectionEnabled { .. } => false,
            EraseError::List { source, .. } => source.is_retryable(),
        }
    }
}
