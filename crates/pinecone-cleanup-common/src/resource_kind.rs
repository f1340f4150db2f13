//! Pinecone resource kinds and drain ordering
//!
//! Provides consistent labels and ordering across every cleanup path.
//! Backups and collections are taken from indexes, so indexes are drained first.

use serde::Serialize;

/// Types of Pinecone resources that live inside a project
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    /// Serverless or pod-based index
    Index,
    /// Static snapshot of a pod-based index
    Collection,
    /// Snapshot of a serverless index, identified by backup id
    Backup,
}

impl ResourceKind {
    /// Every kind, in drain order
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Index,
        ResourceKind::Collection,
        ResourceKind::Backup,
    ];

    /// Singular label used in log lines and failure records
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Index => "index",
            ResourceKind::Collection => "collection",
            ResourceKind::Backup => "backup",
        }
    }

    /// Plural label used in summaries
    pub fn label_plural(self) -> &'static str {
        match self {
            ResourceKind::Index => "indexes",
            ResourceKind::Collection => "collections",
            ResourceKind::Backup => "backups",
        }
    }
}
