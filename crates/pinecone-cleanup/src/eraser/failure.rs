//! Terminal records of resources the eraser gave up on

use pinecone_cleanup_common::ResourceKind;
use serde::Serialize;

/// Which budget ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Describing the resource kept failing
    #[strum(serialize = "describe failed")]
    DescribeFailed,
    /// Resource stayed in a terminating status
    #[strum(serialize = "stuck terminating")]
    StuckTerminating,
    /// Resource never reached a deletable status
    #[strum(serialize = "never became deletable")]
    NeverDeletable,
    /// Delete calls kept failing
    #[strum(serialize = "delete failed")]
    DeleteFailed,
    /// Deletion protection could not be turned off
    #[strum(serialize = "could not disable protection")]
    ProtectionNotDisabled,
}

/// A resource given up on. Created once, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
    pub resource_type: ResourceKind,
    pub resource_name: String,
    pub reason: FailureReason,
    /// Last error or status observed
    pub detail: String,
}

impl DeletionFailure {
    pub fn new(
        resource_type: ResourceKind,
        resource_name: impl Into<String>,
        reason: FailureReason,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            resource_type,
            resource_name: resource_name.into(),
            reason,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for DeletionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}': {} ({})",
            self.resource_type, self.resource_name, self.reason, self.detail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let failure = DeletionFailure::new(
            ResourceKind::Index,
            "idx-1",
            FailureReason::StuckTerminating,
            "state Terminating",
        );
        assert_eq!(
            failure.to_string(),
            "index 'idx-1': stuck terminating (state Terminating)"
        );
    }

    #[test]
    fn test_serializes_for_report() {
        let failure = DeletionFailure::new(
            ResourceKind::Backup,
            "b-1",
            FailureReason::DeleteFailed,
            "HTTP 500: boom",
        );
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["resource_type"], "backup");
        assert_eq!(json["reason"], "delete_failed");
        assert_eq!(json["resource_name"], "b-1");
    }
}
