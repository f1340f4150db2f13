//! Short-lived project API keys minted for one cleanup

use super::error::CleanupError;
use crate::api::{AdminOperations, ScopedApiKey};
use tracing::{info, warn};
use uuid::Uuid;

/// Prefix of every key name minted by this tool
pub const KEY_NAME_PREFIX: &str = "cleanup-";

/// Generate a unique key name
pub fn key_name() -> String {
    format!("{KEY_NAME_PREFIX}{}", Uuid::now_v7())
}

/// Mint a `ProjectEditor` key for `project_id`
pub async fn mint_scoped_key<A: AdminOperations>(
    admin: &A,
    project_id: &str,
) -> Result<ScopedApiKey, CleanupError> {
    let name = key_name();
    let key = admin
        .create_api_key(project_id, &name)
        .await
        .map_err(|source| CleanupError::MintKey {
            project_id: project_id.to_string(),
            source,
        })?;

    info!(project_id = %project_id, key_id = %key.id, key_name = %key.name, "Scoped API key created");
    Ok(key)
}

/// Revoke a scoped key. Failure is logged, never returned.
pub async fn revoke_scoped_key<A: AdminOperations>(admin: &A, key: &ScopedApiKey) {
    match admin.delete_api_key(&key.id).await {
        Ok(()) => info!(key_id = %key.id, "Scoped API key revoked"),
        Err(e) => warn!(key_id = %key.id, error = ?e, "Failed to revoke scoped API key"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_are_unique_and_prefixed() {
        let a = key_name();
        let b = key_name();
        assert!(a.starts_with(KEY_NAME_PREFIX));
        assert_eq!(a.len(), KEY_NAME_PREFIX.len() + 36);
        assert_ne!(a, b);
    }
}
