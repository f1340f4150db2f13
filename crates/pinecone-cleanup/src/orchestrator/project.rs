//! Project deletion with cascading cleanup

use super::attempts::{CleanupPlan, EraseReport, erase_with_retries};
use super::error::CleanupError;
use super::scoped_key::{mint_scoped_key, revoke_scoped_key};
use crate::api::{AdminOperations, ApiError, ScopedApiKey};
use crate::config::{EraserConfig, OuterRetryPolicy};
use crate::eraser::ProjectResources;
use tracing::{info, warn};

/// Options for `delete_project`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteProjectOptions {
    pub plan: CleanupPlan,
    pub eraser: EraserConfig,
    pub policy: OuterRetryPolicy,
}

/// Empty the selected resource kinds of a project, then delete it.
///
/// When any kind is selected a scoped key is minted, `connect` turns it into
/// a project handle, and the erase runs under `options.policy`. The key is
/// revoked whatever the erase outcome. A deletion protection conflict is
/// returned without deleting the project. Otherwise the project is deleted,
/// which the API rejects while resources remain.
pub async fn delete_project<A, P, F>(
    admin: &A,
    project_id: &str,
    options: &DeleteProjectOptions,
    connect: F,
) -> Result<EraseReport, CleanupError>
where
    A: AdminOperations,
    P: ProjectResources,
    F: FnOnce(&ScopedApiKey) -> Result<P, ApiError>,
{
    let report = if options.plan.is_empty() {
        EraseReport::default()
    } else {
        erase_with_scoped_key(
            admin,
            project_id,
            &options.plan,
            options.eraser,
            options.policy,
            connect,
        )
        .await?
    };

    finish_project(admin, project_id, report).await
}

/// Mint a key, erase under it, and revoke it again
pub(crate) async fn erase_with_scoped_key<A, P, F>(
    admin: &A,
    project_id: &str,
    plan: &CleanupPlan,
    eraser: EraserConfig,
    policy: OuterRetryPolicy,
    connect: F,
) -> Result<EraseReport, CleanupError>
where
    A: AdminOperations,
    P: ProjectResources,
    F: FnOnce(&ScopedApiKey) -> Result<P, ApiError>,
{
    let key = mint_scoped_key(admin, project_id).await?;

    let erased = match connect(&key) {
        Ok(project) => erase_with_retries(&project, plan, eraser, policy)
            .await
            .map_err(CleanupError::from),
        Err(source) => Err(CleanupError::Connect {
            project_id: project_id.to_string(),
            source,
        }),
    };

    revoke_scoped_key(admin, &key).await;
    erased
}

/// Delete the project, attaching the erase report to any failure
pub(crate) async fn finish_project<A: AdminOperations>(
    admin: &A,
    project_id: &str,
    report: EraseReport,
) -> Result<EraseReport, CleanupError> {
    if !report.is_clean() {
        warn!(
            project_id = %project_id,
            failures = report.failures.len(),
            last_error = ?report.last_error,
            "Deleting project with resources left behind"
        );
    }

    match admin.delete_project(project_id).await {
        Ok(()) => {
            info!(project_id = %project_id, "Project deleted");
            Ok(report)
        }
        Err(source) => Err(CleanupError::DeleteProject {
            project_id: project_id.to_string(),
            report: Box::new(report),
            source,
        }),
    }
}
