//! CI cleanup entry point: wipe a project and delete it

use super::attempts::{CleanupPlan, EraseReport};
use super::error::CleanupError;
use super::project::{erase_with_scoped_key, finish_project};
use crate::api::{AdminOperations, ApiError, ScopedApiKey};
use crate::config::{EraserConfig, OuterRetryPolicy};
use crate::eraser::ProjectResources;
use tracing::{error, info};

/// Force-delete every index, collection and backup, then delete the project.
///
/// Attempts repeat only when they error (`OuterRetryPolicy::ci`). The
/// project deletion is attempted whatever happened before it; an earlier
/// error takes precedence over a project deletion error.
pub async fn run_ci_cleanup<A, P, F>(
    admin: &A,
    project_id: &str,
    eraser: EraserConfig,
    connect: F,
) -> Result<EraseReport, CleanupError>
where
    A: AdminOperations,
    P: ProjectResources,
    F: FnOnce(&ScopedApiKey) -> Result<P, ApiError>,
{
    info!(project_id = %project_id, "Starting CI cleanup");

    let erased = erase_with_scoped_key(
        admin,
        project_id,
        &CleanupPlan::everything(),
        eraser,
        OuterRetryPolicy::ci(),
        connect,
    )
    .await;

    match erased {
        Ok(report) => finish_project(admin, project_id, report).await,
        Err(e) => {
            error!(project_id = %project_id, error = %e, "Cleanup failed, deleting project anyway");
            if let Err(delete_err) = finish_project(admin, project_id, EraseReport::default()).await
            {
                error!(error = ?delete_err, "Project deletion failed");
            }
            Err(e)
        }
    }
}
