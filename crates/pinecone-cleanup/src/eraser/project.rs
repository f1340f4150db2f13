//! Project eraser: drains indexes, collections and backups of one project

use super::drain::{Drain, DrainSummary, RetryBudgets};
use super::error::EraseError;
use super::failure::{DeletionFailure, FailureReason};
use super::resource::{ApiOutcome, DeletableResource, ProjectResources, ProtectedResource};
use crate::config::EraserConfig;
use pinecone_cleanup_common::ResourceKind;
use tracing::{info, warn};

/// Deletes every resource of a project, one kind at a time.
///
/// Holds the four retry budgets and one failure list shared by every
/// `delete_all_*` call made on the same instance. Build a fresh eraser for
/// each outer retry attempt.
pub struct ProjectEraser<'a, P: ProjectResources> {
    project: &'a P,
    config: EraserConfig,
    budgets: RetryBudgets,
    failures: Vec<DeletionFailure>,
    summaries: Vec<DrainSummary>,
}

impl<'a, P: ProjectResources> ProjectEraser<'a, P> {
    pub fn new(project: &'a P, config: EraserConfig) -> Self {
        Self {
            project,
            config,
            budgets: RetryBudgets::new(&config),
            failures: Vec::new(),
            summaries: Vec::new(),
        }
    }

    /// Delete every index.
    ///
    /// Fails before touching anything when protected indexes exist and
    /// `force_delete` is false. With `force_delete`, protection is turned off
    /// index by index; an index whose protection cannot be turned off is
    /// recorded and the rest carry on.
    pub async fn delete_all_indexes(&mut self, force_delete: bool) -> Result<(), EraseError> {
        let project = self.project;
        let indexes = project.indexes();
        let protected = indexes
            .list_protected()
            .await
            .map_err(|e| EraseError::list(ResourceKind::Index, e))?;

        if !protected.is_empty() {
            let names: Vec<String> = protected.into_iter().map(|r| r.name).collect();
            if !force_delete {
                return Err(EraseError::DeletionProtectionEnabled { names });
            }

            info!(count = names.len(), "Disabling deletion protection");
            for name in names {
                tokio::time::sleep(self.config.sleep_interval).await;
                match indexes.configure_deletion_protection(&name, false).await {
                    ApiOutcome::Done(()) => {
                        info!(index = %name, "Deletion protection disabled");
                    }
                    ApiOutcome::NotFound => {
                        info!(index = %name, "Index already gone");
                    }
                    ApiOutcome::Failed(e) => {
                        warn!(index = %name, error = %e, "Failed to disable deletion protection");
                        self.failures.push(DeletionFailure::new(
                            ResourceKind::Index,
                            name,
                            FailureReason::ProtectionNotDisabled,
                            e.to_string(),
                        ));
                    }
                }
            }
        }

        self.drain(indexes).await
    }

    pub async fn delete_all_collections(&mut self) -> Result<(), EraseError> {
        let project = self.project;
        self.drain(project.collections()).await
    }

    pub async fn delete_all_backups(&mut self) -> Result<(), EraseError> {
        let project = self.project;
        self.drain(project.backups()).await
    }

    async fn drain<R: DeletableResource>(&mut self, resource: &R) -> Result<(), EraseError> {
        let summary = Drain::new(
            resource,
            &mut self.budgets,
            &mut self.failures,
            self.config.sleep_interval,
        )
        .run()
        .await
        .map_err(|e| EraseError::list(resource.kind(), e))?;

        self.summaries.push(summary);
        Ok(())
    }

    /// True iff anything was given up on
    pub fn retry_needed(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failures(&self) -> &[DeletionFailure] {
        &self.failures
    }

    /// Per-kind tallies, one per completed drain, in call order
    pub fn summaries(&self) -> &[DrainSummary] {
        &self.summaries
    }

    pub fn into_parts(self) -> (Vec<DeletionFailure>, Vec<DrainSummary>) {
        (self.failures, self.summaries)
    }
}
