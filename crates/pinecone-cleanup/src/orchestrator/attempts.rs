//! Outer retry loop: repeats whole erase cycles with fresh counters

use crate::config::{EraserConfig, OuterRetryPolicy};
use crate::eraser::{DeletionFailure, DrainSummary, EraseError, ProjectEraser, ProjectResources};
use backon::{ConstantBuilder, Retryable};
use pinecone_cleanup_common::ResourceKind;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;
use tracing::{info, warn};

/// Which resource kinds an erase cycle deletes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupPlan {
    pub indexes: bool,
    pub collections: bool,
    pub backups: bool,
    /// Turn off deletion protection instead of failing on protected indexes
    pub force: bool,
}

impl CleanupPlan {
    /// Every kind, protection forced off
    pub fn everything() -> Self {
        Self {
            indexes: true,
            collections: true,
            backups: true,
            force: true,
        }
    }

    /// True when no kind is selected
    pub fn is_empty(&self) -> bool {
        !(self.indexes || self.collections || self.backups)
    }

    /// Selected kinds, in the order they are drained
    pub fn kinds(&self) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                ResourceKind::Index => self.indexes,
                ResourceKind::Collection => self.collections,
                ResourceKind::Backup => self.backups,
            })
            .collect()
    }
}

/// Result of the last erase attempt
#[derive(Debug, Clone, Default, Serialize)]
pub struct EraseReport {
    /// Attempts made, including the first
    pub attempts: u32,
    /// Resources given up on in the last attempt
    pub failures: Vec<DeletionFailure>,
    /// Per-kind tallies of the last attempt
    pub summaries: Vec<DrainSummary>,
    /// Error that ended the last attempt early, if any
    pub last_error: Option<String>,
}

impl EraseReport {
    /// Nothing given up on and no error in the last attempt
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.last_error.is_none()
    }

    /// Sum of resources deleted in the last attempt
    pub fn deleted(&self) -> usize {
        self.summaries.iter().map(|s| s.deleted).sum()
    }
}

/// What one erase attempt left behind
#[derive(Debug)]
struct Attempt {
    number: u32,
    failures: Vec<DeletionFailure>,
    summaries: Vec<DrainSummary>,
}

/// An attempt that did not finish cleanly
#[derive(Debug, Error)]
enum AttemptError {
    /// The attempt ended early
    #[error("{error}")]
    Erase { error: EraseError, attempt: Attempt },
    /// The attempt finished but gave up on some resources
    #[error("{} resources given up on", .0.failures.len())]
    Incomplete(Attempt),
}

impl AttemptError {
    fn is_retryable(&self) -> bool {
        match self {
            AttemptError::Erase { error, .. } => error.is_retryable(),
            AttemptError::Incomplete(_) => true,
        }
    }
}

/// Run `plan` against `project` up to `policy.max_attempts` times.
///
/// Every attempt uses a new `ProjectEraser`, so no per-resource counter
/// survives into the next attempt. An attempt that errors is retried when
/// the error is retryable; an attempt that finishes with given-up resources
/// is retried only when `policy.retry_on_failures` is set. Non-retryable
/// errors such as `DeletionProtectionEnabled` are returned straight away.
pub async fn erase_with_retries<P: ProjectResources>(
    project: &P,
    plan: &CleanupPlan,
    config: EraserConfig,
    policy: OuterRetryPolicy,
) -> Result<EraseReport, EraseError> {
    let max_attempts = policy.max_attempts.max(1);
    let attempts = AtomicU32::new(0);
    let attempts = &attempts;

    let outcome = (move || async move {
        let number = attempts.fetch_add(1, Ordering::Relaxed) + 1;
        info!(attempt = number, max_attempts, kinds = ?plan.kinds(), "Starting erase attempt");

        let mut eraser = ProjectEraser::new(project, config);
        let result = run_plan(&mut eraser, plan).await;
        let (failures, summaries) = eraser.into_parts();
        let attempt = Attempt {
            number,
            failures,
            summaries,
        };

        match result {
            Err(error) => Err(AttemptError::Erase { error, attempt }),
            Ok(()) if policy.retry_on_failures && !attempt.failures.is_empty() => {
                Err(AttemptError::Incomplete(attempt))
            }
            Ok(()) => Ok(attempt),
        }
    })
    .retry(
        ConstantBuilder::default()
            .with_delay(policy.delay)
            .with_max_times((max_attempts - 1) as usize),
    )
    .when(AttemptError::is_retryable)
    .notify(|e, delay| {
        warn!(
            attempt = attempts.load(Ordering::Relaxed),
            delay = ?delay,
            error = %e,
            "Erase attempt incomplete, retrying..."
        );
    })
    .await;

    let (attempt, last_error) = match outcome {
        Ok(attempt) => (attempt, None),
        Err(AttemptError::Incomplete(attempt)) => {
            warn!(
                attempts = attempt.number,
                failures = attempt.failures.len(),
                "Giving up after final erase attempt"
            );
            (attempt, None)
        }
        Err(AttemptError::Erase { error, attempt }) if error.is_retryable() => {
            warn!(
                attempts = attempt.number,
                error = %error,
                "Giving up after final erase attempt"
            );
            (attempt, Some(error.to_string()))
        }
        Err(AttemptError::Erase { error, .. }) => return Err(error),
    };

    let report = EraseReport {
        attempts: attempt.number,
        failures: attempt.failures,
        summaries: attempt.summaries,
        last_error,
    };
    if report.is_clean() {
        info!(
            attempts = report.attempts,
            deleted = report.deleted(),
            "Erase complete"
        );
    }
    Ok(report)
}

async fn run_plan<P: ProjectResources>(
    eraser: &mut ProjectEraser<'_, P>,
    plan: &CleanupPlan,
) -> Result<(), EraseError> {
    for kind in plan.kinds() {
        match kind {
            ResourceKind::Index => eraser.delete_all_indexes(plan.force).await?,
            ResourceKind::Collection => eraser.delete_all_collections().await?,
            ResourceKind::Backup => eraser.delete_all_backups().await?,
        }
    }
    Ok(())
}
