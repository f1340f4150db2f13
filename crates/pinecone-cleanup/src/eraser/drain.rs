//! Resource drain loop
//!
//! Polls and deletes every resource of one kind until each is gone or one of
//! its retry budgets runs out. Each queued resource moves through:
//!
//! ```text
//! Describing ──┬─ not found ──────────────────────────────► AlreadyGone
//!              ├─ error ──────────── budget left? ─ yes ──► Requeue
//!              │                                  └ no ───► GivenUp
//!              ├─ Terminating/Terminated ─ budget left? ──► Requeue / GivenUp
//!              ├─ other status ─────── budget left? ──────► Requeue / GivenUp
//!              └─ Ready/InitializationFailed ─► Deleting ─┬─ ok / not found ─► Deleted / AlreadyGone
//!                                                         └─ error ─► Requeue / GivenUp
//! ```
//!
//! `GivenUp` is terminal: the resource is recorded once and never queued again.

use super::failure::{DeletionFailure, FailureReason};
use super::resource::{ApiOutcome, DeletableResource, ResourceRef};
use super::retry_counter::RetryCounter;
use crate::api::ApiError;
use crate::config::EraserConfig;
use pinecone_cleanup_common::{ResourceKind, StateClass};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One of the four per-resource budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Budget {
    StateCheck,
    FailedDelete,
    IsDeletable,
    IsTerminating,
}

impl Budget {
    /// Failure recorded when this budget runs out
    fn failure_reason(self) -> FailureReason {
        match self {
            Budget::StateCheck => FailureReason::DescribeFailed,
            Budget::FailedDelete => FailureReason::DeleteFailed,
            Budget::IsDeletable => FailureReason::NeverDeletable,
            Budget::IsTerminating => FailureReason::StuckTerminating,
        }
    }
}

/// The four per-resource budgets owned by one eraser
#[derive(Debug, Clone)]
pub(crate) struct RetryBudgets {
    pub(crate) state_check: RetryCounter,
    pub(crate) failed_delete: RetryCounter,
    pub(crate) is_deletable: RetryCounter,
    pub(crate) is_terminating: RetryCounter,
}

impl RetryBudgets {
    pub(crate) fn new(config: &EraserConfig) -> Self {
        Self {
            state_check: RetryCounter::new(config.max_retries),
            failed_delete: RetryCounter::new(config.max_retries),
            is_deletable: RetryCounter::new(config.max_retries),
            is_terminating: RetryCounter::new(config.terminating_budget()),
        }
    }

    fn counter(&mut self, budget: Budget) -> &mut RetryCounter {
        match budget {
            Budget::StateCheck => &mut self.state_check,
            Budget::FailedDelete => &mut self.failed_delete,
            Budget::IsDeletable => &mut self.is_deletable,
            Budget::IsTerminating => &mut self.is_terminating,
        }
    }
}

/// Where a queued resource ended up after one visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    /// Delete call accepted
    Deleted,
    /// Resource no longer exists
    AlreadyGone,
    /// Back to the tail of the queue
    Requeue,
    /// Budget spent; recorded and dropped
    GivenUp,
}

/// Per-kind tallies of one drain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrainSummary {
    pub kind: ResourceKind,
    pub listed: usize,
    pub deleted: usize,
    pub already_gone: usize,
    pub given_up: usize,
    /// Queue items processed, requeues included
    pub visits: usize,
}

impl DrainSummary {
    fn new(kind: ResourceKind, listed: usize) -> Self {
        Self {
            kind,
            listed,
            deleted: 0,
            already_gone: 0,
            given_up: 0,
            visits: 0,
        }
    }
}

/// One drain over one resource kind, borrowing the eraser's shared state
pub(crate) struct Drain<'a, R: DeletableResource> {
    resource: &'a R,
    budgets: &'a mut RetryBudgets,
    failures: &'a mut Vec<DeletionFailure>,
    sleep_interval: Duration,
}

impl<'a, R: DeletableResource> Drain<'a, R> {
    pub(crate) fn new(
        resource: &'a R,
        budgets: &'a mut RetryBudgets,
        failures: &'a mut Vec<DeletionFailure>,
        sleep_interval: Duration,
    ) -> Self {
        Self {
            resource,
            budgets,
            failures,
            sleep_interval,
        }
    }

    /// Drain every listed resource. Only the initial listing can fail.
    pub(crate) async fn run(mut self) -> Result<DrainSummary, ApiError> {
        let kind = self.resource.kind();
        let mut queue: VecDeque<ResourceRef> = self.resource.list().await?.into();
        let mut summary = DrainSummary::new(kind, queue.len());

        if queue.is_empty() {
            debug!(resource_type = %kind, "Nothing to delete");
            return Ok(summary);
        }

        info!(
            resource_type = %kind,
            count = queue.len(),
            "Deleting {}",
            self.resource.label_plural()
        );

        while !queue.is_empty() {
            tokio::time::sleep(self.sleep_interval).await;
            let Some(item) = queue.pop_front() else {
                break;
            };
            summary.visits += 1;

            match self.visit(&item.name).await {
                Visit::Deleted => summary.deleted += 1,
                Visit::AlreadyGone => summary.already_gone += 1,
                Visit::Requeue => queue.push_back(item),
                Visit::GivenUp => summary.given_up += 1,
            }
        }

        let undeletable = self
            .failures
            .iter()
            .filter(|f| f.resource_type == kind)
            .count();
        if undeletable > 0 {
            warn!(
                resource_type = %kind,
                undeletable,
                "Some {} could not be deleted",
                self.resource.label_plural()
            );
        } else {
            info!(
                resource_type = %kind,
                deleted = summary.deleted,
                already_gone = summary.already_gone,
                "All {} deleted",
                self.resource.label_plural()
            );
        }

        Ok(summary)
    }

    async fn visit(&mut self, name: &str) -> Visit {
        let kind = self.resource.kind();

        let state = match self.resource.describe_state(name).await {
            ApiOutcome::Done(state) => state,
            ApiOutcome::NotFound => {
                debug!(resource_type = %kind, resource = %name, "Already gone");
                return Visit::AlreadyGone;
            }
            ApiOutcome::Failed(e) => {
                return self.charge(name, Budget::StateCheck, e.to_string());
            }
        };

        match state.class() {
            StateClass::Terminating => {
                self.charge(name, Budget::IsTerminating, format!("state {state}"))
            }
            StateClass::Other => {
                self.charge(name, Budget::IsDeletable, format!("state {state}"))
            }
            StateClass::Deletable => match self.resource.delete(name).await {
                ApiOutcome::Done(()) => {
                    info!(resource_type = %kind, resource = %name, state = %state, "Deleted");
                    Visit::Deleted
                }
                ApiOutcome::NotFound => {
                    debug!(resource_type = %kind, resource = %name, "Already gone");
                    Visit::AlreadyGone
                }
                ApiOutcome::Failed(e) => self.charge(name, Budget::FailedDelete, e.to_string()),
            },
        }
    }

    /// Spend one attempt of `budget`; give up when it is exhausted.
    fn charge(&mut self, name: &str, budget: Budget, detail: String) -> Visit {
        let kind = self.resource.kind();
        let key = budget_key(kind, name);
        let reason = budget.failure_reason();
        let counter = self.budgets.counter(budget);

        let exhausted = counter.record_attempt(&key);
        let attempt = counter.count(&key);
        let limit = counter.max_retries();

        if exhausted {
            warn!(
                resource_type = %kind,
                resource = %name,
                reason = %reason,
                attempts = attempt,
                detail = %detail,
                "Giving up"
            );
            self.failures
                .push(DeletionFailure::new(kind, name, reason, detail));
            Visit::GivenUp
        } else {
            debug!(
                resource_type = %kind,
                resource = %name,
                reason = %reason,
                attempt,
                limit,
                detail = %detail,
                "Will retry"
            );
            Visit::Requeue
        }
    }
}

/// Counter key; qualified by kind so an index and a collection sharing a
/// name do not share budgets.
pub(crate) fn budget_key(kind: ResourceKind, name: &str) -> String {
    format!("{kind}/{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinecone_cleanup_common::ResourceState;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Collection-kind fake answering every describe with a fixed script
    struct Scripted {
        names: Vec<&'static str>,
        states: HashMap<&'static str, &'static str>,
        deletes: RefCell<Vec<String>>,
        describes: RefCell<usize>,
    }

    impl Scripted {
        fn new(states: &[(&'static str, &'static str)]) -> Self {
            Self {
                names: states.iter().map(|(n, _)| *n).collect(),
                states: states.iter().copied().collect(),
                deletes: RefCell::new(Vec::new()),
                describes: RefCell::new(0),
            }
        }
    }

    impl DeletableResource for Scripted {
        fn kind(&self) -> ResourceKind {
            ResourceKind::Collection
        }

        async fn list(&self) -> Result<Vec<ResourceRef>, ApiError> {
            Ok(self.names.iter().map(|n| ResourceRef::new(*n)).collect())
        }

        async fn describe_state(&self, name: &str) -> ApiOutcome<ResourceState> {
            *self.describes.borrow_mut() += 1;
            match self.states.get(name) {
                Some(&"<gone>") | None => ApiOutcome::NotFound,
                Some(&"<error>") => ApiOutcome::Failed(ApiError::Http {
                    status: 500,
                    message: "boom".into(),
                }),
                Some(state) => ApiOutcome::Done(ResourceState::new(*state)),
            }
        }

        async fn delete(&self, name: &str) -> ApiOutcome<()> {
            self.deletes.borrow_mut().push(name.to_string());
            ApiOutcome::Done(())
        }
    }

    fn config() -> EraserConfig {
        EraserConfig {
            sleep_interval: Duration::from_millis(500),
            max_retries: 3,
        }
    }

    async fn drain(resource: &Scripted) -> (DrainSummary, Vec<DeletionFailure>, RetryBudgets) {
        let config = config();
        let mut budgets = RetryBudgets::new(&config);
        let mut failures = Vec::new();
        let summary = Drain::new(resource, &mut budgets, &mut failures, config.sleep_interval)
            .run()
            .await
            .unwrap();
        (summary, failures, budgets)
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_list_returns_immediately() {
        let resource = Scripted::new(&[]);
        let start = tokio::time::Instant::now();
        let (summary, failures, _) = drain(&resource).await;
        assert_eq!(summary.visits, 0);
        assert!(failures.is_empty());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_is_deleted_and_gone_is_dropped() {
        let resource = Scripted::new(&[("a", "Ready"), ("b", "<gone>")]);
        let (summary, failures, _) = drain(&resource).await;

        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.already_gone, 1);
        assert!(failures.is_empty());
        assert_eq!(*resource.deletes.borrow(), vec!["a".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_visit_is_paced() {
        let resource = Scripted::new(&[("a", "Ready"), ("b", "InitializationFailed")]);
        let start = tokio::time::Instant::now();
        drain(&resource).await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert!(start.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_describe_errors_give_up_after_max_retries() {
        let resource = Scripted::new(&[("a", "<error>")]);
        let (summary, failures, budgets) = drain(&resource).await;

        assert_eq!(*resource.describes.borrow(), 3);
        assert_eq!(summary.given_up, 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].reason, FailureReason::DescribeFailed);
        assert_eq!(budgets.state_check.count("collection/a"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_terminating_uses_tripled_budget_and_is_dropped() {
        let resource = Scripted::new(&[("a", "Terminating")]);
        let (summary, failures, _) = drain(&resource).await;

        assert_eq!(*resource.describes.borrow(), 9);
        assert_eq!(summary.visits, 9);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].reason, FailureReason::StuckTerminating);
        assert!(resource.deletes.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_deletable_is_dropped() {
        let resource = Scripted::new(&[("a", "Initializing"), ("b", "Ready")]);
        let (summary, failures, _) = drain(&resource).await;

        assert_eq!(summary.deleted, 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].resource_name, "a");
        assert_eq!(failures[0].reason, FailureReason::NeverDeletable);
        assert_eq!(failures[0].detail, "state Initializing");
    }

    #[test]
    fn test_budget_key_is_kind_qualified() {
        assert_eq!(budget_key(ResourceKind::Index, "x"), "index/x");
        assert_ne!(
            budget_key(ResourceKind::Index, "x"),
            budget_key(ResourceKind::Collection, "x")
        );
    }

    #[test]
    fn test_every_budget_charges_its_own_counter() {
        let mut budgets = RetryBudgets::new(&config());
        budgets.counter(Budget::StateCheck).increment("collection/a");
        budgets.counter(Budget::FailedDelete).increment("collection/b");
        budgets.counter(Budget::IsDeletable).increment("collection/c");
        budgets.counter(Budget::IsTerminating).increment("collection/d");

        assert_eq!(budgets.state_check.count("collection/a"), 1);
        assert_eq!(budgets.failed_delete.count("collection/b"), 1);
        assert_eq!(budgets.is_deletable.count("collection/c"), 1);
        assert_eq!(budgets.is_terminating.count("collection/d"), 1);
        assert_eq!(budgets.state_check.count("collection/b"), 0);
    }

    #[test]
    fn test_budget_failure_reasons() {
        assert_eq!(
            Budget::StateCheck.failure_reason(),
            FailureReason::DescribeFailed
        );
        assert_eq!(
            Budget::FailedDelete.failure_reason(),
            FailureReason::DeleteFailed
        );
        assert_eq!(
            Budget::IsDeletable.failure_reason(),
            FailureReason::NeverDeletable
        );
        assert_eq!(
            Budget::IsTerminating.failure_reason(),
            FailureReason::StuckTerminating
        );
    }

    #[test]
    fn test_terminating_budget_is_tripled() {
        let budgets = RetryBudgets::new(&EraserConfig::default());
        assert_eq!(budgets.state_check.max_retries(), 5);
        assert_eq!(budgets.is_terminating.max_retries(), 15);
    }
}
