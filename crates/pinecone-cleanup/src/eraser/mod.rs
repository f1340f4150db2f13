//! Project resource eraser
//!
//! Drives every index, collection and backup of a project through its
//! deletion lifecycle, tolerating transient API errors, resources that have
//! already vanished and resources that are not yet deletable:
//! - `retry_counter`: per-resource attempt budgets
//! - `resource`: capability traits implemented once per resource kind
//! - `drain`: the per-kind queue loop
//! - `project`: `ProjectEraser`, the per-attempt orchestrator

pub mod drain;
pub mod error;
pub mod failure;
pub mod project;
pub mod resource;
pub mod retry_counter;

pub use drain::DrainSummary;
pub use error::EraseError;
pub use failure::{DeletionFailure, FailureReason};
pub use project::ProjectEraser;
pub use resource::{
    ApiOutcome, DeletableResource, ProjectResources, ProtectedResource, ResourceRef,
};
pub use retry_counter::RetryCounter;
