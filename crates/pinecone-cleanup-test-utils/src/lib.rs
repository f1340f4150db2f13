//! Shared test utilities for pinecone-cleanup
//!
//! This crate provides in-memory stand-ins for the Pinecone API that the
//! integration tests drive the eraser and orchestrator against.
//!
//! ## Modules
//!
//! - [`resources`]: scripted resources and a fake project
//! - [`admin`]: recording admin API

pub mod admin;
pub mod resources;

// Re-export commonly used items
pub use admin::{AdminCall, FakeAdmin};
pub use resources::{Call, Describe, FakeEntry, FakeProject, FakeResource, Reply};

use chrono::Utc;
use pinecone_cleanup::config::EraserConfig;
use std::time::Duration;

/// Eraser settings used across tests: 500ms pacing, three attempts per budget
pub fn test_config() -> EraserConfig {
    EraserConfig {
        sleep_interval: Duration::from_millis(500),
        max_retries: 3,
    }
}

/// Generate a unique project ID for test runs.
///
/// Format: `test-project-{timestamp_ms}-{counter}`
///
/// # Example
///
/// ```
/// use pinecone_cleanup_test_utils::test_project_id;
///
/// let project_id = test_project_id();
/// assert!(project_id.starts_with("test-project-"));
/// ```
pub fn test_project_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp_millis();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("test-project-{ts}-{counter}")
}
