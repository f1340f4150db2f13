//! Configuration types for the eraser and its callers

use std::time::Duration;

pub use pinecone_cleanup_common::defaults::{
    CI_OUTER_DELAY, DEFAULT_API_VERSION, DEFAULT_ADMIN_URL, DEFAULT_AUTH_URL,
    DEFAULT_CONTROL_PLANE_URL, DEFAULT_MAX_RETRIES, DEFAULT_OUTER_ATTEMPTS,
    DEFAULT_SLEEP_INTERVAL, LIBRARY_OUTER_DELAY, TERMINATING_BUDGET_FACTOR,
};

/// Pacing and per-resource retry budgets for one `ProjectEraser`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraserConfig {
    /// Pause before every queue item is processed
    pub sleep_interval: Duration,
    /// Attempts allowed per resource for describe, delete and deletable checks
    pub max_retries: u32,
}

impl Default for EraserConfig {
    fn default() -> Self {
        Self {
            sleep_interval: DEFAULT_SLEEP_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl EraserConfig {
    /// Polls allowed while a resource reports a terminating status
    pub fn terminating_budget(&self) -> u32 {
        self.max_retries.saturating_mul(TERMINATING_BUDGET_FACTOR)
    }
}

/// Repetition of a whole erase cycle by the caller.
///
/// Every attempt builds a fresh `ProjectEraser`, so per-resource counters
/// start from zero each time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OuterRetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
    /// Retry when an attempt finishes with given-up resources, not only when it errors
    pub retry_on_failures: bool,
}

impl OuterRetryPolicy {
    /// Project deletion flow: retry while anything was given up on
    pub fn library() -> Self {
        Self {
            max_attempts: DEFAULT_OUTER_ATTEMPTS,
            delay: LIBRARY_OUTER_DELAY,
            retry_on_failures: true,
        }
    }

    /// CI cleanup entry point: retry only when an attempt errors
    pub fn ci() -> Self {
        Self {
            max_attempts: DEFAULT_OUTER_ATTEMPTS,
            delay: CI_OUTER_DELAY,
            retry_on_failures: false,
        }
    }
}

impl Default for OuterRetryPolicy {
    fn default() -> Self {
        Self::library()
    }
}

/// Endpoints and protocol version for the REST API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Control plane base URL (indexes, collections, backups)
    pub control_plane_url: String,
    /// Admin API base URL (projects, API keys)
    pub admin_url: String,
    /// OAuth token endpoint for service accounts
    pub auth_url: String,
    /// Sent as `X-Pinecone-API-Version`
    pub api_version: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            control_plane_url: DEFAULT_CONTROL_PLANE_URL.to_string(),
            admin_url: DEFAULT_ADMIN_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl ApiConfig {
    /// Point every endpoint at one base URL (used against mock servers)
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            control_plane_url: base.to_string(),
            admin_url: format!("{base}/admin"),
            auth_url: format!("{base}/oauth/token"),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}
