//! Default configuration values shared by the library and the CLI
//!
//! These constants keep the eraser, the orchestrator and the command line in agreement.

use std::time::Duration;

/// Pause before every queue item is processed (client-side rate limiting)
pub const DEFAULT_SLEEP_INTERVAL: Duration = Duration::from_millis(500);

/// Attempts allowed per resource and per failure category
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// The terminating-poll budget is this multiple of `max_retries`
pub const TERMINATING_BUDGET_FACTOR: u32 = 3;

/// Outer attempts of a whole erase cycle
pub const DEFAULT_OUTER_ATTEMPTS: u32 = 5;

/// Pause between outer attempts in the project deletion flow
pub const LIBRARY_OUTER_DELAY: Duration = Duration::from_secs(30);

/// Pause between outer attempts in the CI cleanup entry point
pub const CI_OUTER_DELAY: Duration = Duration::from_secs(10);

/// Production control plane
pub const DEFAULT_CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

/// Production admin API
pub const DEFAULT_ADMIN_URL: &str = "https://api.pinecone.io/admin";

/// OAuth token endpoint for service accounts
pub const DEFAULT_AUTH_URL: &str = "https://login.pinecone.io/oauth/token";

/// Value of the `X-Pinecone-API-Version` header
pub const DEFAULT_API_VERSION: &str = "2025-04";

/// Role granted to scoped cleanup keys
pub const SCOPED_KEY_ROLE: &str = "ProjectEditor";
