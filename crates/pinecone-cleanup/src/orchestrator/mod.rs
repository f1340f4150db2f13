//! Outer retry orchestration
//!
//! Wraps `ProjectEraser` in whole-cycle retries and the scoped key
//! lifecycle, and ends with the project deletion:
//! - `attempts`: repeated erase cycles with fresh counters
//! - `project`: project deletion with cascading cleanup
//! - `ci`: the CI cleanup entry point

pub mod attempts;
pub mod ci;
pub mod error;
pub mod project;
pub mod scoped_key;

pub use attempts::{CleanupPlan, EraseReport, erase_with_retries};
pub use ci::run_ci_cleanup;
pub use error::CleanupError;
pub use project::{DeleteProjectOptions, delete_project};
pub use scoped_key::{KEY_NAME_PREFIX, key_name, mint_scoped_key, revoke_scoped_key};
