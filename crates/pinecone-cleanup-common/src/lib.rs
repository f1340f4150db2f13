//! pinecone-cleanup-common - Shared types and defaults
//!
//! This crate provides the types shared by the eraser library, the CLI and
//! the test fakes, without any HTTP dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`defaults`]: Default configuration values
//! - [`resource_kind`]: Index / collection / backup labels and drain order
//! - [`resource_state`]: Status strings and their deletion classification

pub mod defaults;
pub mod resource_kind;
pub mod resource_state;

// Re-export commonly used types
pub use resource_kind::ResourceKind;
pub use resource_state::{ResourceState, StateClass};
