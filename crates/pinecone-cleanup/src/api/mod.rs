//! Pinecone REST clients
//!
//! This module provides thin wrappers around the REST API for:
//! - Control plane: indexes, collections, backups
//! - Admin: service-account login, scoped API keys, projects
//! - resources: `DeletableResource` adapters used by the eraser

pub mod admin;
pub mod context;
pub mod control;
pub mod error;
pub mod resources;

// Core clients
pub use admin::{AdminClient, AdminOperations, ScopedApiKey};
pub use context::{ApiContext, Credentials};
pub use control::{BackupModel, CollectionModel, ControlPlaneClient, IndexModel};

// Error handling
pub use error::{ApiError, classify_status};

// Eraser adapters
pub use resources::{Backups, Collections, Indexes, PineconeProject};
