//! pinecone-cleanup - Pinecone project resource eraser
//!
//! This crate drains every index, collection and backup out of a Pinecone
//! project with bounded per-resource retries, then deletes the project.

pub mod api;
pub mod config;
pub mod eraser;
pub mod orchestrator;
