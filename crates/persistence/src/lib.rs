//! Persistence layer for the facility booking backend.
//!
//! This crate contains:
//! - Database connection management and store-level lock primitives
//! - Entity definitions (database row mappings)
//! - Repository implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
