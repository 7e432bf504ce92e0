//! Persistence layer for the Civic Portal backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - PostgreSQL implementations of the domain store interfaces

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
