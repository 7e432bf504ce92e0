//! Shared utilities and common types for the Civic Portal backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT access token verification (actor claims)
//! - Offset pagination helpers
//! - Common validation logic

pub mod jwt;
pub mod pagination;
pub mod validation;
