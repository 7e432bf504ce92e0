//! Domain layer for the Civic Portal backend.
//!
//! This crate contains:
//! - Domain models (ServiceRequest, Service, Actor)
//! - The review workflow services (authorization, assignment, transitions, payment)
//! - The request store interface and an in-memory implementation
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{ForbiddenReason, StoreError, TransitionViolation, WorkflowError};
