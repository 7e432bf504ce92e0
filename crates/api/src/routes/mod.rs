//! HTTP route handlers.

pub mod admin;
pub mod citizen;
pub mod head;
pub mod health;
pub mod officer;
