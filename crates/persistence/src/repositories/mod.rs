//! Repository implementations for database operations.

pub mod request;
pub mod service;

pub use request::RequestRepository;
pub use service::ServiceRepository;
