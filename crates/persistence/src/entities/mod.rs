//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod dashboard;
pub mod request;
pub mod service;

pub use dashboard::{OfficerWorkloadEntity, RequestStatsEntity};
pub use request::{PaymentStatusDb, RequestStatusDb, ServiceRequestEntity};
pub use service::ServiceEntity;
