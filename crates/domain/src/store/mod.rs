//! Request store and service catalog interfaces.
//!
//! The workflow only issues the operations below against its backing store.
//! Every mutation is a single compare-and-set so concurrent callers in
//! different processes cannot both win.

mod memory;

pub use memory::{InMemoryRequestStore, InMemoryServiceCatalog};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    NewServiceRequest, OfficerWorkload, PaymentStatus, RequestFilter, RequestScope, RequestStats,
    RequestStatus, Service, ServiceRequest,
};

/// Result of `conditional_assign`.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignOutcome {
    /// The row was unassigned and `submitted`; it now belongs to the officer.
    Assigned(ServiceRequest),
    /// The guard condition did not hold, nothing was written.
    NotApplied,
}

/// Result of `conditional_transition`.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Applied(ServiceRequest),
    /// The row no longer had the expected status and reviewer.
    Rejected,
}

/// Durable record of service requests.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Load a request with its department resolved through the service.
    async fn get(&self, id: Uuid) -> Result<Option<ServiceRequest>, StoreError>;

    /// List requests in a scope, newest first.
    async fn list(
        &self,
        scope: RequestScope,
        filter: &RequestFilter,
    ) -> Result<Vec<ServiceRequest>, StoreError>;

    async fn list_by_department(
        &self,
        department_id: Uuid,
        filter: &RequestFilter,
    ) -> Result<Vec<ServiceRequest>, StoreError> {
        self.list(RequestScope::Department(department_id), filter)
            .await
    }

    /// Count requests in a scope. Pagination fields of the filter are ignored.
    async fn count(&self, scope: RequestScope, filter: &RequestFilter) -> Result<i64, StoreError>;

    /// Insert a new request in `submitted` / `pending` state.
    async fn insert(&self, request: NewServiceRequest) -> Result<ServiceRequest, StoreError>;

    /// Set `reviewed_by = officer_id, status = under_review` only where
    /// `reviewed_by IS NULL AND status = submitted`.
    async fn conditional_assign(
        &self,
        id: Uuid,
        officer_id: Uuid,
    ) -> Result<AssignOutcome, StoreError>;

    /// Move `from -> to` only where the row still has status `from` and
    /// `reviewed_by = officer_id`.
    async fn conditional_transition(
        &self,
        id: Uuid,
        officer_id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<TransitionOutcome, StoreError>;

    /// Returns `None` when the request does not exist.
    async fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<ServiceRequest>, StoreError>;

    /// Per-officer review counts for a department.
    async fn officer_workload(&self, department_id: Uuid)
        -> Result<Vec<OfficerWorkload>, StoreError>;

    async fn stats(&self) -> Result<RequestStats, StoreError>;

    /// Cheap liveness probe used by readiness checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Read-only access to the service catalog.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn find_service(&self, id: Uuid) -> Result<Option<Service>, StoreError>;
}
