//! Domain models for the Civic Portal review workflow.

pub mod actor;
pub mod dashboard;
pub mod request;
pub mod service;

pub use actor::{Actor, ActorError, Role};
pub use dashboard::{DepartmentWorkloadResponse, OfficerWorkload, RequestStats};
pub use request::{
    AdminListRequestsQuery, AssignmentState, CreateServiceRequestRequest, ListRequestsQuery,
    ListRequestsResponse, NewServiceRequest, OpenRequestResponse, PaymentStatus, RequestFilter,
    RequestScope, RequestStatus, RequestUpdatedResponse, ServiceRequest,
    UpdateRequestStatusRequest,
};
pub use service::Service;
