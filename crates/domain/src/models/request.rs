//! Service request domain models for the review workflow.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{TransitionViolation, WorkflowError};

/// Review status of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Approved and rejected requests accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Approved | RequestStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Submitted => "submitted",
            RequestStatus::UnderReview => "under_review",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Parses a status-change target as sent by a reviewer.
    ///
    /// Only `under_review`, `approved` and `rejected` are accepted as targets;
    /// anything else (including `submitted`) is a bad target.
    pub fn parse_target(value: &str) -> Result<Self, WorkflowError> {
        match value {
            "under_review" => Ok(RequestStatus::UnderReview),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(WorkflowError::InvalidTransition(
                TransitionViolation::BadTargetStatus,
            )),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state, tracked independently of the review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A citizen's service request.
///
/// `department_id` is resolved through the request's service when the record is
/// read; it is not stored on the request itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ServiceRequest {
    pub id: Uuid,
    pub description: String,
    pub status: RequestStatus,
    pub service_id: Uuid,
    pub department_id: Uuid,
    pub citizen_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
    pub payment_status: PaymentStatus,
    pub payment_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a new request in `submitted` state.
#[derive(Debug, Clone, PartialEq)]
pub struct NewServiceRequest {
    pub citizen_id: Uuid,
    pub service_id: Uuid,
    pub description: String,
    /// Service fee at submission time.
    pub payment_amount: Decimal,
}

/// Which slice of requests a listing may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    Department(Uuid),
    Citizen(Uuid),
    All,
}

/// Optional filters applied on top of a scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub service_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the citizen's display name.
    pub citizen_name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl RequestFilter {
    /// Whether a request satisfies every set filter. Pagination and the
    /// citizen name need store data and are applied by the store.
    pub fn matches(&self, request: &ServiceRequest) -> bool {
        self.status.map_or(true, |s| request.status == s)
            && self.service_id.map_or(true, |s| request.service_id == s)
            && self.department_id.map_or(true, |d| request.department_id == d)
            && self.created_from.map_or(true, |from| request.created_at >= from)
            && self.created_to.map_or(true, |to| request.created_at <= to)
    }
}

impl RequestScope {
    pub fn contains(&self, request: &ServiceRequest) -> bool {
        match self {
            RequestScope::Department(department_id) => request.department_id == *department_id,
            RequestScope::Citizen(citizen_id) => request.citizen_id == *citizen_id,
            RequestScope::All => true,
        }
    }
}

/// Request body for citizen intake.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateServiceRequestRequest {
    pub service_id: Uuid,
    #[validate(custom(function = "shared::validation::validate_description"))]
    pub description: String,
}

/// Request body for a reviewer's status change.
///
/// `status` stays a string so an unknown target surfaces as a workflow
/// rejection rather than a deserialization error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateRequestStatusRequest {
    pub status: String,
}

/// Query parameters for department and citizen listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListRequestsQuery {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub service_id: Option<Uuid>,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    /// Citizen display name fragment.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
}

/// Query parameters for the admin listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminListRequestsQuery {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub service_id: Option<Uuid>,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
}

impl ListRequestsQuery {
    pub fn filter(&self) -> RequestFilter {
        RequestFilter {
            status: self.status,
            service_id: self.service_id,
            citizen_name: self
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            ..Default::default()
        }
    }
}

impl AdminListRequestsQuery {
    pub fn filter(&self) -> RequestFilter {
        RequestFilter {
            status: self.status,
            service_id: self.service_id,
            department_id: self.department_id,
            created_from: self.from,
            created_to: self.to,
            ..Default::default()
        }
    }
}

/// Response for listing requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListRequestsResponse {
    pub data: Vec<ServiceRequest>,
    pub pagination: shared::pagination::Pagination,
}

/// How opening a request resolved its assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
    /// This call made the caller the reviewer.
    Claimed,
    /// The caller was already the reviewer.
    AlreadyOwned,
    /// Another officer is (or was) the reviewer.
    AlreadyAssigned,
}

/// Response for opening a request for review.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OpenRequestResponse {
    pub assignment: AssignmentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<Uuid>,
    pub request: ServiceRequest,
}

/// Response after a status change or payment confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestUpdatedResponse {
    pub request: ServiceRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ServiceRequest {
        let now = Utc::now();
        ServiceRequest {
            id: Uuid::new_v4(),
            description: "Birth certificate copy".to_string(),
            status: RequestStatus::Submitted,
            service_id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            citizen_id: Uuid::new_v4(),
            reviewed_by: None,
            payment_status: PaymentStatus::Pending,
            payment_amount: Decimal::new(5000, 2),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_request_status_display() {
        assert_eq!(RequestStatus::Submitted.to_string(), "submitted");
        assert_eq!(RequestStatus::UnderReview.to_string(), "under_review");
        assert_eq!(RequestStatus::Approved.to_string(), "approved");
        assert_eq!(RequestStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!RequestStatus::Submitted.is_terminal());
        assert!(!RequestStatus::UnderReview.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(
            RequestStatus::parse_target("approved").unwrap(),
            RequestStatus::Approved
        );
        assert_eq!(
            RequestStatus::parse_target("under_review").unwrap(),
            RequestStatus::UnderReview
        );
        for bad in ["submitted", "APPROVED", "", "cancelled"] {
            assert!(matches!(
                RequestStatus::parse_target(bad),
                Err(WorkflowError::InvalidTransition(
                    TransitionViolation::BadTargetStatus
                ))
            ));
        }
    }

    #[test]
    fn test_payment_status_display() {
        assert_eq!(PaymentStatus::Pending.to_string(), "pending");
        assert_eq!(PaymentStatus::Paid.to_string(), "paid");
        assert_eq!(PaymentStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_request_serializes_amount_as_string() {
        let json = serde_json::to_value(sample_request()).unwrap();
        assert_eq!(json["payment_amount"], "50.00");
        assert_eq!(json["status"], "submitted");
        assert_eq!(json["payment_status"], "pending");
        assert!(json.get("reviewed_by").is_none());
    }

    #[test]
    fn test_filter_matches() {
        let request = sample_request();

        assert!(RequestFilter::default().matches(&request));
        assert!(RequestFilter {
            status: Some(RequestStatus::Submitted),
            service_id: Some(request.service_id),
            ..Default::default()
        }
        .matches(&request));
        assert!(!RequestFilter {
            status: Some(RequestStatus::Approved),
            ..Default::default()
        }
        .matches(&request));
        assert!(!RequestFilter {
            created_from: Some(request.created_at + chrono::Duration::seconds(1)),
            ..Default::default()
        }
        .matches(&request));
    }

    #[test]
    fn test_list_query_name_filter() {
        let query = ListRequestsQuery {
            name: Some("  Novak ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.filter().citizen_name.as_deref(), Some("Novak"));

        let blank = ListRequestsQuery {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.filter().citizen_name, None);
    }

    #[test]
    fn test_scope_contains() {
        let request = sample_request();

        assert!(RequestScope::All.contains(&request));
        assert!(RequestScope::Department(request.department_id).contains(&request));
        assert!(!RequestScope::Department(Uuid::new_v4()).contains(&request));
        assert!(RequestScope::Citizen(request.citizen_id).contains(&request));
        assert!(!RequestScope::Citizen(Uuid::new_v4()).contains(&request));
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateServiceRequestRequest = serde_json::from_str(&format!(
            r#"{{"service_id":"{}","description":"   "}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListRequestsQuery = serde_json::from_str("{}").unwrap();
        assert!(query.status.is_none());
        assert!(query.page.is_none());

        let query: ListRequestsQuery =
            serde_json::from_str(r#"{"status":"under_review","page":2}"#).unwrap();
        assert_eq!(query.status, Some(RequestStatus::UnderReview));
        assert_eq!(query.page, Some(2));
        assert_eq!(query.filter().status, Some(RequestStatus::UnderReview));
    }

    #[test]
    fn test_admin_query_filter() {
        let department = Uuid::new_v4();
        let query: AdminListRequestsQuery = serde_json::from_str(&format!(
            r#"{{"department_id":"{}","from":"2024-01-01T00:00:00Z"}}"#,
            department
        ))
        .unwrap();

        let filter = query.filter();
        assert_eq!(filter.department_id, Some(department));
        assert!(filter.created_from.is_some());
        assert!(filter.created_to.is_none());
        assert!(filter.limit.is_none());
    }
}
