//! Service request entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{PaymentStatus, RequestStatus};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for request_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
pub enum RequestStatusDb {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl From<RequestStatusDb> for RequestStatus {
    fn from(db: RequestStatusDb) -> Self {
        match db {
            RequestStatusDb::Submitted => Self::Submitted,
            RequestStatusDb::UnderReview => Self::UnderReview,
            RequestStatusDb::Approved => Self::Approved,
            RequestStatusDb::Rejected => Self::Rejected,
        }
    }
}

impl From<RequestStatus> for RequestStatusDb {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Submitted => Self::Submitted,
            RequestStatus::UnderReview => Self::UnderReview,
            RequestStatus::Approved => Self::Approved,
            RequestStatus::Rejected => Self::Rejected,
        }
    }
}

/// Database enum for payment_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
pub enum PaymentStatusDb {
    Pending,
    Paid,
    Failed,
}

impl From<PaymentStatusDb> for PaymentStatus {
    fn from(db: PaymentStatusDb) -> Self {
        match db {
            PaymentStatusDb::Pending => Self::Pending,
            PaymentStatusDb::Paid => Self::Paid,
            PaymentStatusDb::Failed => Self::Failed,
        }
    }
}

impl From<PaymentStatus> for PaymentStatusDb {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Paid => Self::Paid,
            PaymentStatus::Failed => Self::Failed,
        }
    }
}

/// A requests row joined with its service's department.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRequestEntity {
    pub id: Uuid,
    pub description: String,
    pub status: RequestStatusDb,
    pub service_id: Uuid,
    pub department_id: Uuid,
    pub citizen_id: Uuid,
    pub reviewed_by: Option<Uuid>,
    pub payment_status: PaymentStatusDb,
    pub payment_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServiceRequestEntity> for domain::models::ServiceRequest {
    fn from(entity: ServiceRequestEntity) -> Self {
        Self {
            id: entity.id,
            description: entity.description,
            status: entity.status.into(),
            service_id: entity.service_id,
            department_id: entity.department_id,
            citizen_id: entity.citizen_id,
            reviewed_by: entity.reviewed_by,
            payment_status: entity.payment_status.into(),
            payment_amount: entity.payment_amount,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
