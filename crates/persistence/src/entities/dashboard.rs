//! Aggregate rows for workload and statistics queries.

use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// One officer's review counts within a department.
#[derive(Debug, Clone, FromRow)]
pub struct OfficerWorkloadEntity {
    pub officer_id: Uuid,
    pub under_review: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl From<OfficerWorkloadEntity> for domain::models::OfficerWorkload {
    fn from(entity: OfficerWorkloadEntity) -> Self {
        Self {
            officer_id: entity.officer_id,
            under_review: entity.under_review,
            approved: entity.approved,
            rejected: entity.rejected,
        }
    }
}

/// Portal-wide request counts.
#[derive(Debug, Clone, FromRow)]
pub struct RequestStatsEntity {
    pub total: i64,
    pub submitted: i64,
    pub under_review: i64,
    pub approved: i64,
    pub rejected: i64,
    pub revenue: Decimal,
}

impl From<RequestStatsEntity> for domain::models::RequestStats {
    fn from(entity: RequestStatsEntity) -> Self {
        Self {
            total: entity.total,
            submitted: entity.submitted,
            under_review: entity.under_review,
            approved: entity.approved,
            rejected: entity.rejected,
            revenue: entity.revenue,
        }
    }
}
