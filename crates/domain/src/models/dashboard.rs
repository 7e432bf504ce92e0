//! Aggregate read models for head and admin dashboards.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Review counts for one officer within a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OfficerWorkload {
    pub officer_id: Uuid,
    pub under_review: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl OfficerWorkload {
    pub fn total(&self) -> i64 {
        self.under_review + self.approved + self.rejected
    }
}

/// Response for the department head workload view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DepartmentWorkloadResponse {
    pub department_id: Uuid,
    pub officers: Vec<OfficerWorkload>,
}

/// Portal-wide request totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestStats {
    pub total: i64,
    pub submitted: i64,
    pub under_review: i64,
    pub approved: i64,
    pub rejected: i64,
    /// Sum of snapshot amounts on paid requests.
    pub revenue: Decimal,
}
