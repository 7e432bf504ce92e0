//! Service catalog models (read-only for the review workflow).

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A service citizens can apply for.
///
/// Each service belongs to exactly one department, which scopes every request
/// made against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub department_id: Uuid,
    pub fee: Decimal,
}
