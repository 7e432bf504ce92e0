//! Department head dashboard.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::DepartmentWorkloadResponse;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

#[derive(Debug, Default, Deserialize)]
pub struct WorkloadQuery {
    /// Required for admins, optional (and must match) for heads.
    #[serde(default)]
    pub department_id: Option<Uuid>,
}

/// Per-officer review counts for a department.
///
/// GET /api/v1/head/workload
pub async fn workload(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(query): Query<WorkloadQuery>,
) -> Result<Json<DepartmentWorkloadResponse>, ApiError> {
    let response = state
        .workflow
        .queries
        .department_workload(&actor.0, query.department_id)
        .await?;

    Ok(Json(response))
}
