//! Admin reporting endpoints. Admins read requests but never change them.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{AdminListRequestsQuery, ListRequestsResponse, RequestStats};
use shared::pagination::PageRequest;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

/// List all requests with optional filters.
///
/// GET /api/v1/admin/requests
pub async fn list_requests(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(query): Query<AdminListRequestsQuery>,
) -> Result<Json<ListRequestsResponse>, ApiError> {
    let actor = actor.admin()?;

    let response = state
        .workflow
        .queries
        .list_for_actor(
            &actor,
            query.department_id,
            query.filter(),
            PageRequest::new(query.page, query.per_page),
        )
        .await?;

    Ok(Json(response))
}

/// Portal-wide totals and collected revenue.
///
/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    actor: CurrentActor,
) -> Result<Json<RequestStats>, ApiError> {
    let stats = state.workflow.queries.stats(&actor.0).await?;
    Ok(Json(stats))
}
