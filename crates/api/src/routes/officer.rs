//! Officer endpoints: department queue, opening a request, deciding it.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{
    ListRequestsQuery, ListRequestsResponse, OpenRequestResponse, RequestUpdatedResponse,
    UpdateRequestStatusRequest,
};
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

/// List requests in the officer's department.
///
/// GET /api/v1/officer/requests
pub async fn list_requests(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<ListRequestsResponse>, ApiError> {
    let actor = actor.reviewer()?;

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

/// Open a request for review. The first officer to open it becomes the
/// reviewer; everyone else sees who holds it.
///
/// GET /api/v1/officer/requests/:request_id
pub async fn open_request(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(request_id): Path<Uuid>,
) -> Result<Json<OpenRequestResponse>, ApiError> {
    let opened = state
        .workflow
        .assignment
        .open_for_review(&actor.0, request_id)
        .await?;

    Ok(Json(opened.into()))
}

/// Approve or reject a request under review.
///
/// POST /api/v1/officer/requests/:request_id/status
pub async fn update_status(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(request_id): Path<Uuid>,
    Json(body): Json<UpdateRequestStatusRequest>,
) -> Result<Json<RequestUpdatedResponse>, ApiError> {
    let request = state
        .workflow
        .transitions
        .change_status(&actor.0, request_id, &body.status)
        .await?;

    Ok(Json(RequestUpdatedResponse { request }))
}
