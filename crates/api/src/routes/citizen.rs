//! Citizen endpoints: intake, status display and payment confirmation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateServiceRequestRequest, ListRequestsQuery, ListRequestsResponse, RequestUpdatedResponse,
    ServiceRequest,
};
use shared::pagination::PageRequest;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

/// Submit a new service request.
///
/// POST /api/v1/citizen/requests
pub async fn create_request(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(body): Json<CreateServiceRequestRequest>,
) -> Result<(StatusCode, Json<ServiceRequest>), ApiError> {
    let actor = actor.citizen()?;
    body.validate()?;

    let request = state
        .workflow
        .payments
        .submit_request(&actor, body.service_id, &body.description)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// List the caller's own requests.
///
/// GET /api/v1/citizen/requests
pub async fn list_requests(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<ListRequestsResponse>, ApiError> {
    let actor = actor.citizen()?;

    let response = state
        .workflow
        .queries
        .list_for_actor(
            &actor,
            None,
            query.filter(),
            PageRequest::new(query.page, query.per_page),
        )
        .await?;

    Ok(Json(response))
}

/// Show one of the caller's requests.
///
/// GET /api/v1/citizen/requests/:request_id
pub async fn get_request(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(request_id): Path<Uuid>,
) -> Result<Json<ServiceRequest>, ApiError> {
    let actor = actor.citizen()?;
    let request = state
        .workflow
        .queries
        .get_for_actor(&actor, request_id)
        .await?;
    Ok(Json(request))
}

/// Confirm payment of the request fee.
///
/// POST /api/v1/citizen/requests/:request_id/payment/confirm
pub async fn confirm_payment(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RequestUpdatedResponse>, ApiError> {
    let request = state
        .workflow
        .payments
        .confirm_payment(&actor.0, request_id)
        .await?;

    Ok(Json(RequestUpdatedResponse { request }))
}
