//! Assignment resolver: the first officer to open a request becomes its
//! reviewer.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::authorization;
use crate::error::{ForbiddenReason, WorkflowError};
use crate::models::{Actor, AssignmentState, OpenRequestResponse, RequestStatus, ServiceRequest};
use crate::store::{AssignOutcome, RequestStore};

/// How opening a request resolved its reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This call assigned the request to the actor.
    Claimed,
    /// The actor already was the reviewer.
    AlreadyOwned,
    /// Someone else holds the request. `None` when the request progressed
    /// past `submitted` but its reviewer record is gone.
    AlreadyAssigned { reviewer_id: Option<Uuid> },
}

impl ClaimOutcome {
    fn label(&self) -> &'static str {
        match self {
            ClaimOutcome::Claimed => "claimed",
            ClaimOutcome::AlreadyOwned => "already_owned",
            ClaimOutcome::AlreadyAssigned { .. } => "already_assigned",
        }
    }
}

/// A request as seen after opening it for review.
#[derive(Debug, Clone)]
pub struct OpenedRequest {
    pub outcome: ClaimOutcome,
    pub request: ServiceRequest,
}

impl From<OpenedRequest> for OpenRequestResponse {
    fn from(opened: OpenedRequest) -> Self {
        let (assignment, reviewer_id) = match opened.outcome {
            ClaimOutcome::Claimed => (AssignmentState::Claimed, opened.request.reviewed_by),
            ClaimOutcome::AlreadyOwned => {
                (AssignmentState::AlreadyOwned, opened.request.reviewed_by)
            }
            ClaimOutcome::AlreadyAssigned { reviewer_id } => {
                (AssignmentState::AlreadyAssigned, reviewer_id)
            }
        };

        Self {
            assignment,
            reviewer_id,
            request: opened.request,
        }
    }
}

pub struct AssignmentResolver {
    store: Arc<dyn RequestStore>,
}

impl AssignmentResolver {
    pub fn new(store: Arc<dyn RequestStore>) -> Self {
        Self { store }
    }

    /// Open a request for review, claiming it if nobody has yet.
    ///
    /// Never overwrites an existing reviewer. Losing the claim race is not an
    /// error: the caller gets the winner back as `AlreadyAssigned`.
    pub async fn open_for_review(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> Result<OpenedRequest, WorkflowError> {
        let request = self
            .store
            .get(request_id)
            .await?
            .ok_or(WorkflowError::NotFound(request_id))?;

        if !actor.is_reviewer() {
            warn!(
                request_id = %request_id,
                actor_id = %actor.id(),
                role = %actor.role(),
                "Non-reviewer attempted to open request for review"
            );
            return Err(ForbiddenReason::RoleNotPermitted.into());
        }

        if let Err(reason) = authorization::check_read(actor, &request) {
            warn!(
                request_id = %request_id,
                officer_id = %actor.id(),
                department_id = %request.department_id,
                reason = %reason,
                "Officer denied access to request"
            );
            return Err(reason.into());
        }

        let officer_id = actor.id();
        let opened = match request.reviewed_by {
            Some(reviewer) => existing_assignment(officer_id, reviewer, request),
            None if request.status != RequestStatus::Submitted => OpenedRequest {
                outcome: ClaimOutcome::AlreadyAssigned { reviewer_id: None },
                request,
            },
            None => self.claim(officer_id, request_id).await?,
        };

        counter!("review_claims_total", "outcome" => opened.outcome.label()).increment(1);
        Ok(opened)
    }

    async fn claim(&self, officer_id: Uuid, request_id: Uuid) -> Result<OpenedRequest, WorkflowError> {
        match self.store.conditional_assign(request_id, officer_id).await? {
            AssignOutcome::Assigned(request) => {
                info!(
                    request_id = %request_id,
                    officer_id = %officer_id,
                    department_id = %request.department_id,
                    "Request claimed for review"
                );
                Ok(OpenedRequest {
                    outcome: ClaimOutcome::Claimed,
                    request,
                })
            }
            AssignOutcome::NotApplied => {
                let current = self
                    .store
                    .get(request_id)
                    .await?
                    .ok_or(WorkflowError::NotFound(request_id))?;

                debug!(
                    request_id = %request_id,
                    officer_id = %officer_id,
                    reviewed_by = ?current.reviewed_by,
                    status = %current.status,
                    "Lost claim race"
                );

                match current.reviewed_by {
                    Some(reviewer) => Ok(existing_assignment(officer_id, reviewer, current)),
                    None if current.status == RequestStatus::Submitted => {
                        Err(WorkflowError::StoreConflict(request_id))
                    }
                    None => Ok(OpenedRequest {
                        outcome: ClaimOutcome::AlreadyAssigned { reviewer_id: None },
                        request: current,
                    }),
                }
            }
        }
    }
}

fn existing_assignment(officer_id: Uuid, reviewer: Uuid, request: ServiceRequest) -> OpenedRequest {
    let outcome = if reviewer == officer_id {
        ClaimOutcome::AlreadyOwned
    } else {
        ClaimOutcome::AlreadyAssigned {
            reviewer_id: Some(reviewer),
        }
    };
    OpenedRequest { outcome, request }
}
