//! Status transition engine.
//!
//! `submitted -> under_review` happens only through a claim. From there the
//! assigned reviewer may approve or reject, after which the request is locked.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::authorization;
use super::notification::{NotificationResult, NotificationService, RequestDecidedPayload};
use crate::error::{TransitionViolation, WorkflowError};
use crate::models::{Actor, RequestStatus, ServiceRequest};
use crate::store::{RequestStore, TransitionOutcome};

/// State rules for a reviewer-requested status change.
pub fn validate_transition(
    current: RequestStatus,
    target: RequestStatus,
) -> Result<(), TransitionViolation> {
    match (current, target) {
        (current, _) if current.is_terminal() => Err(TransitionViolation::TerminalState),
        (RequestStatus::Submitted, _) => Err(TransitionViolation::MustClaimFirst),
        (RequestStatus::UnderReview, RequestStatus::Approved | RequestStatus::Rejected) => Ok(()),
        _ => Err(TransitionViolation::BadTargetStatus),
    }
}

pub struct StatusTransitionEngine {
    store: Arc<dyn RequestStore>,
    notifier: Arc<dyn NotificationService>,
}

impl StatusTransitionEngine {
    pub fn new(store: Arc<dyn RequestStore>, notifier: Arc<dyn NotificationService>) -> Self {
        Self { store, notifier }
    }

    /// Apply a status change requested by `actor`.
    ///
    /// Checks run in a fixed order: target, existence, authorization, state
    /// rules, then the conditional write.
    pub async fn change_status(
        &self,
        actor: &Actor,
        request_id: Uuid,
        target: &str,
    ) -> Result<ServiceRequest, WorkflowError> {
        let target = RequestStatus::parse_target(target)?;

        let request = self
            .store
            .get(request_id)
            .await?
            .ok_or(WorkflowError::NotFound(request_id))?;

        if let Err(reason) = authorization::check_mutate(actor, &request) {
            warn!(
                request_id = %request_id,
                actor_id = %actor.id(),
                role = %actor.role(),
                reason = %reason,
                "Status change denied"
            );
            return Err(reason.into());
        }

        if let Err(violation) = validate_transition(request.status, target) {
            debug!(
                request_id = %request_id,
                status = %request.status,
                target = %target,
                violation = %violation,
                "Status change rejected by state rules"
            );
            return Err(violation.into());
        }

        let officer_id = actor.id();
        let updated = match self
            .store
            .conditional_transition(request_id, officer_id, request.status, target)
            .await?
        {
            TransitionOutcome::Applied(updated) => updated,
            TransitionOutcome::Rejected => {
                warn!(
                    request_id = %request_id,
                    officer_id = %officer_id,
                    target = %target,
                    "Status changed concurrently, write not applied"
                );
                return Err(WorkflowError::StoreConflict(request_id));
            }
        };

        info!(
            request_id = %request_id,
            officer_id = %officer_id,
            department_id = %updated.department_id,
            from = %request.status,
            status = %updated.status,
            "Request status changed"
        );
        counter!("review_transitions_total", "status" => updated.status.as_str()).increment(1);

        if updated.status.is_terminal() {
            self.notify_decision(&updated, officer_id).await;
        }

        Ok(updated)
    }

    async fn notify_decision(&self, request: &ServiceRequest, officer_id: Uuid) {
        let payload =
            RequestDecidedPayload::new(request.id, request.citizen_id, request.status, officer_id);

        match self.notifier.send_request_decided(payload).await {
            NotificationResult::Sent => {}
            NotificationResult::Skipped => {
                debug!(request_id = %request.id, "Decision notification skipped");
            }
            NotificationResult::Failed(reason) => {
                warn!(
                    request_id = %request.id,
                    error = %reason,
                    "Failed to send decision notification"
                );
            }
        }
    }
}
