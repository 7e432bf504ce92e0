//! Payment coupling: fee snapshot at intake and citizen payment confirmation.
//!
//! Payment state is tracked next to the review status but never gates it.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ForbiddenReason, WorkflowError};
use crate::models::{Actor, NewServiceRequest, PaymentStatus, ServiceRequest};
use crate::store::{RequestStore, ServiceCatalog};

/// Whether the citizen still has something to pay for this request.
pub fn payment_required(request: &ServiceRequest) -> bool {
    request.payment_amount > Decimal::ZERO && request.payment_status != PaymentStatus::Paid
}

pub struct PaymentCoupling {
    store: Arc<dyn RequestStore>,
    catalog: Arc<dyn ServiceCatalog>,
}

impl PaymentCoupling {
    pub fn new(store: Arc<dyn RequestStore>, catalog: Arc<dyn ServiceCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Create a request for `service_id`, fixing its payment amount to the
    /// service fee as of now.
    pub async fn submit_request(
        &self,
        actor: &Actor,
        service_id: Uuid,
        description: &str,
    ) -> Result<ServiceRequest, WorkflowError> {
        let Actor::Citizen { id: citizen_id } = *actor else {
            return Err(ForbiddenReason::RoleNotPermitted.into());
        };

        shared::validation::validate_description(description).map_err(|e| {
            WorkflowError::Validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            )
        })?;

        let service = self
            .catalog
            .find_service(service_id)
            .await?
            .ok_or_else(|| WorkflowError::Validation(format!("Unknown service: {}", service_id)))?;

        let request = self
            .store
            .insert(NewServiceRequest {
                citizen_id,
                service_id,
                description: description.trim().to_string(),
                payment_amount: service.fee,
            })
            .await?;

        info!(
            request_id = %request.id,
            citizen_id = %citizen_id,
            service_id = %service_id,
            department_id = %request.department_id,
            payment_amount = %request.payment_amount,
            "Service request submitted"
        );

        Ok(request)
    }

    /// Mark a request as paid. Repeating the confirmation is a no-op.
    pub async fn confirm_payment(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> Result<ServiceRequest, WorkflowError> {
        let request = self
            .store
            .get(request_id)
            .await?
            .ok_or(WorkflowError::NotFound(request_id))?;

        match actor {
            Actor::Citizen { id } if *id == request.citizen_id => {}
            Actor::Citizen { id } => {
                warn!(
                    request_id = %request_id,
                    citizen_id = %id,
                    "Payment confirmation for another citizen's request"
                );
                return Err(ForbiddenReason::NotRequestOwner.into());
            }
            _ => return Err(ForbiddenReason::RoleNotPermitted.into()),
        }

        if request.payment_amount <= Decimal::ZERO {
            return Err(WorkflowError::Validation(
                "Request has no fee to pay".to_string(),
            ));
        }

        if request.payment_status == PaymentStatus::Paid {
            return Ok(request);
        }

        let updated = self
            .store
            .set_payment_status(request_id, PaymentStatus::Paid)
            .await?
            .ok_or(WorkflowError::NotFound(request_id))?;

        info!(
            request_id = %request_id,
            payment_amount = %updated.payment_amount,
            "Payment confirmed"
        );

        Ok(updated)
    }
}
