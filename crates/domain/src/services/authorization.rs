//! Authorization guard for service requests.
//!
//! Pure functions over an explicit actor and a loaded request. Callers decide
//! how to log or surface a denial.

use uuid::Uuid;

use crate::error::ForbiddenReason;
use crate::models::{Actor, RequestScope, RequestStatus, ServiceRequest};

/// Whether the actor may see the request.
pub fn check_read(actor: &Actor, request: &ServiceRequest) -> Result<(), ForbiddenReason> {
    match actor {
        Actor::Citizen { id } if *id == request.citizen_id => Ok(()),
        Actor::Citizen { .. } => Err(ForbiddenReason::NotRequestOwner),
        Actor::Officer { department_id, .. } | Actor::DepartmentHead { department_id, .. } => {
            if *department_id == request.department_id {
                Ok(())
            } else {
                Err(ForbiddenReason::CrossDepartment)
            }
        }
        Actor::Admin { .. } => Ok(()),
    }
}

/// Whether the actor may change the request's review status.
///
/// Only reviewers of the request's department qualify, and once a request has a
/// reviewer nobody else may act on it. A request under review whose reviewer
/// record is gone has no one left who may act on it.
pub fn check_mutate(actor: &Actor, request: &ServiceRequest) -> Result<(), ForbiddenReason> {
    if !actor.is_reviewer() {
        return Err(ForbiddenReason::RoleNotPermitted);
    }

    check_read(actor, request)?;

    match (request.status, request.reviewed_by) {
        (_, Some(reviewer)) if reviewer != actor.id() => {
            Err(ForbiddenReason::NotAssignedReviewer)
        }
        (RequestStatus::UnderReview, None) => Err(ForbiddenReason::NotAssignedReviewer),
        _ => Ok(()),
    }
}

pub fn can_read(actor: &Actor, request: &ServiceRequest) -> bool {
    check_read(actor, request).is_ok()
}

pub fn can_mutate(actor: &Actor, request: &ServiceRequest) -> bool {
    check_mutate(actor, request).is_ok()
}

/// Map an actor to the slice of requests a listing may return.
///
/// Department-scoped actors may name their own department only. Admins may
/// narrow to any department. A citizen always sees just their own requests.
pub fn listing_scope(
    actor: &Actor,
    requested_department: Option<Uuid>,
) -> Result<RequestScope, ForbiddenReason> {
    match actor {
        Actor::Citizen { id } => Ok(RequestScope::Citizen(*id)),
        Actor::Officer { department_id, .. } | Actor::DepartmentHead { department_id, .. } => {
            match requested_department {
                Some(requested) if requested != *department_id => {
                    Err(ForbiddenReason::CrossDepartment)
                }
                _ => Ok(RequestScope::Department(*department_id)),
            }
        }
        Actor::Admin { .. } => Ok(requested_department
            .map(RequestScope::Department)
            .unwrap_or(RequestScope::All)),
    }
}
