//! Typed rejections returned by the review workflow.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Why an actor was refused access to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// The request belongs to a different department than the actor.
    CrossDepartment,
    /// The request is under review by another officer.
    NotAssignedReviewer,
    /// A citizen touched a request they did not submit.
    NotRequestOwner,
    /// The actor's role has no access to this operation.
    RoleNotPermitted,
}

impl ForbiddenReason {
    pub fn code(&self) -> &'static str {
        match self {
            ForbiddenReason::CrossDepartment => "cross_department",
            ForbiddenReason::NotAssignedReviewer => "not_assigned_reviewer",
            ForbiddenReason::NotRequestOwner => "not_request_owner",
            ForbiddenReason::RoleNotPermitted => "role_not_permitted",
        }
    }
}

impl std::fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Which state-machine rule a status change broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionViolation {
    /// The request is already approved or rejected.
    TerminalState,
    /// The request is still submitted and has to be claimed first.
    MustClaimFirst,
    /// The target is not a status a reviewer may set from the current one.
    BadTargetStatus,
}

impl TransitionViolation {
    pub fn code(&self) -> &'static str {
        match self {
            TransitionViolation::TerminalState => "terminal_state",
            TransitionViolation::MustClaimFirst => "must_claim_first",
            TransitionViolation::BadTargetStatus => "bad_target_status",
        }
    }
}

impl std::fmt::Display for TransitionViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure of the backing request store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("referenced record not found: {0}")]
    MissingReference(String),
}

/// Errors returned by workflow operations.
///
/// All variants are ordinary results for the caller to render; none of them
/// indicate a crashed operation.
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    #[error("request {0} not found")]
    NotFound(Uuid),

    #[error("forbidden: {0}")]
    Forbidden(ForbiddenReason),

    #[error("invalid transition: {0}")]
    InvalidTransition(TransitionViolation),

    /// A conditional write found the row changed underneath it. Re-read and
    /// re-evaluate instead of retrying the same write.
    #[error("request {0} was modified concurrently")]
    StoreConflict(Uuid),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ForbiddenReason> for WorkflowError {
    fn from(reason: ForbiddenReason) -> Self {
        WorkflowError::Forbidden(reason)
    }
}

impl From<TransitionViolation> for WorkflowError {
    fn from(violation: TransitionViolation) -> Self {
        WorkflowError::InvalidTransition(violation)
    }
}

impl WorkflowError {
    /// Stable machine-readable code, used as the API `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::NotFound(_) => "not_found",
            WorkflowError::Forbidden(reason) => reason.code(),
            WorkflowError::InvalidTransition(violation) => violation.code(),
            WorkflowError::StoreConflict(_) => "store_conflict",
            WorkflowError::Validation(_) => "validation_error",
            WorkflowError::Store(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(ForbiddenReason::CrossDepartment.code(), "cross_department");
        assert_eq!(
            ForbiddenReason::NotAssignedReviewer.code(),
            "not_assigned_reviewer"
        );
        assert_eq!(TransitionViolation::TerminalState.code(), "terminal_state");
        assert_eq!(TransitionViolation::MustClaimFirst.code(), "must_claim_first");
        assert_eq!(
            TransitionViolation::BadTargetStatus.code(),
            "bad_target_status"
        );
    }

    #[test]
    fn test_workflow_error_display() {
        assert_eq!(
            WorkflowError::Forbidden(ForbiddenReason::CrossDepartment).to_string(),
            "forbidden: cross_department"
        );
        assert_eq!(
            WorkflowError::InvalidTransition(TransitionViolation::TerminalState).to_string(),
            "invalid transition: terminal_state"
        );
        assert_eq!(
            WorkflowError::Store(StoreError::Database("timeout".into())).to_string(),
            "database error: timeout"
        );
    }

    #[test]
    fn test_workflow_error_codes() {
        assert_eq!(WorkflowError::NotFound(Uuid::nil()).code(), "not_found");
        assert_eq!(
            WorkflowError::from(ForbiddenReason::NotRequestOwner).code(),
            "not_request_owner"
        );
        assert_eq!(
            WorkflowError::from(TransitionViolation::MustClaimFirst).code(),
            "must_claim_first"
        );
        assert_eq!(
            WorkflowError::StoreConflict(Uuid::nil()).code(),
            "store_conflict"
        );
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ForbiddenReason::NotAssignedReviewer).unwrap(),
            r#""not_assigned_reviewer""#
        );
    }
}
