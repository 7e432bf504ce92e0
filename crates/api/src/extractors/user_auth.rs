//! Authenticated actor extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Actor;
use domain::{ForbiddenReason, WorkflowError};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::{actor_from_token, bearer_token};

/// The caller of a handler, built from its access token.
///
/// Uses the actor inserted by `require_user_auth` when that middleware ran,
/// otherwise validates the token itself.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

impl CurrentActor {
    /// Rejects actors that cannot review requests.
    pub fn reviewer(self) -> Result<Actor, ApiError> {
        self.require(|actor| actor.is_reviewer())
    }

    pub fn citizen(self) -> Result<Actor, ApiError> {
        self.require(|actor| matches!(actor, Actor::Citizen { .. }))
    }

    pub fn admin(self) -> Result<Actor, ApiError> {
        self.require(|actor| matches!(actor, Actor::Admin { .. }))
    }

    fn require(self, allowed: impl Fn(&Actor) -> bool) -> Result<Actor, ApiError> {
        if allowed(&self.0) {
            Ok(self.0)
        } else {
            tracing::warn!(
                actor_id = %self.0.id(),
                role = %self.0.role(),
                "Role not permitted for route"
            );
            Err(WorkflowError::Forbidden(ForbiddenReason::RoleNotPermitted).into())
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(CurrentActor(*actor));
        }

        let token = bearer_token(&parts.headers)?;
        Ok(CurrentActor(actor_from_token(&state.jwt, token)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_role_requirements() {
        let officer = CurrentActor(Actor::Officer {
            id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
        });
        let citizen = CurrentActor(Actor::Citizen { id: Uuid::new_v4() });
        let admin = CurrentActor(Actor::Admin { id: Uuid::new_v4() });

        assert!(officer.reviewer().is_ok());
        assert!(officer.citizen().is_err());
        assert!(citizen.citizen().is_ok());
        assert!(citizen.reviewer().is_err());
        assert!(admin.admin().is_ok());
        assert!(admin.reviewer().is_err());
    }

    #[test]
    fn test_head_is_reviewer() {
        let head = CurrentActor(Actor::DepartmentHead {
            id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
        });
        assert!(head.reviewer().is_ok());
        assert!(head.admin().is_err());
    }
}
