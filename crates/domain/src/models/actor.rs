//! Actor context for workflow operations.
//!
//! Every guard and workflow call receives the caller explicitly; nothing in the
//! domain layer looks up session state on its own.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Portal role as carried in access token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "citizen")]
    Citizen,
    #[serde(rename = "officer")]
    Officer,
    #[serde(rename = "headdepartment")]
    DepartmentHead,
    #[serde(rename = "admin")]
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Citizen => write!(f, "citizen"),
            Role::Officer => write!(f, "officer"),
            Role::DepartmentHead => write!(f, "headdepartment"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ActorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(Role::Citizen),
            "officer" => Ok(Role::Officer),
            "headdepartment" => Ok(Role::DepartmentHead),
            "admin" => Ok(Role::Admin),
            other => Err(ActorError::UnknownRole(other.to_string())),
        }
    }
}

/// Errors building an actor from identity claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActorError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("role {0} requires a department")]
    MissingDepartment(Role),
}

/// The caller of a workflow operation.
///
/// Officers and department heads always carry their department; citizens and
/// admins are not department-scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Citizen { id: Uuid },
    Officer { id: Uuid, department_id: Uuid },
    DepartmentHead { id: Uuid, department_id: Uuid },
    Admin { id: Uuid },
}

impl Actor {
    /// Builds an actor from the identity fields the core cares about.
    pub fn from_parts(
        id: Uuid,
        role: Role,
        department_id: Option<Uuid>,
    ) -> Result<Self, ActorError> {
        match role {
            Role::Citizen => Ok(Actor::Citizen { id }),
            Role::Admin => Ok(Actor::Admin { id }),
            Role::Officer => department_id
                .map(|department_id| Actor::Officer { id, department_id })
                .ok_or(ActorError::MissingDepartment(role)),
            Role::DepartmentHead => department_id
                .map(|department_id| Actor::DepartmentHead { id, department_id })
                .ok_or(ActorError::MissingDepartment(role)),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Actor::Citizen { id }
            | Actor::Officer { id, .. }
            | Actor::DepartmentHead { id, .. }
            | Actor::Admin { id } => *id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Actor::Citizen { .. } => Role::Citizen,
            Actor::Officer { .. } => Role::Officer,
            Actor::DepartmentHead { .. } => Role::DepartmentHead,
            Actor::Admin { .. } => Role::Admin,
        }
    }

    /// Department of a department-scoped actor.
    pub fn department_id(&self) -> Option<Uuid> {
        match self {
            Actor::Officer { department_id, .. } | Actor::DepartmentHead { department_id, .. } => {
                Some(*department_id)
            }
            Actor::Citizen { .. } | Actor::Admin { .. } => None,
        }
    }

    /// Whether the actor may claim and decide requests.
    pub fn is_reviewer(&self) -> bool {
        matches!(self, Actor::Officer { .. } | Actor::DepartmentHead { .. })
    }
}
