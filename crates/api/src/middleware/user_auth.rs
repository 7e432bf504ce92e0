//! Bearer token authentication.
//!
//! Turns the access token of a request into the workflow [`Actor`]. Tokens are
//! minted by the identity service; only verification happens here.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::{Actor, Role};
use shared::jwt::JwtConfig;

use crate::app::AppState;
use crate::error::ApiError;

/// Reads the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

/// Validates an access token and builds the actor it identifies.
pub fn actor_from_token(jwt: &JwtConfig, token: &str) -> Result<Actor, ApiError> {
    let claims = jwt.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let user_id = shared::jwt::extract_user_id(&claims)
        .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

    let role: Role = claims
        .role
        .parse()
        .map_err(|e: domain::models::ActorError| ApiError::Unauthorized(e.to_string()))?;

    Actor::from_parts(user_id, role, claims.department_id)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))
}

/// Middleware that requires a valid access token.
///
/// The resulting [`Actor`] is stored in request extensions for handlers.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let actor = match bearer_token(req.headers()).and_then(|t| actor_from_token(&state.jwt, t)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    req.extensions_mut().insert(actor);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use shared::jwt::TokenSubject;
    use uuid::Uuid;

    fn jwt() -> JwtConfig {
        JwtConfig::from_secret("unit-test-secret", 3600, 30).unwrap()
    }

    fn token_for(jwt: &JwtConfig, role: &str, department_id: Option<Uuid>) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let (token, _) = jwt
            .generate_access_token(&TokenSubject {
                user_id,
                role: role.to_string(),
                department_id,
            })
            .unwrap();
        (user_id, token)
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn test_officer_token_becomes_officer() {
        let jwt = jwt();
        let department_id = Uuid::new_v4();
        let (user_id, token) = token_for(&jwt, "officer", Some(department_id));

        let actor = actor_from_token(&jwt, &token).unwrap();
        assert_eq!(
            actor,
            Actor::Officer {
                id: user_id,
                department_id
            }
        );
    }

    #[test]
    fn test_officer_without_department_rejected() {
        let jwt = jwt();
        let (_, token) = token_for(&jwt, "officer", None);
        assert!(matches!(
            actor_from_token(&jwt, &token),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let jwt = jwt();
        let (_, token) = token_for(&jwt, "superuser", None);
        assert!(matches!(
            actor_from_token(&jwt, &token),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let other = JwtConfig::from_secret("another-secret", 3600, 30).unwrap();
        let (_, token) = token_for(&other, "citizen", None);
        assert!(actor_from_token(&jwt(), &token).is_err());
    }
}
