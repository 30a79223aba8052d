//! Authentication middleware for protected routes.
//!
//! A request is authenticated when its bearer token verifies and a
//! non-expired session row exists for it. Logging out deletes the session,
//! which revokes the token before its expiry.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use kontor_core::auth::{Capability, Identity, authorize};
use kontor_db::SessionRepository;
use kontor_shared::{AppError, Claims, JwtError, types::UserId};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware that validates tokens against live sessions.
///
/// Missing token → 401. Unknown or expired session, or a token that fails
/// verification → 403.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return ApiError(AppError::Unauthorized("Access token required".into())).into_response();
    };

    let sessions = SessionRepository::new((*state.db).clone());
    match sessions.find_active(token).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            debug!("Rejected token without an active session");
            return ApiError(AppError::Forbidden("Session expired or invalid".into()))
                .into_response();
        }
        Err(e) => return ApiError(AppError::Database(e.to_string())).into_response(),
    }

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            if !matches!(e, JwtError::Expired) {
                warn!(error = %e, "Token with live session failed verification");
            }
            ApiError(AppError::Forbidden("Invalid token".into())).into_response()
        }
    }
}

/// Extractor for authenticated user claims.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> ApiResult<Json<..>> {
///     auth.require(Capability::InventoryWrite)?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0.user_id()
    }

    /// The caller as seen by the capability policy.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: UserId::from_uuid(self.0.sub),
            role: self.0.role.clone(),
            permissions: self.0.permissions.clone(),
        }
    }

    /// Fails with 403 unless the caller holds `capability`.
    ///
    /// # Errors
    ///
    /// Returns a forbidden `ApiError` when the policy denies access.
    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        if authorize(&self.identity(), capability).is_allowed() {
            Ok(())
        } else {
            debug!(user_id = %self.user_id(), %capability, "Capability denied");
            Err(ApiError(AppError::Forbidden(
                "Insufficient permissions".into(),
            )))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError(AppError::Unauthorized("Authentication required".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn caller(role: &str, permissions: &[&str]) -> AuthUser {
        AuthUser(Claims::new(
            Uuid::new_v4(),
            "user@example.com",
            role,
            permissions.iter().map(ToString::to_string).collect(),
            Utc::now(),
        ))
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_require_uses_permissions() {
        let clerk = caller("almacen", &["almacen:read", "almacen:write"]);
        assert!(clerk.require(Capability::InventoryWrite).is_ok());
        assert!(clerk.require(Capability::AccountingRead).is_err());
    }

    #[test]
    fn test_admin_passes_everything() {
        let admin = caller("admin", &[]);
        assert!(admin.require(Capability::UsersDelete).is_ok());
    }
}
