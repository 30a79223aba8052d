//! Authentication routes for login, register, logout and profile.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use kontor_core::auth::{NewUser, verify_password};
use kontor_db::{SessionRepository, UserRepository};
use kontor_shared::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::users::UserResponse;
use crate::{
    AppState,
    error::{ApiResult, database},
    extractors::ApiJson,
    middleware::{AuthUser, bearer_token},
};

/// Routes reachable without a session.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
}

/// Routes that need the auth middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/profile", get(profile))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email.
    pub email: Option<String>,
    /// Password.
    pub password: Option<String>,
}

/// Login response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Human-readable confirmation.
    pub message: &'static str,
    /// Bearer token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// The logged in user.
    pub user: UserResponse,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email.
    pub email: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Role, defaults to the standard user role.
    pub role_id: Option<uuid::Uuid>,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

/// POST /auth/login - Authenticate and open a session.
async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (Some(email), Some(password)) = (
        payload.email.filter(|e| !e.trim().is_empty()),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Email and password are required".into()).into());
    };

    let users = UserRepository::new((*state.db).clone());
    let Some(found) = users
        .find_by_email(&email)
        .await
        .map_err(database)?
        .filter(|u| u.user.is_active)
    else {
        warn!(email = %email, "Login attempt for unknown or inactive user");
        return Err(invalid_credentials().into());
    };

    if !verify_password(&password, &found.user.password_hash)? {
        warn!(user_id = %found.user.id, "Failed login attempt - invalid password");
        return Err(invalid_credentials().into());
    }

    let issued = state
        .jwt_service
        .generate_token(
            found.user.id,
            &found.user.email,
            &found.role.name,
            found.role.permission_tags(),
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let sessions = SessionRepository::new((*state.db).clone());
    sessions
        .create(found.user.id, &issued.token, issued.expires_at)
        .await
        .map_err(database)?;
    match sessions.purge_expired().await {
        Ok(0) => {}
        Ok(purged) => debug!(purged, "Expired sessions removed"),
        Err(e) => warn!(error = %e, "Failed to purge expired sessions"),
    }

    info!(user_id = %found.user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful",
        token: issued.token,
        expires_in: state.jwt_service.expires_in(),
        user: found.into(),
    }))
}

/// POST /auth/register - Create an account with the default role.
async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input = NewUser {
        email: payload.email,
        password: payload.password,
        name: payload.name,
        role_id: payload.role_id,
    }
    .validate()?;

    let created = UserRepository::new((*state.db).clone()).create(input).await?;
    info!(user_id = %created.user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created",
            "user": UserResponse::from(created),
        })),
    ))
}

/// POST /auth/logout - Drop the session of the presented token, if any.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    if let Some(token) = bearer_token(&headers) {
        let removed = SessionRepository::new((*state.db).clone())
            .delete_by_token(token)
            .await
            .map_err(database)?;
        info!(sessions = removed, "User logged out");
    }
    Ok(Json(json!({ "message": "Logout successful" })))
}

/// GET /auth/profile - The caller with role and permissions.
async fn profile(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Value>> {
    let user = UserRepository::new((*state.db).clone())
        .get(auth.user_id())
        .await?;
    Ok(Json(json!({ "user": UserResponse::from(user) })))
}
