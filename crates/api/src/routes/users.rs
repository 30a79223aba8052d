//! User management routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use kontor_core::auth::{Capability, NewUser, UserChanges};
use kontor_db::{UserRepository, repositories::UserWithRole};
use kontor_shared::types::{PageRequest, PageResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
};

/// Default page size for the user list.
const USERS_PAGE_SIZE: u64 = 10;

/// Creates the user routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/profile", get(get_profile).put(update_profile))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(deactivate_user),
        )
}

/// Role summary embedded in user views.
#[derive(Debug, Serialize)]
pub struct RoleRef {
    /// Role ID.
    pub id: Uuid,
    /// Role name.
    pub name: String,
}

/// User with role and permissions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: RoleRef,
    /// Capability tags granted by the role.
    pub permissions: Vec<String>,
    /// Active flag.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<UserWithRole> for UserResponse {
    fn from(u: UserWithRole) -> Self {
        Self {
            permissions: u.role.permission_tags(),
            role: RoleRef {
                id: u.role.id,
                name: u.role.name,
            },
            id: u.user.id,
            email: u.user.email,
            name: u.user.name,
            is_active: u.user.is_active,
            created_at: u.user.created_at,
            updated_at: u.user.updated_at,
        }
    }
}

/// Query parameters for listing users.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
}

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Email.
    pub email: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Role.
    pub role_id: Option<Uuid>,
}

/// Request body for updating a user. Absent fields are kept.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Email.
    pub email: Option<String>,
    /// Password. Blank keeps the current one.
    pub password: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Role.
    pub role_id: Option<Uuid>,
    /// Active flag.
    pub is_active: Option<bool>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            email: r.email,
            password: r.password,
            name: r.name,
            role_id: r.role_id,
            is_active: r.is_active,
        }
    }
}

/// GET /users - Paginated list of active users.
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> ApiResult<Json<PageResponse<UserResponse>>> {
    auth.require(Capability::UsersRead)?;

    let page = PageRequest::from_query(query.page, query.limit, USERS_PAGE_SIZE);
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let users = UserRepository::new((*state.db).clone())
        .list(page, search)
        .await?;

    Ok(Json(users.map(UserResponse::from)))
}

/// GET /users/{id}
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    auth.require(Capability::UsersRead)?;
    let user = UserRepository::new((*state.db).clone()).get(id).await?;
    Ok(Json(user.into()))
}

/// POST /users
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    auth.require(Capability::UsersWrite)?;

    let input = NewUser {
        email: payload.email,
        password: payload.password,
        name: payload.name,
        role_id: payload.role_id,
    }
    .validate()?;
    let user = UserRepository::new((*state.db).clone()).create(input).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /users/{id}
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    auth.require(Capability::UsersWrite)?;

    let changes = UserChanges::from(payload).validate()?;
    let user = UserRepository::new((*state.db).clone())
        .update(id, changes)
        .await?;
    Ok(Json(user.into()))
}

/// DELETE /users/{id} - Deactivates; users are never removed.
async fn deactivate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    auth.require(Capability::UsersDelete)?;
    UserRepository::new((*state.db).clone())
        .deactivate(id, auth.user_id())
        .await?;
    Ok(Json(json!({ "message": "User deactivated" })))
}

/// GET /users/profile
async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let user = UserRepository::new((*state.db).clone())
        .get(auth.user_id())
        .await?;
    Ok(Json(user.into()))
}

/// PUT /users/profile - Role and active flag cannot be changed here.
async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let changes = UserChanges::from(payload).validate()?;
    let user = UserRepository::new((*state.db).clone())
        .update_profile(auth.user_id(), changes)
        .await?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;

    #[test]
    fn test_update_request_maps_to_changes() {
        let email: String = SafeEmail().fake();
        let name: String = Name().fake();
        let request: UpdateUserRequest = serde_json::from_value(json!({
            "email": email,
            "name": name,
            "isActive": false,
        }))
        .unwrap();

        let changes = UserChanges::from(request).validate().unwrap();
        assert_eq!(changes.email.as_deref(), Some(email.to_lowercase().as_str()));
        assert_eq!(changes.name.as_deref(), Some(name.as_str()));
        assert_eq!(changes.is_active, Some(false));
        assert_eq!(changes.password, None);
    }

    #[test]
    fn test_blank_password_keeps_current() {
        let request = UpdateUserRequest {
            password: Some("   ".into()),
            ..UpdateUserRequest::default()
        };
        assert_eq!(UserChanges::from(request).validate().unwrap().password, None);
    }
}
