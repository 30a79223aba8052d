//! Role routes.

use axum::{Json, Router, extract::State, routing::get};
use kontor_core::auth::Capability;
use kontor_db::{RoleRepository, entities::roles};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, extractors::ApiPath, middleware::AuthUser};

/// Creates the role routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles/{id}", get(get_role))
}

/// Role with its capability tags.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    /// Role ID.
    pub id: Uuid,
    /// Role name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Capability tags.
    pub permissions: Vec<String>,
}

impl From<roles::Model> for RoleResponse {
    fn from(r: roles::Model) -> Self {
        Self {
            permissions: r.permission_tags(),
            id: r.id,
            name: r.name,
            description: r.description,
        }
    }
}

/// GET /roles - Assignable roles; the admin role is never listed.
async fn list_roles(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    auth.require(Capability::UsersRead)?;
    let roles = RoleRepository::new((*state.db).clone())
        .list_assignable()
        .await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// GET /roles/{id}
async fn get_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<RoleResponse>> {
    auth.require(Capability::UsersRead)?;
    let role = RoleRepository::new((*state.db).clone()).get(id).await?;
    Ok(Json(role.into()))
}
