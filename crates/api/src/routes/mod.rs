//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod accounts;
pub mod auth;
pub mod health;
pub mod inventory;
pub mod invoices;
pub mod movements;
pub mod reports;
pub mod roles;
pub mod users;
pub mod views;

/// Creates the API router: public routes plus everything behind the auth
/// middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(users::routes())
        .merge(roles::routes())
        .merge(accounts::routes())
        .merge(invoices::routes())
        .merge(inventory::routes())
        .merge(movements::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
