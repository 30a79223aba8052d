//! Stock movement and alert routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use kontor_core::{
    auth::Capability,
    inventory::{MovementType, NewMovement},
};
use kontor_db::{
    AlertRepository, MovementRepository,
    repositories::{MovementFilter, RecordedMovement},
};
use kontor_shared::types::{PageRequest, PageResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::views::{AlertResponse, MovementResponse};
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
};

/// Default page size for the movement list.
const MOVEMENTS_PAGE_SIZE: u64 = 20;

/// Creates the movement and alert routes (requires auth middleware to be
/// applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/inventory/movements",
            get(list_movements).post(create_movement),
        )
        .route("/inventory/alerts", get(list_alerts))
        .route("/inventory/alerts/{id}/resolve", patch(resolve_alert))
}

/// Query parameters for listing movements.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMovementsQuery {
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Only movements of this product.
    pub product_id: Option<Uuid>,
    /// IN or OUT.
    #[serde(rename = "type")]
    pub movement_type: Option<String>,
}

/// Request body for recording a movement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementRequest {
    /// IN or OUT.
    #[serde(rename = "type")]
    pub movement_type: Option<String>,
    /// Units moved, strictly positive.
    pub quantity: Option<i64>,
    /// Reason.
    pub reason: Option<String>,
    /// Product moved.
    pub product_id: Option<Uuid>,
    /// External reference.
    pub reference: Option<String>,
}

impl From<CreateMovementRequest> for NewMovement {
    fn from(r: CreateMovementRequest) -> Self {
        Self {
            movement_type: r.movement_type,
            quantity: r.quantity,
            reason: r.reason,
            product_id: r.product_id,
            reference: r.reference,
        }
    }
}

/// A recorded movement with the resulting stock and any alerts it opened.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMovementResponse {
    /// The movement.
    #[serde(flatten)]
    pub movement: MovementResponse,
    /// Stock after the movement.
    pub current_stock: i64,
    /// Alerts opened by the movement.
    pub alerts: Vec<AlertResponse>,
}

impl From<RecordedMovement> for RecordedMovementResponse {
    fn from(r: RecordedMovement) -> Self {
        Self {
            movement: r.movement.into(),
            current_stock: r.stock,
            alerts: r
                .alerts
                .into_iter()
                .map(|a| AlertResponse::new(a, None))
                .collect(),
        }
    }
}

/// Query parameters for listing alerts.
#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    /// Filter by resolution; all alerts when absent.
    pub resolved: Option<bool>,
}

/// GET /inventory/movements
async fn list_movements(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListMovementsQuery>,
) -> ApiResult<Json<PageResponse<MovementResponse>>> {
    auth.require(Capability::InventoryRead)?;

    let movement_type = query
        .movement_type
        .as_deref()
        .map(str::parse::<MovementType>)
        .transpose()?;
    let filter = MovementFilter {
        product_id: query.product_id,
        movement_type: movement_type.map(Into::into),
    };
    let page = PageRequest::from_query(query.page, query.limit, MOVEMENTS_PAGE_SIZE);

    let movements = MovementRepository::new((*state.db).clone())
        .list(page, filter)
        .await?;
    Ok(Json(movements.map(MovementResponse::from)))
}

/// POST /inventory/movements
async fn create_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateMovementRequest>,
) -> ApiResult<(StatusCode, Json<RecordedMovementResponse>)> {
    auth.require(Capability::InventoryWrite)?;

    let input = NewMovement::from(payload).validate()?;
    let recorded = MovementRepository::new((*state.db).clone())
        .create(input, auth.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(recorded.into())))
}

/// GET /inventory/alerts
async fn list_alerts(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListAlertsQuery>,
) -> ApiResult<Json<Vec<AlertResponse>>> {
    auth.require(Capability::InventoryRead)?;

    let alerts = AlertRepository::new((*state.db).clone())
        .list(query.resolved)
        .await?;
    Ok(Json(alerts.into_iter().map(AlertResponse::from).collect()))
}

/// PATCH /inventory/alerts/{id}/resolve
async fn resolve_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<AlertResponse>> {
    auth.require(Capability::InventoryWrite)?;

    let alert = AlertRepository::new((*state.db).clone())
        .resolve(id)
        .await?;
    Ok(Json(AlertResponse::new(alert, None)))
}
