//! Inventory alert repository.
//!
//! Alerts are opened by [`open_alerts`] after a movement and closed only by
//! [`AlertRepository::resolve`].

use std::collections::HashMap;

use kontor_core::inventory::evaluate_alerts;
use kontor_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{inventory_alerts, products, sea_orm_active_enums::AlertType};

/// Error types for alert operations.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// Alert not found.
    #[error("Alert not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AlertError> for AppError {
    fn from(e: AlertError) -> Self {
        match e {
            AlertError::NotFound(_) => Self::NotFound(e.to_string()),
            AlertError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// An alert with the product it concerns.
#[derive(Debug, Clone)]
pub struct AlertLine {
    /// Alert record.
    pub alert: inventory_alerts::Model,
    /// Product record.
    pub product: Option<products::Model>,
}

/// Opens the alerts `product` qualifies for at `stock`.
///
/// Alert types that already have an unresolved alert for the product are
/// skipped. Returns the alerts inserted.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub async fn open_alerts<C: ConnectionTrait>(
    db: &C,
    product: &products::Model,
    stock: i64,
) -> Result<Vec<inventory_alerts::Model>, DbErr> {
    let open: Vec<AlertType> = inventory_alerts::Entity::find()
        .select_only()
        .column(inventory_alerts::Column::AlertType)
        .filter(inventory_alerts::Column::ProductId.eq(product.id))
        .filter(inventory_alerts::Column::IsResolved.eq(false))
        .into_tuple()
        .all(db)
        .await?;
    let open: Vec<_> = open.into_iter().map(Into::into).collect();

    let mut opened = Vec::new();
    for candidate in evaluate_alerts(&product.name, stock, product.thresholds(), &open) {
        let alert = inventory_alerts::ActiveModel {
            id: Set(Uuid::new_v4()),
            alert_type: Set(candidate.alert_type.into()),
            message: Set(candidate.message),
            is_resolved: Set(false),
            resolved_at: Set(None),
            product_id: Set(product.id),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(db)
        .await?;

        warn!(
            alert_id = %alert.id,
            product_id = %product.id,
            alert_type = %candidate.alert_type,
            stock,
            "Inventory alert opened"
        );
        opened.push(alert);
    }
    Ok(opened)
}

/// Attaches products to a batch of alerts.
pub(crate) async fn alert_lines<C: ConnectionTrait>(
    db: &C,
    rows: Vec<inventory_alerts::Model>,
) -> Result<Vec<AlertLine>, DbErr> {
    let product_ids: Vec<Uuid> = rows.iter().map(|a| a.product_id).collect();
    let products: HashMap<Uuid, products::Model> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        products::Entity::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|alert| AlertLine {
            product: products.get(&alert.product_id).cloned(),
            alert,
        })
        .collect())
}

/// Alert repository.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    db: DatabaseConnection,
}

impl AlertRepository {
    /// Creates a new alert repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists alerts newest first, optionally filtered by resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, resolved: Option<bool>) -> Result<Vec<AlertLine>, AlertError> {
        let mut query =
            inventory_alerts::Entity::find().order_by_desc(inventory_alerts::Column::CreatedAt);
        if let Some(resolved) = resolved {
            query = query.filter(inventory_alerts::Column::IsResolved.eq(resolved));
        }

        let rows = query.all(&self.db).await?;
        Ok(alert_lines(&self.db, rows).await?)
    }

    /// Marks an alert as resolved.
    ///
    /// Resolving an already resolved alert refreshes `resolved_at`.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::NotFound` if the alert does not exist.
    pub async fn resolve(&self, id: Uuid) -> Result<inventory_alerts::Model, AlertError> {
        let alert = inventory_alerts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AlertError::NotFound(id))?;

        let mut active: inventory_alerts::ActiveModel = alert.into();
        active.is_resolved = Set(true);
        active.resolved_at = Set(Some(chrono::Utc::now().into()));

        let updated = active.update(&self.db).await?;
        info!(alert_id = %id, "Inventory alert resolved");
        Ok(updated)
    }
}
