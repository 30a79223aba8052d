//! Stock movement repository.
//!
//! Movements are append-only. Recording one re-evaluates the product's
//! alerts in a separate step: the insert and the alert check are not
//! atomic, so concurrent movements may both evaluate against stale stock.

use std::collections::HashMap;

use kontor_core::inventory::ValidMovement;
use kontor_shared::{
    AppError,
    types::{PageRequest, PageResponse},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use super::alert::open_alerts;
use super::product::stock_by_product;
use crate::entities::{inventory_alerts, movements, products, sea_orm_active_enums::MovementType};

/// Error types for movement operations.
#[derive(Debug, thiserror::Error)]
pub enum MovementError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<MovementError> for AppError {
    fn from(e: MovementError) -> Self {
        match e {
            MovementError::ProductNotFound(_) => Self::NotFound(e.to_string()),
            MovementError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// A movement with its product.
#[derive(Debug, Clone)]
pub struct MovementLine {
    /// Movement record.
    pub movement: movements::Model,
    /// Product record.
    pub product: Option<products::Model>,
}

/// Result of recording a movement.
#[derive(Debug, Clone)]
pub struct RecordedMovement {
    /// Movement with its product.
    pub movement: MovementLine,
    /// Stock after the movement.
    pub stock: i64,
    /// Alerts opened by this movement.
    pub alerts: Vec<inventory_alerts::Model>,
}

/// Filter options for listing movements.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    /// Only movements of this product.
    pub product_id: Option<Uuid>,
    /// Only movements in this direction.
    pub movement_type: Option<MovementType>,
}

/// Attaches products to a batch of movements.
pub(crate) async fn movement_lines<C: ConnectionTrait>(
    db: &C,
    rows: Vec<movements::Model>,
) -> Result<Vec<MovementLine>, DbErr> {
    let product_ids: Vec<Uuid> = rows.iter().map(|m| m.product_id).collect();
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
        .map(|movement| MovementLine {
            product: products.get(&movement.product_id).cloned(),
            movement,
        })
        .collect())
}

/// Movement repository.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
}

impl MovementRepository {
    /// Creates a new movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists movements, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: PageRequest,
        filter: MovementFilter,
    ) -> Result<PageResponse<MovementLine>, MovementError> {
        let mut query = movements::Entity::find();
        if let Some(product_id) = filter.product_id {
            query = query.filter(movements::Column::ProductId.eq(product_id));
        }
        if let Some(movement_type) = filter.movement_type {
            query = query.filter(movements::Column::MovementType.eq(movement_type));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(movements::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let items = movement_lines(&self.db, rows).await?;
        Ok(PageResponse::new(items, page, total))
    }

    /// Records a movement, then opens any alerts the new stock triggers.
    ///
    /// # Errors
    ///
    /// Returns `MovementError::ProductNotFound` if the product does not exist.
    pub async fn create(
        &self,
        input: ValidMovement,
        created_by: Uuid,
    ) -> Result<RecordedMovement, MovementError> {
        let product = products::Entity::find_by_id(input.product_id)
            .one(&self.db)
            .await?
            .ok_or(MovementError::ProductNotFound(input.product_id))?;

        let movement = movements::ActiveModel {
            id: Set(Uuid::new_v4()),
            movement_type: Set(input.movement_type.into()),
            quantity: Set(input.quantity),
            reason: Set(input.reason),
            reference: Set(input.reference),
            product_id: Set(product.id),
            created_by: Set(created_by),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(
            movement_id = %movement.id,
            product_id = %product.id,
            movement_type = %input.movement_type,
            quantity = movement.quantity,
            "Stock movement recorded"
        );

        let stock = stock_by_product(&self.db, Some(&[product.id]))
            .await?
            .get(&product.id)
            .copied()
            .unwrap_or_default();
        let alerts = open_alerts(&self.db, &product, stock).await?;

        Ok(RecordedMovement {
            movement: MovementLine {
                movement,
                product: Some(product),
            },
            stock,
            alerts,
        })
    }
}
