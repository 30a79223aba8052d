//! Supplier repository.

use kontor_core::inventory::{ValidSupplier, ValidSupplierChanges};
use kontor_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use super::category::active_product_counts;
use super::product::{ProductView, product_views};
use crate::entities::{products, suppliers};

/// Error types for supplier operations.
#[derive(Debug, thiserror::Error)]
pub enum SupplierError {
    /// Supplier not found.
    #[error("Supplier not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SupplierError> for AppError {
    fn from(e: SupplierError) -> Self {
        match e {
            SupplierError::NotFound(_) => Self::NotFound(e.to_string()),
            SupplierError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Supplier with the number of active products it supplies.
#[derive(Debug, Clone)]
pub struct SupplierWithCount {
    /// Supplier record.
    pub supplier: suppliers::Model,
    /// Active products.
    pub product_count: i64,
}

/// Supplier detail view.
#[derive(Debug, Clone)]
pub struct SupplierDetail {
    /// Supplier record.
    pub supplier: suppliers::Model,
    /// Active products with stock.
    pub products: Vec<ProductView>,
}

/// Supplier repository.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    db: DatabaseConnection,
}

impl SupplierRepository {
    /// Creates a new supplier repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists active suppliers by name with their active product counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<SupplierWithCount>, SupplierError> {
        let suppliers = suppliers::Entity::find()
            .filter(suppliers::Column::IsActive.eq(true))
            .order_by_asc(suppliers::Column::Name)
            .all(&self.db)
            .await?;
        let counts = active_product_counts(&self.db, products::Column::SupplierId).await?;

        Ok(suppliers
            .into_iter()
            .map(|supplier| SupplierWithCount {
                product_count: counts.get(&supplier.id).copied().unwrap_or_default(),
                supplier,
            })
            .collect())
    }

    /// Gets a supplier with its active products and their stock.
    ///
    /// # Errors
    ///
    /// Returns `SupplierError::NotFound` if the supplier does not exist.
    pub async fn get(&self, id: Uuid) -> Result<SupplierDetail, SupplierError> {
        let supplier = self.find(id).await?;
        let rows = products::Entity::find()
            .filter(products::Column::SupplierId.eq(id))
            .filter(products::Column::IsActive.eq(true))
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await?;
        let products = product_views(&self.db, rows).await?;

        Ok(SupplierDetail { supplier, products })
    }

    /// Creates a supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: ValidSupplier) -> Result<suppliers::Model, SupplierError> {
        let now = chrono::Utc::now().into();
        let supplier = suppliers::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            tax_id: Set(input.tax_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(supplier_id = %supplier.id, name = %supplier.name, "Supplier created");
        Ok(supplier)
    }

    /// Updates a supplier.
    ///
    /// # Errors
    ///
    /// Returns `SupplierError::NotFound` if the supplier does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        input: ValidSupplierChanges,
    ) -> Result<suppliers::Model, SupplierError> {
        let supplier = self.find(id).await?;

        let mut active: suppliers::ActiveModel = supplier.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(tax_id) = input.tax_id {
            active.tax_id = Set(Some(tax_id));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        info!(supplier_id = %id, "Supplier updated");
        Ok(updated)
    }

    async fn find(&self, id: Uuid) -> Result<suppliers::Model, SupplierError> {
        suppliers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SupplierError::NotFound(id))
    }
}
