//! Product repository.
//!
//! Stock is never stored on the product row. Every read folds the
//! movements table with [`stock_by_product`].

use std::collections::HashMap;

use kontor_core::inventory::{InventoryError, ValidProduct, ValidProductChanges};
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

use super::or_duplicate;
use crate::entities::{
    categories, movements, products, sea_orm_active_enums::MovementType, suppliers,
};

/// Movements shown on the product detail view.
pub const RECENT_MOVEMENTS: u64 = 50;

/// Error types for product operations.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// SKU already exists.
    #[error("SKU '{0}' already exists")]
    DuplicateSku(String),

    /// Product not found.
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    /// Category referenced by the product does not exist.
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    /// Supplier referenced by the product does not exist.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(Uuid),

    /// Threshold change rejected.
    #[error(transparent)]
    Invalid(#[from] InventoryError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ProductError> for AppError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::DuplicateSku(_) => Self::Conflict(e.to_string()),
            ProductError::NotFound(_) => Self::NotFound(e.to_string()),
            ProductError::CategoryNotFound(_) | ProductError::SupplierNotFound(_) => {
                Self::Validation(e.to_string())
            }
            ProductError::Invalid(inner) => inner.into(),
            ProductError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// A product with its category, supplier and folded stock.
#[derive(Debug, Clone)]
pub struct ProductView {
    /// Product record.
    pub product: products::Model,
    /// Category record.
    pub category: Option<categories::Model>,
    /// Supplier record.
    pub supplier: Option<suppliers::Model>,
    /// Σ IN − Σ OUT over the full history.
    pub stock: i64,
}

/// Product detail view.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    /// Product with stock.
    pub product: ProductView,
    /// Latest movements, newest first.
    pub movements: Vec<movements::Model>,
}

/// Filter options for listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Only products in this category.
    pub category_id: Option<Uuid>,
    /// Only products from this supplier.
    pub supplier_id: Option<Uuid>,
    /// Filter by active status. Defaults to active only.
    pub is_active: Option<bool>,
}

/// Folds current stock per product in one grouped query.
///
/// With `product_ids` set, only those products are folded. Products without
/// movements are absent from the map.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn stock_by_product<C: ConnectionTrait>(
    db: &C,
    product_ids: Option<&[Uuid]>,
) -> Result<HashMap<Uuid, i64>, DbErr> {
    let mut query = movements::Entity::find()
        .select_only()
        .column(movements::Column::ProductId)
        .column(movements::Column::MovementType)
        .column_as(movements::Column::Quantity.sum(), "total")
        .group_by(movements::Column::ProductId)
        .group_by(movements::Column::MovementType);

    if let Some(ids) = product_ids {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        query = query.filter(movements::Column::ProductId.is_in(ids.iter().copied()));
    }

    let rows: Vec<(Uuid, MovementType, Option<i64>)> = query.into_tuple().all(db).await?;

    let mut stock: HashMap<Uuid, i64> = HashMap::new();
    for (product_id, movement_type, total) in rows {
        let movement_type: kontor_core::inventory::MovementType = movement_type.into();
        *stock.entry(product_id).or_default() += movement_type.signed(total.unwrap_or_default());
    }
    Ok(stock)
}

/// Attaches categories, suppliers and stock to a batch of products.
///
/// Three lookups regardless of batch size.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub async fn product_views<C: ConnectionTrait>(
    db: &C,
    rows: Vec<products::Model>,
) -> Result<Vec<ProductView>, DbErr> {
    let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
    let category_ids: Vec<Uuid> = rows.iter().map(|p| p.category_id).collect();
    let supplier_ids: Vec<Uuid> = rows.iter().filter_map(|p| p.supplier_id).collect();

    let categories: HashMap<Uuid, categories::Model> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    };

    let suppliers: HashMap<Uuid, suppliers::Model> = if supplier_ids.is_empty() {
        HashMap::new()
    } else {
        suppliers::Entity::find()
            .filter(suppliers::Column::Id.is_in(supplier_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect()
    };

    let stock = stock_by_product(db, Some(&ids)).await?;

    Ok(rows
        .into_iter()
        .map(|product| ProductView {
            category: categories.get(&product.category_id).cloned(),
            supplier: product
                .supplier_id
                .and_then(|id| suppliers.get(&id).cloned()),
            stock: stock.get(&product.id).copied().unwrap_or_default(),
            product,
        })
        .collect())
}

/// Product repository.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists products by name, each with its stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: PageRequest,
        filter: ProductFilter,
    ) -> Result<PageResponse<ProductView>, ProductError> {
        let mut query = products::Entity::find()
            .filter(products::Column::IsActive.eq(filter.is_active.unwrap_or(true)));
        if let Some(category_id) = filter.category_id {
            query = query.filter(products::Column::CategoryId.eq(category_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(products::Column::SupplierId.eq(supplier_id));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_asc(products::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let items = product_views(&self.db, rows).await?;
        Ok(PageResponse::new(items, page, total))
    }

    /// Gets a product with its stock over the full history and its latest
    /// movements.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if the product does not exist.
    pub async fn get(&self, id: Uuid) -> Result<ProductDetail, ProductError> {
        let product = self.find(id).await?;
        let mut views = product_views(&self.db, vec![product]).await?;
        let product = views.pop().ok_or(ProductError::NotFound(id))?;

        let movements = movements::Entity::find()
            .filter(movements::Column::ProductId.eq(id))
            .order_by_desc(movements::Column::CreatedAt)
            .limit(RECENT_MOVEMENTS)
            .all(&self.db)
            .await?;

        Ok(ProductDetail { product, movements })
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - SKU already exists
    /// - Category does not exist
    /// - Supplier is given and does not exist
    pub async fn create(&self, input: ValidProduct) -> Result<products::Model, ProductError> {
        self.ensure_sku_free(&input.sku, None).await?;
        self.ensure_category(input.category_id).await?;
        if let Some(supplier_id) = input.supplier_id {
            self.ensure_supplier(supplier_id).await?;
        }

        let now = chrono::Utc::now().into();
        let sku = input.sku.clone();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(input.sku),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            cost: Set(input.cost),
            min_stock: Set(input.thresholds.min_stock),
            max_stock: Set(input.thresholds.max_stock),
            category_id: Set(input.category_id),
            supplier_id: Set(input.supplier_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| or_duplicate(e, || ProductError::DuplicateSku(sku)))?;

        info!(product_id = %product.id, sku = %product.sku, "Product created");
        Ok(product)
    }

    /// Updates a product.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Product not found
    /// - New SKU already exists
    /// - New category or supplier does not exist
    /// - Resulting thresholds are invalid
    pub async fn update(
        &self,
        id: Uuid,
        input: ValidProductChanges,
    ) -> Result<products::Model, ProductError> {
        let product = self.find(id).await?;
        let thresholds = input.merge_thresholds(product.thresholds())?;

        if let Some(sku) = &input.sku
            && *sku != product.sku
        {
            self.ensure_sku_free(sku, Some(id)).await?;
        }
        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }
        if let Some(Some(supplier_id)) = input.supplier_id {
            self.ensure_supplier(supplier_id).await?;
        }
        let sku = input.sku.clone().unwrap_or_else(|| product.sku.clone());

        let mut active: products::ActiveModel = product.into();
        if let Some(sku) = input.sku {
            active.sku = Set(sku);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(cost) = input.cost {
            active.cost = Set(cost);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(supplier_id) = input.supplier_id {
            active.supplier_id = Set(supplier_id);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.min_stock = Set(thresholds.min_stock);
        active.max_stock = Set(thresholds.max_stock);
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| or_duplicate(e, || ProductError::DuplicateSku(sku)))?;
        info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    /// Finds a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if the product does not exist.
    pub async fn find(&self, id: Uuid) -> Result<products::Model, ProductError> {
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    async fn ensure_sku_free(&self, sku: &str, except: Option<Uuid>) -> Result<(), ProductError> {
        let mut query = products::Entity::find().filter(products::Column::Sku.eq(sku));
        if let Some(id) = except {
            query = query.filter(products::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(ProductError::DuplicateSku(sku.to_string()));
        }
        Ok(())
    }

    async fn ensure_category(&self, id: Uuid) -> Result<(), ProductError> {
        categories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(ProductError::CategoryNotFound(id))
    }

    async fn ensure_supplier(&self, id: Uuid) -> Result<(), ProductError> {
        suppliers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(ProductError::SupplierNotFound(id))
    }
}
