//! Product category repository.

use std::collections::HashMap;

use kontor_core::inventory::{ValidCategory, ValidCategoryChanges};
use kontor_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use super::or_duplicate;
use super::product::{ProductView, product_views};
use crate::entities::{categories, products};

/// Error types for category operations.
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// Category name already exists.
    #[error("Category '{0}' already exists")]
    DuplicateName(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CategoryError> for AppError {
    fn from(e: CategoryError) -> Self {
        match e {
            CategoryError::DuplicateName(_) => Self::Conflict(e.to_string()),
            CategoryError::NotFound(_) => Self::NotFound(e.to_string()),
            CategoryError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Category with the number of active products in it.
#[derive(Debug, Clone)]
pub struct CategoryWithCount {
    /// Category record.
    pub category: categories::Model,
    /// Active products.
    pub product_count: i64,
}

/// Category detail view.
#[derive(Debug, Clone)]
pub struct CategoryDetail {
    /// Category record.
    pub category: categories::Model,
    /// Active products with stock.
    pub products: Vec<ProductView>,
}

/// Counts active products per value of `column`.
pub(crate) async fn active_product_counts<C: ConnectionTrait>(
    db: &C,
    column: products::Column,
) -> Result<HashMap<Uuid, i64>, DbErr> {
    let rows: Vec<(Option<Uuid>, i64)> = products::Entity::find()
        .select_only()
        .column(column)
        .column_as(products::Column::Id.count(), "count")
        .filter(products::Column::IsActive.eq(true))
        .group_by(column)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, count)| id.map(|id| (id, count)))
        .collect())
}

/// Category repository.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists active categories by name with their active product counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<CategoryWithCount>, CategoryError> {
        let categories = categories::Entity::find()
            .filter(categories::Column::IsActive.eq(true))
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await?;
        let counts = active_product_counts(&self.db, products::Column::CategoryId).await?;

        Ok(categories
            .into_iter()
            .map(|category| CategoryWithCount {
                product_count: counts.get(&category.id).copied().unwrap_or_default(),
                category,
            })
            .collect())
    }

    /// Gets a category with its active products and their stock.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::NotFound` if the category does not exist.
    pub async fn get(&self, id: Uuid) -> Result<CategoryDetail, CategoryError> {
        let category = self.find(id).await?;
        let rows = products::Entity::find()
            .filter(products::Column::CategoryId.eq(id))
            .filter(products::Column::IsActive.eq(true))
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await?;
        let products = product_views(&self.db, rows).await?;

        Ok(CategoryDetail { category, products })
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::DuplicateName` if the name is taken.
    pub async fn create(&self, input: ValidCategory) -> Result<categories::Model, CategoryError> {
        self.ensure_name_free(&input.name, None).await?;

        let now = chrono::Utc::now().into();
        let name = input.name.clone();
        let category = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| or_duplicate(e, || CategoryError::DuplicateName(name)))?;

        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Updates a category.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Category not found
    /// - New name already exists
    pub async fn update(
        &self,
        id: Uuid,
        input: ValidCategoryChanges,
    ) -> Result<categories::Model, CategoryError> {
        let category = self.find(id).await?;

        if let Some(name) = &input.name
            && *name != category.name
        {
            self.ensure_name_free(name, Some(id)).await?;
        }
        let name = input.name.clone().unwrap_or_else(|| category.name.clone());

        let mut active: categories::ActiveModel = category.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| or_duplicate(e, || CategoryError::DuplicateName(name)))?;
        info!(category_id = %id, "Category updated");
        Ok(updated)
    }

    async fn find(&self, id: Uuid) -> Result<categories::Model, CategoryError> {
        categories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CategoryError::NotFound(id))
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> Result<(), CategoryError> {
        let mut query = categories::Entity::find().filter(categories::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(CategoryError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}
