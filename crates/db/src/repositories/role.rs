//! Role repository.

use kontor_core::auth::{ADMIN_ROLE, RoleTemplate};
use kontor_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::entities::roles;

/// Error types for role operations.
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    /// Role not found.
    #[error("Role not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<RoleError> for AppError {
    fn from(e: RoleError) -> Self {
        match e {
            RoleError::NotFound(_) => Self::NotFound(e.to_string()),
            RoleError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Role repository.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    db: DatabaseConnection,
}

impl RoleRepository {
    /// Creates a new role repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists roles that can be assigned through the API (everything but admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_assignable(&self) -> Result<Vec<roles::Model>, RoleError> {
        Ok(roles::Entity::find()
            .filter(roles::Column::Name.ne(ADMIN_ROLE))
            .order_by_asc(roles::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Gets a role by ID.
    ///
    /// # Errors
    ///
    /// Returns `RoleError::NotFound` if no such role exists.
    pub async fn get(&self, id: Uuid) -> Result<roles::Model, RoleError> {
        roles::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RoleError::NotFound(id))
    }

    /// Finds a role by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<roles::Model>, DbErr> {
        roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .one(&self.db)
            .await
    }

    /// Inserts every template whose name is not taken yet.
    ///
    /// Existing roles are left untouched. Returns the number created.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or insert fails.
    pub async fn ensure(&self, templates: &[RoleTemplate]) -> Result<usize, DbErr> {
        let mut created = 0;
        for template in templates {
            if self.find_by_name(template.name).await?.is_some() {
                continue;
            }
            let now = chrono::Utc::now().into();
            roles::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(template.name.to_string()),
                description: Set(Some(template.description.to_string())),
                permissions: Set(Value::from(template.permissions.to_vec())),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&self.db)
            .await?;
            info!(role = template.name, "Role created");
            created += 1;
        }
        Ok(created)
    }
}
