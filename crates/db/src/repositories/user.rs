//! User repository.

use kontor_core::auth::{
    DEFAULT_ROLE, PasswordError, ValidUser, ValidUserChanges, hash_password,
};
use kontor_shared::{
    AppError,
    types::{PageRequest, PageResponse},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};
use tracing::info;
use uuid::Uuid;

use super::or_duplicate;
use crate::entities::{roles, users};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Email already registered.
    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    /// Referenced role does not exist.
    #[error("Role not found: {0}")]
    RoleNotFound(Uuid),

    /// The default role has not been seeded.
    #[error("Default role '{0}' is missing")]
    DefaultRoleMissing(&'static str),

    /// Callers cannot deactivate their own account.
    #[error("You cannot deactivate your own account")]
    SelfDeactivation,

    /// Hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(_) => Self::NotFound(e.to_string()),
            UserError::DuplicateEmail(_) => Self::Conflict(e.to_string()),
            UserError::RoleNotFound(_) | UserError::SelfDeactivation => {
                Self::Validation(e.to_string())
            }
            UserError::DefaultRoleMissing(_) => Self::Internal(e.to_string()),
            UserError::Password(p) => p.into(),
            UserError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// A user with its role.
#[derive(Debug, Clone)]
pub struct UserWithRole {
    /// User record.
    pub user: users::Model,
    /// Role record.
    pub role: roles::Model,
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user and role by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserWithRole>, DbErr> {
        let found = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .find_also_related(roles::Entity)
            .one(&self.db)
            .await?;
        Ok(found.and_then(|(user, role)| role.map(|role| UserWithRole { user, role })))
    }

    /// Gets a user and role by ID.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the user does not exist.
    pub async fn get(&self, id: Uuid) -> Result<UserWithRole, UserError> {
        users::Entity::find_by_id(id)
            .find_also_related(roles::Entity)
            .one(&self.db)
            .await?
            .and_then(|(user, role)| role.map(|role| UserWithRole { user, role }))
            .ok_or(UserError::NotFound(id))
    }

    /// Lists active users, newest first, optionally matching `search`
    /// case-insensitively against name or email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<PageResponse<UserWithRole>, UserError> {
        let mut query = users::Entity::find().filter(users::Column::IsActive.eq(true));

        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(users::Column::Name))).like(&pattern))
                    .add(Expr::expr(Func::lower(Expr::col(users::Column::Email))).like(&pattern)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(users::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .find_also_related(roles::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(user, role)| role.map(|role| UserWithRole { user, role }))
            .collect();

        Ok(PageResponse::new(items, page, total))
    }

    /// Creates a user. Without a role the default role is assigned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email is already registered
    /// - The role does not exist
    pub async fn create(&self, input: ValidUser) -> Result<UserWithRole, UserError> {
        self.ensure_email_free(&input.email, None).await?;

        let role = match input.role_id {
            Some(role_id) => self.role(role_id).await?,
            None => roles::Entity::find()
                .filter(roles::Column::Name.eq(DEFAULT_ROLE))
                .one(&self.db)
                .await?
                .ok_or(UserError::DefaultRoleMissing(DEFAULT_ROLE))?,
        };

        let now = chrono::Utc::now().into();
        let email = input.email.clone();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(input.email),
            password_hash: Set(hash_password(&input.password)?),
            name: Set(input.name),
            role_id: Set(role.id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| or_duplicate(e, || UserError::DuplicateEmail(email)))?;

        info!(user_id = %user.id, role = %role.name, "User created");
        Ok(UserWithRole { user, role })
    }

    /// Applies changes to a user.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The user does not exist
    /// - The new email is taken by another user
    /// - The new role does not exist
    pub async fn update(&self, id: Uuid, input: ValidUserChanges) -> Result<UserWithRole, UserError> {
        let UserWithRole { user, mut role } = self.get(id).await?;

        if let Some(email) = &input.email
            && *email != user.email
        {
            self.ensure_email_free(email, Some(id)).await?;
        }

        if let Some(role_id) = input.role_id
            && role_id != role.id
        {
            role = self.role(role_id).await?;
        }
        let email = input.email.clone().unwrap_or_else(|| user.email.clone());

        let mut active: users::ActiveModel = user.into();
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(password) = input.password {
            active.password_hash = Set(hash_password(&password)?);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.role_id = Set(role.id);
        active.updated_at = Set(chrono::Utc::now().into());

        let user = active
            .update(&self.db)
            .await
            .map_err(|e| or_duplicate(e, || UserError::DuplicateEmail(email)))?;
        info!(user_id = %user.id, "User updated");
        Ok(UserWithRole { user, role })
    }

    /// Updates the caller's own name, email or password. Role and
    /// activation flag are never touched.
    ///
    /// # Errors
    ///
    /// Same as [`UserRepository::update`].
    pub async fn update_profile(
        &self,
        id: Uuid,
        input: ValidUserChanges,
    ) -> Result<UserWithRole, UserError> {
        self.update(
            id,
            ValidUserChanges {
                role_id: None,
                is_active: None,
                ..input
            },
        )
        .await
    }

    /// Deactivates a user. Users are never deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `id` is the acting user
    /// - The user does not exist
    pub async fn deactivate(&self, id: Uuid, acting_user: Uuid) -> Result<(), UserError> {
        if id == acting_user {
            return Err(UserError::SelfDeactivation);
        }

        let user = users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await?;

        info!(user_id = %id, "User deactivated");
        Ok(())
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn ensure_email_free(&self, email: &str, except: Option<Uuid>) -> Result<(), UserError> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(UserError::DuplicateEmail(email.to_string()));
        }
        Ok(())
    }

    async fn role(&self, role_id: Uuid) -> Result<roles::Model, UserError> {
        roles::Entity::find_by_id(role_id)
            .one(&self.db)
            .await?
            .ok_or(UserError::RoleNotFound(role_id))
    }
}
