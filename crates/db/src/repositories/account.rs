//! Account repository for chart of accounts operations.
//!
//! Balances are folded from the transactions table on every read.

use std::collections::HashMap;

use chrono::NaiveDate;
use kontor_core::ledger::{AccountBalance, ValidAccount, ValidAccountChanges};
use kontor_shared::AppError;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use super::or_duplicate;
use super::transaction::{TransactionLine, enrich_transactions};
use crate::entities::{
    accounts,
    sea_orm_active_enums::{AccountType, EntryType},
    transactions,
};

/// Transactions shown on the account detail view.
pub const RECENT_TRANSACTIONS: u64 = 50;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account code already exists.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::DuplicateCode(_) => Self::Conflict(e.to_string()),
            AccountError::NotFound(_) => Self::NotFound(e.to_string()),
            AccountError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Account with its folded totals.
#[derive(Debug, Clone)]
pub struct AccountWithBalance {
    /// The account record.
    pub account: accounts::Model,
    /// Debit and credit totals over the full history.
    pub totals: AccountBalance,
}

impl AccountWithBalance {
    /// Σ debit − Σ credit.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.totals.balance()
    }
}

/// Account detail view.
#[derive(Debug, Clone)]
pub struct AccountDetail {
    /// Account and balance.
    pub account: AccountWithBalance,
    /// Latest transactions, newest first.
    pub transactions: Vec<TransactionLine>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<AccountType>,
    /// Filter by active status. Defaults to active only.
    pub is_active: Option<bool>,
}

/// Date window for [`account_totals`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerWindow {
    /// Only transactions on or after this date.
    pub from: Option<NaiveDate>,
    /// Only transactions on or before this date.
    pub to: Option<NaiveDate>,
}

/// Folds debit and credit totals per account in one grouped query.
///
/// Accounts without transactions in the window are absent from the map.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn account_totals<C: ConnectionTrait>(
    db: &C,
    window: LedgerWindow,
) -> Result<HashMap<Uuid, AccountBalance>, DbErr> {
    let mut query = transactions::Entity::find()
        .select_only()
        .column(transactions::Column::AccountId)
        .column(transactions::Column::EntryType)
        .column_as(transactions::Column::Amount.sum(), "total")
        .group_by(transactions::Column::AccountId)
        .group_by(transactions::Column::EntryType);

    if let Some(from) = window.from {
        query = query.filter(transactions::Column::Date.gte(from));
    }
    if let Some(to) = window.to {
        query = query.filter(transactions::Column::Date.lte(to));
    }

    let rows: Vec<(Uuid, EntryType, Option<Decimal>)> = query.into_tuple().all(db).await?;

    let mut totals: HashMap<Uuid, AccountBalance> = HashMap::new();
    for (account_id, entry_type, total) in rows {
        totals
            .entry(account_id)
            .or_default()
            .add(entry_type.into(), total.unwrap_or_default());
    }
    Ok(totals)
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::DuplicateCode` if the code is taken.
    pub async fn create_account(&self, input: ValidAccount) -> Result<accounts::Model, AccountError> {
        self.ensure_code_free(&input.code, None).await?;

        let now = chrono::Utc::now().into();
        let code = input.code.clone();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            account_type: Set(input.account_type.into()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| or_duplicate(e, || AccountError::DuplicateCode(code)))?;

        info!(account_id = %account.id, code = %account.code, "Account created");
        Ok(account)
    }

    /// Lists accounts ordered by type then code, each with its balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        filter: AccountFilter,
    ) -> Result<Vec<AccountWithBalance>, AccountError> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::IsActive.eq(filter.is_active.unwrap_or(true)))
            .order_by_asc(accounts::Column::AccountType)
            .order_by_asc(accounts::Column::Code);

        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(account_type));
        }

        let accounts = query.all(&self.db).await?;
        let mut totals = account_totals(&self.db, LedgerWindow::default()).await?;

        Ok(accounts
            .into_iter()
            .map(|account| AccountWithBalance {
                totals: totals.remove(&account.id).unwrap_or_default(),
                account,
            })
            .collect())
    }

    /// Gets an account with its balance over the full history and its
    /// latest transactions.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist.
    pub async fn get_account(&self, id: Uuid) -> Result<AccountDetail, AccountError> {
        let account = self.find(id).await?;

        let history: Vec<(EntryType, Decimal)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::EntryType)
            .column(transactions::Column::Amount)
            .filter(transactions::Column::AccountId.eq(id))
            .into_tuple()
            .all(&self.db)
            .await?;
        let totals = history
            .into_iter()
            .map(|(entry_type, amount)| (entry_type.into(), amount))
            .collect();

        let recent = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(RECENT_TRANSACTIONS)
            .all(&self.db)
            .await?;
        let transactions = enrich_transactions(&self.db, recent).await?;

        Ok(AccountDetail {
            account: AccountWithBalance { account, totals },
            transactions,
        })
    }

    /// Updates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Account not found
    /// - New code already exists
    pub async fn update_account(
        &self,
        id: Uuid,
        input: ValidAccountChanges,
    ) -> Result<accounts::Model, AccountError> {
        let account = self.find(id).await?;

        if let Some(code) = &input.code
            && *code != account.code
        {
            self.ensure_code_free(code, Some(id)).await?;
        }
        let code = input.code.clone().unwrap_or_else(|| account.code.clone());

        let mut active: accounts::ActiveModel = account.into();
        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type.into());
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
            .map_err(|e| or_duplicate(e, || AccountError::DuplicateCode(code)))?;
        info!(account_id = %id, "Account updated");
        Ok(updated)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist.
    pub async fn find(&self, id: Uuid) -> Result<accounts::Model, AccountError> {
        accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))
    }

    async fn ensure_code_free(&self, code: &str, except: Option<Uuid>) -> Result<(), AccountError> {
        let mut query = accounts::Entity::find().filter(accounts::Column::Code.eq(code));
        if let Some(id) = except {
            query = query.filter(accounts::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(AccountError::DuplicateCode(code.to_string()));
        }
        Ok(())
    }
}
