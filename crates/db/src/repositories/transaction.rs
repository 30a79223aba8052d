//! Ledger transaction repository.
//!
//! Transactions are append-only: there is no update or delete.

use std::collections::HashMap;

use kontor_core::ledger::ValidTransaction;
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

use crate::entities::{accounts, invoices, transactions};

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Referenced account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransactionError> for AppError {
    fn from(e: TransactionError) -> Self {
        match e {
            TransactionError::AccountNotFound(_) => Self::NotFound(e.to_string()),
            TransactionError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// A transaction with its account and, when booked through an invoice,
/// the invoice number and type.
#[derive(Debug, Clone)]
pub struct TransactionLine {
    /// Transaction record.
    pub transaction: transactions::Model,
    /// Account record.
    pub account: Option<accounts::Model>,
    /// Owning invoice.
    pub invoice: Option<invoices::Model>,
}

/// Attaches accounts and invoices to a batch of transactions.
///
/// Two lookups regardless of batch size.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub async fn enrich_transactions<C: ConnectionTrait>(
    db: &C,
    rows: Vec<transactions::Model>,
) -> Result<Vec<TransactionLine>, DbErr> {
    let account_ids: Vec<Uuid> = rows.iter().map(|t| t.account_id).collect();
    let invoice_ids: Vec<Uuid> = rows.iter().filter_map(|t| t.invoice_id).collect();

    let accounts: HashMap<Uuid, accounts::Model> = if account_ids.is_empty() {
        HashMap::new()
    } else {
        accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect()
    };

    let invoices: HashMap<Uuid, invoices::Model> = if invoice_ids.is_empty() {
        HashMap::new()
    } else {
        invoices::Entity::find()
            .filter(invoices::Column::Id.is_in(invoice_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|transaction| TransactionLine {
            account: accounts.get(&transaction.account_id).cloned(),
            invoice: transaction
                .invoice_id
                .and_then(|id| invoices.get(&id).cloned()),
            transaction,
        })
        .collect())
}

/// Builds an insertable transaction row.
pub(crate) fn transaction_row(
    input: ValidTransaction,
    invoice_id: Option<Uuid>,
    created_by: Uuid,
) -> transactions::ActiveModel {
    transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        date: Set(input.date),
        description: Set(input.description),
        amount: Set(input.amount),
        entry_type: Set(input.entry_type.into()),
        reference: Set(input.reference),
        account_id: Set(input.account_id),
        invoice_id: Set(invoice_id),
        created_by: Set(created_by),
        created_at: Set(chrono::Utc::now().into()),
    }
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists transactions, newest date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: PageRequest,
        account_id: Option<Uuid>,
    ) -> Result<PageResponse<TransactionLine>, TransactionError> {
        let mut query = transactions::Entity::find();
        if let Some(account_id) = account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let items = enrich_transactions(&self.db, rows).await?;
        Ok(PageResponse::new(items, page, total))
    }

    /// Records a standalone transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::AccountNotFound` if the account does not exist.
    pub async fn create(
        &self,
        input: ValidTransaction,
        created_by: Uuid,
    ) -> Result<TransactionLine, TransactionError> {
        let account = accounts::Entity::find_by_id(input.account_id)
            .one(&self.db)
            .await?
            .ok_or(TransactionError::AccountNotFound(input.account_id))?;

        let transaction = transaction_row(input, None, created_by)
            .insert(&self.db)
            .await?;

        info!(
            transaction_id = %transaction.id,
            account_id = %account.id,
            amount = %transaction.amount,
            "Transaction recorded"
        );

        Ok(TransactionLine {
            transaction,
            account: Some(account),
            invoice: None,
        })
    }
}
