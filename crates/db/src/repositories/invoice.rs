//! Invoice repository.
//!
//! An invoice and the ledger transactions it books are written in one
//! database transaction: either all rows commit or none do. Every account a
//! line references is checked before the transaction opens.

use std::collections::HashSet;

use kontor_core::invoice::{InvoiceStatus, ValidInvoice};
use kontor_shared::{
    AppError,
    types::{PageRequest, PageResponse},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::or_duplicate;
use super::transaction::{TransactionLine, enrich_transactions, transaction_row};
use crate::entities::{accounts, invoices, sea_orm_active_enums, transactions};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice number already exists.
    #[error("Invoice number '{0}' already exists")]
    DuplicateNumber(String),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// A line references a missing account.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<InvoiceError> for AppError {
    fn from(e: InvoiceError) -> Self {
        match e {
            InvoiceError::DuplicateNumber(_) => Self::Conflict(e.to_string()),
            InvoiceError::NotFound(_) | InvoiceError::AccountNotFound(_) => {
                Self::NotFound(e.to_string())
            }
            InvoiceError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Invoice with its ledger lines.
#[derive(Debug, Clone)]
pub struct InvoiceWithLines {
    /// Invoice record.
    pub invoice: invoices::Model,
    /// Booked transactions with their accounts.
    pub lines: Vec<TransactionLine>,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by invoice type label.
    pub invoice_type: Option<String>,
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice together with its ledger transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The invoice number is taken
    /// - A line references a missing account (nothing is written)
    /// - Database operation fails (nothing is written)
    pub async fn create(
        &self,
        input: ValidInvoice,
        created_by: Uuid,
    ) -> Result<InvoiceWithLines, InvoiceError> {
        let existing = invoices::Entity::find()
            .filter(invoices::Column::Number.eq(&input.number))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(InvoiceError::DuplicateNumber(input.number));
        }
        self.ensure_accounts_exist(&input).await?;

        let txn = self.db.begin().await?;

        let invoice = Self::insert_invoice(&txn, &input, created_by)
            .await
            .map_err(|e| {
                or_duplicate(e, || InvoiceError::DuplicateNumber(input.number.clone()))
            })?;
        let rows = Self::insert_lines(&txn, input, invoice.id, created_by).await?;
        let lines = enrich_transactions(&txn, rows).await?;

        txn.commit().await?;

        info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            lines = lines.len(),
            "Invoice created"
        );

        Ok(InvoiceWithLines { invoice, lines })
    }

    async fn insert_invoice(
        txn: &DatabaseTransaction,
        input: &ValidInvoice,
        created_by: Uuid,
    ) -> Result<invoices::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: Set(Uuid::new_v4()),
            number: Set(input.number.clone()),
            invoice_type: Set(input.invoice_type.clone()),
            date: Set(input.date),
            due_date: Set(input.due_date),
            client_name: Set(input.client_name.clone()),
            client_email: Set(input.client_email.clone()),
            client_tax_id: Set(input.client_tax_id.clone()),
            subtotal: Set(input.subtotal),
            tax: Set(input.tax),
            total: Set(input.total),
            status: Set(input.status.into()),
            notes: Set(input.notes.clone()),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        invoice.insert(txn).await
    }

    /// Rejects the bind when any line references a missing account,
    /// reporting the first one in line order.
    async fn ensure_accounts_exist(&self, input: &ValidInvoice) -> Result<(), InvoiceError> {
        let referenced = input.referenced_accounts();
        if referenced.is_empty() {
            return Ok(());
        }

        let found: HashSet<Uuid> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Id)
            .filter(accounts::Column::Id.is_in(referenced.clone()))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        match referenced.into_iter().find(|id| !found.contains(id)) {
            Some(missing) => Err(InvoiceError::AccountNotFound(missing)),
            None => Ok(()),
        }
    }

    async fn insert_lines(
        txn: &DatabaseTransaction,
        input: ValidInvoice,
        invoice_id: Uuid,
        created_by: Uuid,
    ) -> Result<Vec<transactions::Model>, DbErr> {
        let mut rows = Vec::with_capacity(input.lines.len());
        for line in input.lines {
            rows.push(
                transaction_row(line, Some(invoice_id), created_by)
                    .insert(txn)
                    .await?,
            );
        }
        Ok(rows)
    }

    /// Lists invoices, newest date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: PageRequest,
        filter: InvoiceFilter,
    ) -> Result<PageResponse<InvoiceWithLines>, InvoiceError> {
        let mut query = invoices::Entity::find();
        if let Some(invoice_type) = filter.invoice_type {
            query = query.filter(invoices::Column::InvoiceType.eq(invoice_type));
        }
        if let Some(status) = filter.status {
            query = query
                .filter(invoices::Column::Status.eq(sea_orm_active_enums::InvoiceStatus::from(status)));
        }

        let total = query.clone().count(&self.db).await?;
        let invoices = query
            .order_by_desc(invoices::Column::Date)
            .order_by_desc(invoices::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let ids: Vec<Uuid> = invoices.iter().map(|i| i.id).collect();
        let rows = if ids.is_empty() {
            Vec::new()
        } else {
            transactions::Entity::find()
                .filter(transactions::Column::InvoiceId.is_in(ids))
                .order_by_asc(transactions::Column::CreatedAt)
                .all(&self.db)
                .await?
        };
        let mut lines = enrich_transactions(&self.db, rows).await?;

        let items = invoices
            .into_iter()
            .map(|invoice| {
                let (own, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut lines)
                    .into_iter()
                    .partition(|l| l.transaction.invoice_id == Some(invoice.id));
                lines = rest;
                InvoiceWithLines {
                    invoice,
                    lines: own,
                }
            })
            .collect();

        Ok(PageResponse::new(items, page, total))
    }

    /// Gets an invoice with its lines.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` if the invoice does not exist.
    pub async fn get(&self, id: Uuid) -> Result<InvoiceWithLines, InvoiceError> {
        let invoice = self.find(id).await?;
        let rows = transactions::Entity::find()
            .filter(transactions::Column::InvoiceId.eq(id))
            .order_by_asc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let lines = enrich_transactions(&self.db, rows).await?;
        Ok(InvoiceWithLines { invoice, lines })
    }

    /// Overwrites the status. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` if the invoice does not exist.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: InvoiceStatus,
    ) -> Result<invoices::Model, InvoiceError> {
        let invoice = self.find(id).await?;
        let previous = invoice.status;

        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(status.into());
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&self.db).await?;

        info!(invoice_id = %id, from = ?previous, to = %status, "Invoice status changed");
        Ok(updated)
    }

    async fn find(&self, id: Uuid) -> Result<invoices::Model, InvoiceError> {
        invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))
    }
}
