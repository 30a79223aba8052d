//! Report repository.
//!
//! Loads the rows each report needs and hands them to
//! [`kontor_core::reports::ReportService`] for folding.

use chrono::NaiveDate;
use kontor_core::ledger;
use kontor_core::reports::{
    AccountLine, AccountTotals, BalanceSheet, CategorySummary, IncomeStatement, InventoryTotals,
    LowStockItem, ProductStock, ReportError as PeriodError, ReportService, StockLevel,
};
use kontor_shared::{
    AppError,
    types::{AccountId, CategoryId, ProductId},
};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};

use super::account::{LedgerWindow, account_totals};
use super::alert::{AlertLine, alert_lines};
use super::movement::{MovementLine, movement_lines};
use super::product::product_views;
use super::transaction::{TransactionLine, enrich_transactions};
use crate::entities::{
    accounts, categories, inventory_alerts, invoices, movements, products,
    sea_orm_active_enums::{AccountType, InvoiceStatus},
    transactions,
};

/// Rows shown in the dashboards' recent activity lists.
pub const RECENT_ACTIVITY: u64 = 10;

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Invalid reporting period.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::Period(inner) => inner.into(),
            ReportError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Accounting dashboard.
#[derive(Debug, Clone)]
pub struct AccountingDashboard {
    /// Income statement over transactions dated on or after the first of
    /// the month, future-dated ones included. `period.end_date` is today.
    pub month: IncomeStatement,
    /// Balance of every active account over transactions dated on or after
    /// January 1st.
    pub accounts: Vec<AccountLine>,
    /// Latest transactions.
    pub recent_transactions: Vec<TransactionLine>,
    /// Invoices in ISSUED status.
    pub issued_invoices: u64,
}

/// Inventory dashboard.
#[derive(Debug, Clone)]
pub struct InventoryDashboard {
    /// Headline figures.
    pub totals: InventoryTotals,
    /// Latest movements.
    pub recent_movements: Vec<MovementLine>,
    /// Unresolved alerts.
    pub active_alerts: Vec<AlertLine>,
    /// Per-category counts and value.
    pub categories: Vec<CategorySummary>,
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Income statement over `[start, end]`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Period` if `start` is after `end`.
    pub async fn income_statement(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<IncomeStatement, ReportError> {
        let period = ReportService::period(start, end)?;
        let posted = self
            .posted_by_type(LedgerWindow {
                from: Some(start),
                to: Some(end),
            })
            .await?;

        Ok(ReportService::income_statement(period, posted))
    }

    /// Balance sheet over transactions dated on or before `as_of`.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn balance_sheet(&self, as_of: NaiveDate) -> Result<BalanceSheet, ReportError> {
        let accounts = self
            .account_totals(
                Some(&[AccountType::Asset, AccountType::Liability, AccountType::Equity]),
                LedgerWindow {
                    from: None,
                    to: Some(as_of),
                },
            )
            .await?;

        Ok(ReportService::balance_sheet(as_of, accounts))
    }

    /// Accounting dashboard as of `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn accounting_dashboard(
        &self,
        today: NaiveDate,
    ) -> Result<AccountingDashboard, ReportError> {
        let month_start = ReportService::month_start(today);
        let posted = self
            .posted_by_type(LedgerWindow {
                from: Some(month_start),
                to: None,
            })
            .await?;
        let month =
            ReportService::income_statement(ReportService::period(month_start, today)?, posted);

        let accounts = self
            .account_totals(
                None,
                LedgerWindow {
                    from: Some(ReportService::year_start(today)),
                    to: None,
                },
            )
            .await?
            .into_iter()
            .map(AccountLine::from)
            .collect();

        let recent = transactions::Entity::find()
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(RECENT_ACTIVITY)
            .all(&self.db)
            .await?;
        let recent_transactions = enrich_transactions(&self.db, recent).await?;

        let issued_invoices = invoices::Entity::find()
            .filter(invoices::Column::Status.eq(InvoiceStatus::Issued))
            .count(&self.db)
            .await?;

        Ok(AccountingDashboard {
            month,
            accounts,
            recent_transactions,
            issued_invoices,
        })
    }

    /// Stock level of every active product.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn stock_levels(&self) -> Result<Vec<StockLevel>, ReportError> {
        let products = self.product_stock().await?;
        Ok(ReportService::stock_levels(&products))
    }

    /// Active products at or below their minimum stock.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn low_stock(&self) -> Result<Vec<LowStockItem>, ReportError> {
        let products = self.product_stock().await?;
        Ok(ReportService::low_stock(&products))
    }

    /// Inventory dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn inventory_dashboard(&self) -> Result<InventoryDashboard, ReportError> {
        let products = self.product_stock().await?;

        let recent = movements::Entity::find()
            .order_by_desc(movements::Column::CreatedAt)
            .limit(RECENT_ACTIVITY)
            .all(&self.db)
            .await?;
        let recent_movements = movement_lines(&self.db, recent).await?;

        let open = inventory_alerts::Entity::find()
            .filter(inventory_alerts::Column::IsResolved.eq(false))
            .order_by_desc(inventory_alerts::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let active_alerts = alert_lines(&self.db, open).await?;

        let categories = categories::Entity::find()
            .filter(categories::Column::IsActive.eq(true))
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (CategoryId::from_uuid(c.id), c.name))
            .collect();

        Ok(InventoryDashboard {
            totals: ReportService::inventory_totals(&products),
            recent_movements,
            active_alerts,
            categories: ReportService::category_summary(categories, &products),
        })
    }

    /// Amounts posted to INCOME and EXPENSE accounts within `window`,
    /// summed per account type.
    async fn posted_by_type(
        &self,
        window: LedgerWindow,
    ) -> Result<Vec<(ledger::AccountType, Decimal)>, DbErr> {
        let mut query = transactions::Entity::find()
            .select_only()
            .join(JoinType::InnerJoin, transactions::Relation::Accounts.def())
            .column(accounts::Column::AccountType)
            .column_as(transactions::Column::Amount.sum(), "total")
            .filter(accounts::Column::AccountType.is_in([AccountType::Income, AccountType::Expense]))
            .group_by(accounts::Column::AccountType);
        if let Some(from) = window.from {
            query = query.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = window.to {
            query = query.filter(transactions::Column::Date.lte(to));
        }

        let rows: Vec<(AccountType, Option<Decimal>)> = query.into_tuple().all(&self.db).await?;
        Ok(rows
            .into_iter()
            .map(|(account_type, total)| (account_type.into(), total.unwrap_or_default()))
            .collect())
    }

    /// Active accounts, optionally of the given types, with totals folded
    /// over `window`.
    async fn account_totals(
        &self,
        types: Option<&[AccountType]>,
        window: LedgerWindow,
    ) -> Result<Vec<AccountTotals>, DbErr> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::IsActive.eq(true))
            .order_by_asc(accounts::Column::AccountType)
            .order_by_asc(accounts::Column::Code);
        if let Some(types) = types {
            query = query.filter(accounts::Column::AccountType.is_in(types.iter().copied()));
        }

        let accounts = query.all(&self.db).await?;
        let mut totals = account_totals(&self.db, window).await?;

        Ok(accounts
            .into_iter()
            .map(|a| AccountTotals {
                account_id: AccountId::from_uuid(a.id),
                totals: totals.remove(&a.id).unwrap_or_default(),
                account_type: a.account_type.into(),
                code: a.code,
                name: a.name,
            })
            .collect())
    }

    /// Every active product with its folded stock, ordered by name.
    async fn product_stock(&self) -> Result<Vec<ProductStock>, DbErr> {
        let rows = products::Entity::find()
            .filter(products::Column::IsActive.eq(true))
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await?;

        Ok(product_views(&self.db, rows)
            .await?
            .into_iter()
            .map(|view| ProductStock {
                product_id: ProductId::from_uuid(view.product.id),
                thresholds: view.product.thresholds(),
                category_id: CategoryId::from_uuid(view.product.category_id),
                category_name: view.category.map(|c| c.name).unwrap_or_default(),
                supplier_name: view.supplier.map(|s| s.name),
                price: view.product.price,
                cost: view.product.cost,
                current_stock: view.stock,
                sku: view.product.sku,
                name: view.product.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_period_is_validation() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = ReportError::from(ReportService::period(start, end).unwrap_err());
        assert!(matches!(AppError::from(err), AppError::Validation(_)));
    }
}
