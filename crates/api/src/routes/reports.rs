//! Dashboards and financial and stock reports.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{NaiveDate, Utc};
use kontor_core::{
    auth::Capability,
    reports::{
        AccountLine, BalanceSheet, CategorySummary, IncomeStatement, InventoryTotals, LowStockItem,
        StockLevel,
    },
};
use kontor_db::{
    ReportRepository,
    repositories::{AccountingDashboard, InventoryDashboard},
};
use kontor_shared::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::views::{AlertResponse, MovementResponse, TransactionResponse};
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiQuery, calendar_date},
    middleware::AuthUser,
};

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounting/dashboard", get(accounting_dashboard))
        .route("/accounting/reports/income-statement", get(income_statement))
        .route("/accounting/reports/balance-sheet", get(balance_sheet))
        .route("/inventory/dashboard", get(inventory_dashboard))
        .route("/inventory/reports/stock-levels", get(stock_levels))
        .route("/inventory/reports/low-stock", get(low_stock))
}

/// Query parameters for the income statement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatementQuery {
    /// First day, inclusive.
    #[serde(default, deserialize_with = "calendar_date")]
    pub start_date: Option<NaiveDate>,
    /// Last day, inclusive.
    #[serde(default, deserialize_with = "calendar_date")]
    pub end_date: Option<NaiveDate>,
}

/// Query parameters for the balance sheet.
#[derive(Debug, Deserialize)]
pub struct BalanceSheetQuery {
    /// Cut-off date; defaults to today.
    #[serde(default, deserialize_with = "calendar_date")]
    pub date: Option<NaiveDate>,
}

/// Accounting dashboard body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountingDashboardResponse {
    /// Month-to-date income.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    /// Month-to-date expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    /// Income minus expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub net_profit: Decimal,
    /// Year-to-date balance per active account.
    pub accounts_summary: Vec<AccountLine>,
    /// Latest transactions.
    pub recent_transactions: Vec<TransactionResponse>,
    /// Invoices waiting for payment.
    pub pending_invoices: u64,
}

impl From<AccountingDashboard> for AccountingDashboardResponse {
    fn from(d: AccountingDashboard) -> Self {
        Self {
            total_income: d.month.income,
            total_expenses: d.month.expenses,
            net_profit: d.month.net_income,
            accounts_summary: d.accounts,
            recent_transactions: d
                .recent_transactions
                .into_iter()
                .map(TransactionResponse::from)
                .collect(),
            pending_invoices: d.issued_invoices,
        }
    }
}

/// Inventory dashboard body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDashboardResponse {
    /// Headline figures.
    #[serde(flatten)]
    pub totals: InventoryTotals,
    /// Latest movements.
    pub recent_movements: Vec<MovementResponse>,
    /// Unresolved alerts.
    pub active_alerts: Vec<AlertResponse>,
    /// Per-category counts and value.
    pub category_summary: Vec<CategorySummary>,
}

impl From<InventoryDashboard> for InventoryDashboardResponse {
    fn from(d: InventoryDashboard) -> Self {
        Self {
            totals: d.totals,
            recent_movements: d
                .recent_movements
                .into_iter()
                .map(MovementResponse::from)
                .collect(),
            active_alerts: d.active_alerts.into_iter().map(AlertResponse::from).collect(),
            category_summary: d.categories,
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// GET /accounting/dashboard
async fn accounting_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<AccountingDashboardResponse>> {
    auth.require(Capability::AccountingRead)?;
    let dashboard = ReportRepository::new((*state.db).clone())
        .accounting_dashboard(today())
        .await?;
    Ok(Json(dashboard.into()))
}

/// GET /accounting/reports/income-statement
async fn income_statement(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<IncomeStatementQuery>,
) -> ApiResult<Json<IncomeStatement>> {
    auth.require(Capability::AccountingRead)?;

    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return Err(AppError::Validation("startDate and endDate are required".into()).into());
    };
    let statement = ReportRepository::new((*state.db).clone())
        .income_statement(start, end)
        .await?;
    Ok(Json(statement))
}

/// GET /accounting/reports/balance-sheet
async fn balance_sheet(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<BalanceSheetQuery>,
) -> ApiResult<Json<BalanceSheet>> {
    auth.require(Capability::AccountingRead)?;
    let sheet = ReportRepository::new((*state.db).clone())
        .balance_sheet(query.date.unwrap_or_else(today))
        .await?;
    Ok(Json(sheet))
}

/// GET /inventory/dashboard
async fn inventory_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<InventoryDashboardResponse>> {
    auth.require(Capability::InventoryRead)?;
    let dashboard = ReportRepository::new((*state.db).clone())
        .inventory_dashboard()
        .await?;
    Ok(Json(dashboard.into()))
}

/// GET /inventory/reports/stock-levels
async fn stock_levels(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<StockLevel>>> {
    auth.require(Capability::InventoryRead)?;
    let levels = ReportRepository::new((*state.db).clone())
        .stock_levels()
        .await?;
    Ok(Json(levels))
}

/// GET /inventory/reports/low-stock
async fn low_stock(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<LowStockItem>>> {
    auth.require(Capability::InventoryRead)?;
    let items = ReportRepository::new((*state.db).clone()).low_stock().await?;
    Ok(Json(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kontor_core::{ledger::AccountType, reports::ReportService};
    use rust_decimal_macros::dec;

    #[test]
    fn test_accounting_dashboard_keys() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let period = ReportService::period(ReportService::month_start(day), day).unwrap();
        let month = ReportService::income_statement(
            period,
            [
                (AccountType::Income, dec!(500)),
                (AccountType::Expense, dec!(300)),
            ],
        );
        let body = AccountingDashboardResponse::from(AccountingDashboard {
            month,
            accounts: Vec::new(),
            recent_transactions: Vec::new(),
            issued_invoices: 3,
        });

        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["totalIncome"], 500.0);
        assert_eq!(json["netProfit"], 200.0);
        assert_eq!(json["pendingInvoices"], 3);
    }

    #[test]
    fn test_income_statement_query_accepts_timestamps() {
        let query: IncomeStatementQuery = serde_json::from_value(serde_json::json!({
            "startDate": "2024-01-01T00:00:00Z",
            "endDate": "2024-01-31",
        }))
        .unwrap();
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(query.end_date, NaiveDate::from_ymd_opt(2024, 1, 31));
    }
}
