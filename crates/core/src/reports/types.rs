//! Report data types.

use chrono::NaiveDate;
use kontor_shared::types::{AccountId, CategoryId, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::inventory::{StockStatus, StockThresholds};
use crate::ledger::{AccountBalance, AccountType};

/// Inclusive reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
}

/// Income statement for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    /// Reporting period.
    pub period: ReportPeriod,
    /// Sum of amounts posted to INCOME accounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    /// Sum of amounts posted to EXPENSE accounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
    /// Income minus expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub net_income: Decimal,
}

/// Debit/credit totals of one account, as loaded for a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountTotals {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Folded totals.
    pub totals: AccountBalance,
}

/// One account with its balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Σ debit − Σ credit.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl From<AccountTotals> for AccountLine {
    fn from(a: AccountTotals) -> Self {
        Self {
            balance: a.totals.balance(),
            account_id: a.account_id,
            code: a.code,
            name: a.name,
            account_type: a.account_type,
        }
    }
}

/// Balance sheet section (assets, liabilities, equity).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceSheetSection {
    /// Accounts in this section.
    pub accounts: Vec<AccountLine>,
    /// Section total.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Balance sheet as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    /// Transactions dated up to and including this day are counted.
    pub as_of_date: NaiveDate,
    /// Asset accounts.
    pub assets: BalanceSheetSection,
    /// Liability accounts.
    pub liabilities: BalanceSheetSection,
    /// Equity accounts.
    pub equity: BalanceSheetSection,
    /// `assets − (liabilities + equity)`. Diagnostic only.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// A product with its folded stock, as loaded for a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductStock {
    /// Product ID.
    pub product_id: ProductId,
    /// SKU.
    pub sku: String,
    /// Product name.
    pub name: String,
    /// Category ID.
    pub category_id: CategoryId,
    /// Category name.
    pub category_name: String,
    /// Supplier name, if any.
    pub supplier_name: Option<String>,
    /// Sale price.
    pub price: Decimal,
    /// Unit cost.
    pub cost: Decimal,
    /// Thresholds.
    pub thresholds: StockThresholds,
    /// Σ IN − Σ OUT.
    pub current_stock: i64,
}

/// Stock level row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    /// Product ID.
    pub product_id: ProductId,
    /// Product name.
    pub product_name: String,
    /// Category name.
    pub category_name: String,
    /// Current stock.
    pub current_stock: i64,
    /// Minimum stock.
    pub min_stock: i64,
    /// Maximum stock.
    pub max_stock: Option<i64>,
    /// Classification.
    pub status: StockStatus,
}

/// Low stock row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    /// Product ID.
    pub product_id: ProductId,
    /// SKU.
    pub sku: String,
    /// Product name.
    pub name: String,
    /// Category name.
    pub category_name: String,
    /// Supplier name.
    pub supplier_name: Option<String>,
    /// Sale price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Unit cost.
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    /// Current stock.
    pub current_stock: i64,
    /// Minimum stock.
    pub min_stock: i64,
}

/// Per-category inventory summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    /// Category ID.
    pub category_id: CategoryId,
    /// Category name.
    pub category_name: String,
    /// Active products in the category.
    pub product_count: usize,
    /// Σ cost × stock over those products.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value: Decimal,
}

/// Headline inventory figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTotals {
    /// Active products.
    pub total_products: usize,
    /// Active products at or below their minimum.
    pub low_stock_items: usize,
    /// Σ cost × stock.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_inventory_value: Decimal,
}
