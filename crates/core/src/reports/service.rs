//! Report generation service.

use chrono::{Datelike, NaiveDate};
use kontor_shared::types::CategoryId;
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    AccountLine, AccountTotals, BalanceSheet, BalanceSheetSection, CategorySummary,
    IncomeStatement, InventoryTotals, LowStockItem, ProductStock, ReportPeriod, StockLevel,
};
use crate::inventory::stock_value;
use crate::ledger::AccountType;

/// Service for generating reports.
pub struct ReportService;

impl ReportService {
    /// Checks that `start` is not after `end`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` when the range is inverted.
    pub fn period(start: NaiveDate, end: NaiveDate) -> Result<ReportPeriod, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(ReportPeriod {
            start_date: start,
            end_date: end,
        })
    }

    /// Generates an income statement from the amounts posted in the period.
    ///
    /// Amounts are summed as posted, regardless of debit or credit side.
    /// Entries on balance sheet accounts are ignored.
    pub fn income_statement<I>(period: ReportPeriod, entries: I) -> IncomeStatement
    where
        I: IntoIterator<Item = (AccountType, Decimal)>,
    {
        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;

        for (account_type, amount) in entries {
            match account_type {
                AccountType::Income => income += amount,
                AccountType::Expense => expenses += amount,
                AccountType::Asset | AccountType::Liability | AccountType::Equity => {}
            }
        }

        IncomeStatement {
            period,
            income,
            expenses,
            net_income: income - expenses,
        }
    }

    /// Generates a balance sheet from per-account totals.
    ///
    /// Income and expense accounts are skipped. `balance` is
    /// `assets − (liabilities + equity)` and is not required to be zero.
    #[must_use]
    pub fn balance_sheet(as_of_date: NaiveDate, accounts: Vec<AccountTotals>) -> BalanceSheet {
        let mut assets = BalanceSheetSection::default();
        let mut liabilities = BalanceSheetSection::default();
        let mut equity = BalanceSheetSection::default();

        for account in accounts {
            let section = match account.account_type {
                AccountType::Asset => &mut assets,
                AccountType::Liability => &mut liabilities,
                AccountType::Equity => &mut equity,
                AccountType::Income | AccountType::Expense => continue,
            };
            let line = AccountLine::from(account);
            section.total += line.balance;
            section.accounts.push(line);
        }

        let balance = assets.total - (liabilities.total + equity.total);

        BalanceSheet {
            as_of_date,
            assets,
            liabilities,
            equity,
            balance,
        }
    }

    /// Classifies every product.
    #[must_use]
    pub fn stock_levels(products: &[ProductStock]) -> Vec<StockLevel> {
        products
            .iter()
            .map(|p| StockLevel {
                product_id: p.product_id,
                product_name: p.name.clone(),
                category_name: p.category_name.clone(),
                current_stock: p.current_stock,
                min_stock: p.thresholds.min_stock,
                max_stock: p.thresholds.max_stock,
                status: p.thresholds.classify(p.current_stock),
            })
            .collect()
    }

    /// Products at or below their minimum stock.
    #[must_use]
    pub fn low_stock(products: &[ProductStock]) -> Vec<LowStockItem> {
        products
            .iter()
            .filter(|p| p.thresholds.is_low(p.current_stock))
            .map(|p| LowStockItem {
                product_id: p.product_id,
                sku: p.sku.clone(),
                name: p.name.clone(),
                category_name: p.category_name.clone(),
                supplier_name: p.supplier_name.clone(),
                price: p.price,
                cost: p.cost,
                current_stock: p.current_stock,
                min_stock: p.thresholds.min_stock,
            })
            .collect()
    }

    /// Headline figures for the inventory dashboard.
    #[must_use]
    pub fn inventory_totals(products: &[ProductStock]) -> InventoryTotals {
        InventoryTotals {
            total_products: products.len(),
            low_stock_items: products
                .iter()
                .filter(|p| p.thresholds.is_low(p.current_stock))
                .count(),
            total_inventory_value: products
                .iter()
                .map(|p| stock_value(p.cost, p.current_stock))
                .sum(),
        }
    }

    /// Product count and value per category.
    ///
    /// Every listed category appears, even with no products.
    #[must_use]
    pub fn category_summary(
        categories: Vec<(CategoryId, String)>,
        products: &[ProductStock],
    ) -> Vec<CategorySummary> {
        categories
            .into_iter()
            .map(|(category_id, category_name)| {
                let in_category = products.iter().filter(|p| p.category_id == category_id);
                let (product_count, total_value) =
                    in_category.fold((0, Decimal::ZERO), |(count, value), p| {
                        (count + 1, value + stock_value(p.cost, p.current_stock))
                    });
                CategorySummary {
                    category_id,
                    category_name,
                    product_count,
                    total_value,
                }
            })
            .collect()
    }

    /// First day of the month containing `today`.
    #[must_use]
    pub fn month_start(today: NaiveDate) -> NaiveDate {
        today.with_day(1).unwrap_or(today)
    }

    /// First day of the year containing `today`.
    #[must_use]
    pub fn year_start(today: NaiveDate) -> NaiveDate {
        today.with_ordinal(1).unwrap_or(today)
    }
}
