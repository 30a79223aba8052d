//! Report aggregation tests.

use chrono::NaiveDate;
use kontor_shared::types::{AccountId, CategoryId, ProductId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ReportError;
use super::service::ReportService;
use super::types::{AccountTotals, ProductStock};
use crate::inventory::{StockStatus, StockThresholds};
use crate::ledger::{AccountBalance, AccountType, EntryType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn account(code: &str, account_type: AccountType, debit: Decimal, credit: Decimal) -> AccountTotals {
    AccountTotals {
        account_id: AccountId::new(),
        code: code.to_string(),
        name: format!("Account {code}"),
        account_type,
        totals: [(EntryType::Debit, debit), (EntryType::Credit, credit)]
            .into_iter()
            .collect::<AccountBalance>(),
    }
}

fn product(category_id: CategoryId, cost: Decimal, stock: i64, min: i64, max: Option<i64>) -> ProductStock {
    ProductStock {
        product_id: ProductId::new(),
        sku: format!("SKU-{stock}"),
        name: format!("Product {stock}"),
        category_id,
        category_name: "Hardware".to_string(),
        supplier_name: None,
        price: cost * dec!(2),
        cost,
        thresholds: StockThresholds {
            min_stock: min,
            max_stock: max,
        },
        current_stock: stock,
    }
}

#[test]
fn test_income_500_expenses_300_net_200() {
    let period = ReportService::period(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
    let statement = ReportService::income_statement(
        period,
        [
            (AccountType::Income, dec!(500)),
            (AccountType::Expense, dec!(300)),
            (AccountType::Asset, dec!(999)),
        ],
    );

    assert_eq!(statement.income, dec!(500));
    assert_eq!(statement.expenses, dec!(300));
    assert_eq!(statement.net_income, dec!(200));
}

#[test]
fn test_empty_period_is_all_zero() {
    let period = ReportService::period(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
    let statement = ReportService::income_statement(period, std::iter::empty());
    assert_eq!(statement.net_income, Decimal::ZERO);
}

#[test]
fn test_inverted_period_rejected() {
    let result = ReportService::period(date(2024, 2, 1), date(2024, 1, 1));
    assert!(matches!(result, Err(ReportError::InvalidDateRange { .. })));
}

#[test]
fn test_balance_sheet_sections_and_diagnostic() {
    let sheet = ReportService::balance_sheet(
        date(2024, 6, 30),
        vec![
            account("1001", AccountType::Asset, dec!(100), dec!(30)),
            account("2001", AccountType::Liability, dec!(0), dec!(50)),
            account("3001", AccountType::Equity, dec!(0), dec!(20)),
            account("4001", AccountType::Income, dec!(0), dec!(500)),
        ],
    );

    assert_eq!(sheet.assets.total, dec!(70));
    assert_eq!(sheet.liabilities.total, dec!(-50));
    assert_eq!(sheet.equity.total, dec!(-20));
    assert_eq!(sheet.assets.accounts.len(), 1);
    assert_eq!(sheet.balance, dec!(140));
}

#[test]
fn test_stock_levels_classify() {
    let category = CategoryId::new();
    let products = [
        product(category, dec!(1), 2, 5, None),
        product(category, dec!(1), 50, 5, Some(100)),
        product(category, dec!(1), 120, 5, Some(100)),
    ];

    let statuses: Vec<_> = ReportService::stock_levels(&products)
        .into_iter()
        .map(|s| s.status)
        .collect();
    assert_eq!(
        statuses,
        vec![StockStatus::Low, StockStatus::Normal, StockStatus::Over]
    );
}

#[test]
fn test_low_stock_and_totals() {
    let category = CategoryId::new();
    let products = [
        product(category, dec!(2.5), 4, 5, None),
        product(category, dec!(10), 10, 5, None),
    ];

    let low = ReportService::low_stock(&products);
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].current_stock, 4);

    let totals = ReportService::inventory_totals(&products);
    assert_eq!(totals.total_products, 2);
    assert_eq!(totals.low_stock_items, 1);
    assert_eq!(totals.total_inventory_value, dec!(110));
}

#[test]
fn test_category_summary_includes_empty_categories() {
    let tools = CategoryId::new();
    let empty = CategoryId::new();
    let products = [
        product(tools, dec!(3), 10, 0, None),
        product(tools, dec!(1), 5, 0, None),
    ];

    let summary = ReportService::category_summary(
        vec![(tools, "Tools".to_string()), (empty, "Empty".to_string())],
        &products,
    );

    assert_eq!(summary[0].product_count, 2);
    assert_eq!(summary[0].total_value, dec!(35));
    assert_eq!(summary[1].product_count, 0);
    assert_eq!(summary[1].total_value, Decimal::ZERO);
}

#[test]
fn test_month_and_year_start() {
    assert_eq!(ReportService::month_start(date(2024, 2, 29)), date(2024, 2, 1));
    assert_eq!(ReportService::year_start(date(2024, 2, 29)), date(2024, 1, 1));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Net income is always income minus expenses.
    #[test]
    fn prop_net_income_is_difference(
        income in prop::collection::vec(0i64..1_000_000, 0..20),
        expenses in prop::collection::vec(0i64..1_000_000, 0..20),
    ) {
        let period = ReportService::period(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        let entries = income
            .iter()
            .map(|c| (AccountType::Income, Decimal::new(*c, 2)))
            .chain(expenses.iter().map(|c| (AccountType::Expense, Decimal::new(*c, 2))));

        let statement = ReportService::income_statement(period, entries);
        prop_assert_eq!(statement.net_income, statement.income - statement.expenses);
    }

    /// Section totals equal the sum of their lines.
    #[test]
    fn prop_section_total_is_sum_of_lines(
        amounts in prop::collection::vec((0i64..1_000_000, 0i64..1_000_000), 0..15),
    ) {
        let accounts = amounts
            .iter()
            .enumerate()
            .map(|(i, (d, c))| account(&format!("1{i:03}"), AccountType::Asset, Decimal::new(*d, 2), Decimal::new(*c, 2)))
            .collect();

        let sheet = ReportService::balance_sheet(date(2024, 12, 31), accounts);
        let lines: Decimal = sheet.assets.accounts.iter().map(|a| a.balance).sum();
        prop_assert_eq!(sheet.assets.total, lines);
        prop_assert_eq!(sheet.balance, sheet.assets.total);
    }
}
