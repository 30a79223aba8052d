//! Integration tests for the account ledger and the invoice binder.

mod common;

use chrono::NaiveDate;
use kontor_core::invoice::{InvoiceStatus, NewInvoice, NewInvoiceLine};
use kontor_core::ledger::{NewAccount, NewTransaction};
use kontor_db::repositories::{AccountError, InvoiceError};
use kontor_db::{AccountRepository, InvoiceRepository, ReportRepository, TransactionRepository};
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

use kontor_db::entities::{invoices, transactions};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn entry(account_id: Uuid, amount: rust_decimal::Decimal, entry_type: &str) -> NewTransaction {
    NewTransaction {
        date: Some(date(2024, 3, 15)),
        description: Some("Entry".into()),
        amount: Some(amount),
        entry_type: Some(entry_type.into()),
        account_id: Some(account_id),
        reference: None,
    }
}

fn line(account_id: Uuid, amount: rust_decimal::Decimal, entry_type: &str) -> NewInvoiceLine {
    NewInvoiceLine {
        description: Some("Line".into()),
        amount: Some(amount),
        entry_type: Some(entry_type.into()),
        account_id: Some(account_id),
        reference: None,
        date: None,
    }
}

fn invoice(number: &str, lines: Vec<NewInvoiceLine>) -> NewInvoice {
    NewInvoice {
        number: Some(number.into()),
        invoice_type: Some("SALE".into()),
        date: Some(date(2024, 3, 1)),
        client_name: Some("ACME".into()),
        subtotal: Some(dec!(100)),
        tax: Some(dec!(21)),
        total: Some(dec!(121)),
        lines,
        ..NewInvoice::default()
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_balance_is_debit_minus_credit() {
    let t = common::setup().await;
    let cash = common::account(&t.db, "1001", "ASSET").await;
    let repo = TransactionRepository::new(t.db.clone());

    for (amount, side) in [(dec!(100), "DEBIT"), (dec!(30), "CREDIT")] {
        repo.create(entry(cash, amount, side).validate().unwrap(), t.user_id)
            .await
            .expect("Failed to record transaction");
    }

    let detail = AccountRepository::new(t.db.clone())
        .get_account(cash)
        .await
        .expect("Failed to get account");
    assert_eq!(detail.account.balance(), dec!(70));
    assert_eq!(detail.transactions.len(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_account_code_rejected() {
    let t = common::setup().await;
    common::account(&t.db, "1001", "ASSET").await;

    let result = AccountRepository::new(t.db.clone())
        .create_account(
            NewAccount {
                code: Some("1001".into()),
                name: Some("Other".into()),
                account_type: Some("ASSET".into()),
                description: None,
            }
            .validate()
            .unwrap(),
        )
        .await;
    assert!(matches!(result, Err(AccountError::DuplicateCode(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_account_codes_yield_one_winner() {
    let t = common::setup().await;
    let mut tasks = tokio::task::JoinSet::new();
    for n in 0..8 {
        let repo = AccountRepository::new(t.db.clone());
        tasks.spawn(async move {
            let input = NewAccount {
                code: Some("4001".into()),
                name: Some(format!("Sales {n}")),
                account_type: Some("INCOME".into()),
                description: None,
            }
            .validate()
            .unwrap();
            repo.create_account(input).await
        });
    }

    let results = tasks.join_all().await;
    let created = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(AccountError::DuplicateCode(code)) if code == "4001"))
        .count();
    assert_eq!(created, 1);
    assert_eq!(duplicates, 7);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_invoice_numbers_yield_one_winner() {
    let t = common::setup().await;
    let sales = common::account(&t.db, "4001", "INCOME").await;
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let repo = InvoiceRepository::new(t.db.clone());
        let input = invoice("F-RACE", vec![line(sales, dec!(121), "CREDIT")])
            .validate()
            .unwrap();
        let user_id = t.user_id;
        tasks.spawn(async move { repo.create(input, user_id).await });
    }

    let results = tasks.join_all().await;
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(InvoiceError::DuplicateNumber(_))))
    );
    assert_eq!(invoices::Entity::find().count(&t.db).await.unwrap(), 1);
    assert_eq!(transactions::Entity::find().count(&t.db).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_invoice_books_all_lines() {
    let t = common::setup().await;
    let receivable = common::account(&t.db, "1100", "ASSET").await;
    let sales = common::account(&t.db, "4001", "INCOME").await;
    let repo = InvoiceRepository::new(t.db.clone());

    let created = repo
        .create(
            invoice(
                "F-001",
                vec![line(receivable, dec!(121), "DEBIT"), line(sales, dec!(121), "CREDIT")],
            )
            .validate()
            .unwrap(),
            t.user_id,
        )
        .await
        .expect("Failed to create invoice");

    assert_eq!(created.lines.len(), 2);
    assert_eq!(InvoiceStatus::from(created.invoice.status), InvoiceStatus::Draft);
    assert!(created.lines.iter().all(|l| l.transaction.date == date(2024, 3, 1)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_invoice_with_missing_account_rolls_back() {
    let t = common::setup().await;
    let receivable = common::account(&t.db, "1100", "ASSET").await;
    let repo = InvoiceRepository::new(t.db.clone());

    let result = repo
        .create(
            invoice(
                "F-002",
                vec![
                    line(receivable, dec!(121), "DEBIT"),
                    line(Uuid::new_v4(), dec!(121), "CREDIT"),
                ],
            )
            .validate()
            .unwrap(),
            t.user_id,
        )
        .await;

    assert!(matches!(result, Err(InvoiceError::AccountNotFound(_))));
    assert_eq!(invoices::Entity::find().count(&t.db).await.unwrap(), 0);
    assert_eq!(transactions::Entity::find().count(&t.db).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_invoice_number_leaves_state_unchanged() {
    let t = common::setup().await;
    let sales = common::account(&t.db, "4001", "INCOME").await;
    let repo = InvoiceRepository::new(t.db.clone());

    repo.create(
        invoice("F-003", vec![line(sales, dec!(50), "CREDIT")])
            .validate()
            .unwrap(),
        t.user_id,
    )
    .await
    .expect("Failed to create invoice");

    let result = repo
        .create(
            invoice("F-003", vec![line(sales, dec!(70), "CREDIT")])
                .validate()
                .unwrap(),
            t.user_id,
        )
        .await;

    assert!(matches!(result, Err(InvoiceError::DuplicateNumber(_))));
    assert_eq!(invoices::Entity::find().count(&t.db).await.unwrap(), 1);
    assert_eq!(transactions::Entity::find().count(&t.db).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_income_statement_and_balance_sheet() {
    let t = common::setup().await;
    let cash = common::account(&t.db, "1001", "ASSET").await;
    let sales = common::account(&t.db, "4001", "INCOME").await;
    let rent = common::account(&t.db, "5001", "EXPENSE").await;
    let repo = TransactionRepository::new(t.db.clone());

    for (account, amount, side) in [
        (sales, dec!(500), "CREDIT"),
        (rent, dec!(300), "DEBIT"),
        (cash, dec!(200), "DEBIT"),
    ] {
        repo.create(entry(account, amount, side).validate().unwrap(), t.user_id)
            .await
            .unwrap();
    }

    let reports = ReportRepository::new(t.db.clone());
    let statement = reports
        .income_statement(date(2024, 3, 1), date(2024, 3, 31))
        .await
        .unwrap();
    assert_eq!(statement.income, dec!(500));
    assert_eq!(statement.expenses, dec!(300));
    assert_eq!(statement.net_income, dec!(200));

    let before = reports.balance_sheet(date(2024, 3, 14)).await.unwrap();
    assert_eq!(before.assets.total, dec!(0));
    let after = reports.balance_sheet(date(2024, 3, 31)).await.unwrap();
    assert_eq!(after.assets.total, dec!(200));
    assert!(after.assets.accounts.iter().all(|a| a.code == "1001"));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_dashboard_counts_future_dated_entries_this_month() {
    let t = common::setup().await;
    let cash = common::account(&t.db, "1001", "ASSET").await;
    let sales = common::account(&t.db, "4001", "INCOME").await;
    let repo = TransactionRepository::new(t.db.clone());

    for (account, amount, side, day) in [
        (sales, dec!(500), "CREDIT", date(2024, 2, 28)),
        (sales, dec!(120), "CREDIT", date(2024, 3, 5)),
        (sales, dec!(80), "CREDIT", date(2024, 3, 25)),
        (cash, dec!(80), "DEBIT", date(2024, 3, 25)),
    ] {
        let input = NewTransaction {
            date: Some(day),
            ..entry(account, amount, side)
        };
        repo.create(input.validate().unwrap(), t.user_id).await.unwrap();
    }

    let dashboard = ReportRepository::new(t.db.clone())
        .accounting_dashboard(date(2024, 3, 10))
        .await
        .unwrap();

    assert_eq!(dashboard.month.income, dec!(200));
    let cash_line = dashboard
        .accounts
        .iter()
        .find(|a| a.code == "1001")
        .unwrap();
    assert_eq!(cash_line.balance, dec!(80));
}
