//! Chart of accounts and ledger transaction routes.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::NaiveDate;
use kontor_core::{
    auth::Capability,
    ledger::{AccountChanges, AccountType, NewAccount, NewTransaction},
};
use kontor_db::{
    AccountRepository, TransactionRepository,
    repositories::AccountFilter,
};
use kontor_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::views::{AccountResponse, TransactionResponse};
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, calendar_date},
    middleware::AuthUser,
};

/// Default page size for the transaction list.
const TRANSACTIONS_PAGE_SIZE: u64 = 20;

/// Creates the account and transaction routes (requires auth middleware to
/// be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounting/accounts", get(list_accounts).post(create_account))
        .route("/accounting/accounts/{id}", get(get_account).put(update_account))
        .route(
            "/accounting/transactions",
            get(list_transactions).post(create_transaction),
        )
}

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsQuery {
    /// Filter by account type.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Defaults to active accounts only.
    pub is_active: Option<bool>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Unique code.
    pub code: Option<String>,
    /// Name.
    pub name: Option<String>,
    /// ASSET, LIABILITY, EQUITY, INCOME or EXPENSE.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// Request body for updating an account. Absent fields are kept.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    /// Unique code.
    pub code: Option<String>,
    /// Name.
    pub name: Option<String>,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
}

/// Account with its balance and latest transactions.
#[derive(Debug, Serialize)]
pub struct AccountDetailResponse {
    /// Account and balance.
    #[serde(flatten)]
    pub account: AccountResponse,
    /// Latest transactions, newest first.
    pub transactions: Vec<TransactionResponse>,
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Only transactions on this account.
    pub account_id: Option<Uuid>,
}

/// Request body for recording a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    /// Booking date.
    #[serde(default, deserialize_with = "calendar_date")]
    pub date: Option<NaiveDate>,
    /// Description.
    pub description: Option<String>,
    /// Non-negative amount.
    pub amount: Option<Decimal>,
    /// DEBIT or CREDIT.
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    /// Target account.
    pub account_id: Option<Uuid>,
    /// External reference.
    pub reference: Option<String>,
}

/// GET /accounting/accounts
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListAccountsQuery>,
) -> ApiResult<Json<Vec<AccountResponse>>> {
    auth.require(Capability::AccountingRead)?;

    let account_type = query
        .account_type
        .as_deref()
        .map(str::parse::<AccountType>)
        .transpose()?;
    let filter = AccountFilter {
        account_type: account_type.map(Into::into),
        is_active: query.is_active,
    };

    let accounts = AccountRepository::new((*state.db).clone())
        .list_accounts(filter)
        .await?;
    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// GET /accounting/accounts/{id}
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<AccountDetailResponse>> {
    auth.require(Capability::AccountingRead)?;

    let detail = AccountRepository::new((*state.db).clone())
        .get_account(id)
        .await?;
    Ok(Json(AccountDetailResponse {
        account: detail.account.into(),
        transactions: detail
            .transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    }))
}

/// POST /accounting/accounts
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    auth.require(Capability::AccountingWrite)?;

    let input = NewAccount {
        code: payload.code,
        name: payload.name,
        account_type: payload.account_type,
        description: payload.description,
    }
    .validate()?;
    let account = AccountRepository::new((*state.db).clone())
        .create_account(input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse::new(account, Decimal::ZERO)),
    ))
}

/// PUT /accounting/accounts/{id}
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateAccountRequest>,
) -> ApiResult<Json<AccountResponse>> {
    auth.require(Capability::AccountingWrite)?;

    let changes = AccountChanges {
        code: payload.code,
        name: payload.name,
        account_type: payload.account_type,
        description: payload.description,
        is_active: payload.is_active,
    }
    .validate()?;

    let repo = AccountRepository::new((*state.db).clone());
    repo.update_account(id, changes).await?;
    let updated = repo.get_account(id).await?;
    Ok(Json(updated.account.into()))
}

/// GET /accounting/transactions
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListTransactionsQuery>,
) -> ApiResult<Json<PageResponse<TransactionResponse>>> {
    auth.require(Capability::AccountingRead)?;

    let page = PageRequest::from_query(query.page, query.limit, TRANSACTIONS_PAGE_SIZE);
    let transactions = TransactionRepository::new((*state.db).clone())
        .list(page, query.account_id)
        .await?;
    Ok(Json(transactions.map(TransactionResponse::from)))
}

/// POST /accounting/transactions
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    auth.require(Capability::AccountingWrite)?;

    let input = NewTransaction {
        date: payload.date,
        description: payload.description,
        amount: payload.amount,
        entry_type: payload.entry_type,
        account_id: payload.account_id,
        reference: payload.reference,
    }
    .validate()?;
    let line = TransactionRepository::new((*state.db).clone())
        .create(input, auth.user_id())
        .await?;

    Ok((StatusCode::CREATED, Json(line.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_request_reads_numeric_amount() {
        let request: CreateTransactionRequest = serde_json::from_value(json!({
            "date": "2024-03-01",
            "description": "Office rent",
            "amount": 1200.5,
            "type": "DEBIT",
            "accountId": Uuid::nil(),
        }))
        .unwrap();

        assert_eq!(request.amount, Some(Decimal::new(12005, 1)));
        assert_eq!(request.entry_type.as_deref(), Some("DEBIT"));
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_account_type_filter_rejects_unknown() {
        assert!("BOGUS".parse::<AccountType>().is_err());
        assert_eq!("income".parse::<AccountType>().unwrap(), AccountType::Income);
    }
}
