//! Invoice routes.
//!
//! An invoice and its ledger lines are written in one database transaction.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use chrono::NaiveDate;
use kontor_core::{
    auth::Capability,
    invoice::{InvoiceStatus, NewInvoice, NewInvoiceLine},
};
use kontor_db::{
    InvoiceRepository,
    repositories::{InvoiceFilter, InvoiceWithLines},
};
use kontor_shared::{
    AppError,
    types::{PageRequest, PageResponse},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::views::{InvoiceResponse, TransactionResponse};
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, calendar_date},
    middleware::AuthUser,
};

/// Default page size for the invoice list.
const INVOICES_PAGE_SIZE: u64 = 20;

/// Creates the invoice routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounting/invoices", get(list_invoices).post(create_invoice))
        .route("/accounting/invoices/{id}", get(get_invoice))
        .route("/accounting/invoices/{id}/status", patch(update_status))
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Filter by invoice type label.
    #[serde(rename = "type")]
    pub invoice_type: Option<String>,
    /// Filter by status.
    pub status: Option<String>,
}

/// One ledger line of a new invoice.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineRequest {
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
    /// Booking date; defaults to the invoice date.
    #[serde(default, deserialize_with = "calendar_date")]
    pub date: Option<NaiveDate>,
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    /// Unique number.
    pub number: Option<String>,
    /// Free-form type label such as SALE or PURCHASE.
    #[serde(rename = "type")]
    pub invoice_type: Option<String>,
    /// Invoice date.
    #[serde(default, deserialize_with = "calendar_date")]
    pub date: Option<NaiveDate>,
    /// Due date.
    #[serde(default, deserialize_with = "calendar_date")]
    pub due_date: Option<NaiveDate>,
    /// Client name.
    pub client_name: Option<String>,
    /// Client email.
    pub client_email: Option<String>,
    /// Client tax identifier.
    pub client_tax_id: Option<String>,
    /// Amount before tax.
    pub subtotal: Option<Decimal>,
    /// Tax.
    pub tax: Option<Decimal>,
    /// Amount due.
    pub total: Option<Decimal>,
    /// Notes.
    pub notes: Option<String>,
    /// Ledger lines booked with the invoice.
    #[serde(default)]
    pub transactions: Vec<InvoiceLineRequest>,
}

impl From<CreateInvoiceRequest> for NewInvoice {
    fn from(r: CreateInvoiceRequest) -> Self {
        Self {
            number: r.number,
            invoice_type: r.invoice_type,
            date: r.date,
            due_date: r.due_date,
            client_name: r.client_name,
            client_email: r.client_email,
            client_tax_id: r.client_tax_id,
            subtotal: r.subtotal,
            tax: r.tax,
            total: r.total,
            notes: r.notes,
            lines: r
                .transactions
                .into_iter()
                .map(|l| NewInvoiceLine {
                    description: l.description,
                    amount: l.amount,
                    entry_type: l.entry_type,
                    account_id: l.account_id,
                    reference: l.reference,
                    date: l.date,
                })
                .collect(),
        }
    }
}

/// Request body for changing an invoice's status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// DRAFT, ISSUED, PAID or CANCELLED.
    pub status: Option<String>,
}

fn with_lines(bundle: InvoiceWithLines) -> InvoiceResponse {
    InvoiceResponse {
        transactions: Some(
            bundle
                .lines
                .into_iter()
                .map(TransactionResponse::from)
                .collect(),
        ),
        ..InvoiceResponse::from(bundle.invoice)
    }
}

/// GET /accounting/invoices
async fn list_invoices(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListInvoicesQuery>,
) -> ApiResult<Json<PageResponse<InvoiceResponse>>> {
    auth.require(Capability::AccountingRead)?;

    let status = query
        .status
        .as_deref()
        .map(str::parse::<InvoiceStatus>)
        .transpose()?;
    let filter = InvoiceFilter {
        invoice_type: query.invoice_type.filter(|t| !t.trim().is_empty()),
        status,
    };
    let page = PageRequest::from_query(query.page, query.limit, INVOICES_PAGE_SIZE);

    let invoices = InvoiceRepository::new((*state.db).clone())
        .list(page, filter)
        .await?;
    Ok(Json(invoices.map(with_lines)))
}

/// GET /accounting/invoices/{id}
async fn get_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<InvoiceResponse>> {
    auth.require(Capability::AccountingRead)?;

    let invoice = InvoiceRepository::new((*state.db).clone()).get(id).await?;
    Ok(Json(with_lines(invoice)))
}

/// POST /accounting/invoices
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateInvoiceRequest>,
) -> ApiResult<(StatusCode, Json<InvoiceResponse>)> {
    auth.require(Capability::AccountingWrite)?;

    let input = NewInvoice::from(payload).validate()?;
    let invoice = InvoiceRepository::new((*state.db).clone())
        .create(input, auth.user_id())
        .await?;

    Ok((StatusCode::CREATED, Json(with_lines(invoice))))
}

/// PATCH /accounting/invoices/{id}/status
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> ApiResult<Json<InvoiceResponse>> {
    auth.require(Capability::AccountingWrite)?;

    let status: InvoiceStatus = payload
        .status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("status is required".into()))?
        .parse()?;

    let invoice = InvoiceRepository::new((*state.db).clone())
        .update_status(id, status)
        .await?;
    Ok(Json(invoice.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_lines_inherit_invoice_date() {
        let account = Uuid::new_v4();
        let request: CreateInvoiceRequest = serde_json::from_value(json!({
            "number": "INV-0001",
            "type": "SALE",
            "date": "2024-05-10T00:00:00.000Z",
            "clientName": "Acme",
            "subtotal": 100,
            "tax": 21,
            "total": 121,
            "transactions": [
                { "description": "Sale", "amount": 121, "type": "DEBIT", "accountId": account },
                { "description": "Late fee", "amount": 5, "type": "DEBIT", "accountId": account, "date": "2024-06-01" },
            ],
        }))
        .unwrap();

        let invoice = NewInvoice::from(request).validate().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.total, dec!(121));
        assert_eq!(invoice.lines[0].date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(invoice.lines[1].date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(invoice.referenced_accounts(), vec![account]);
    }

    #[test]
    fn test_invoice_without_lines_is_valid() {
        let request: CreateInvoiceRequest = serde_json::from_value(json!({
            "number": "INV-0002",
            "type": "PURCHASE",
            "date": "2024-05-10",
            "clientName": "Supplier Co",
            "subtotal": 0,
            "tax": 0,
            "total": 0,
        }))
        .unwrap();

        assert!(NewInvoice::from(request).validate().unwrap().lines.is_empty());
    }
}
