//! JSON views shared by several route modules.
//!
//! Keys are camelCase and money is emitted as a JSON number.

use chrono::{DateTime, FixedOffset, NaiveDate};
use kontor_core::{
    inventory::{AlertType, MovementType, StockStatus},
    invoice::InvoiceStatus,
    ledger::{AccountType, EntryType},
};
use kontor_db::{
    entities::{accounts, categories, inventory_alerts, invoices, movements, products, suppliers},
    repositories::{AccountWithBalance, AlertLine, MovementLine, ProductView, TransactionLine},
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Account summary embedded in other views.
#[derive(Debug, Serialize)]
pub struct AccountRef {
    /// Account ID.
    pub id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

impl From<accounts::Model> for AccountRef {
    fn from(a: accounts::Model) -> Self {
        Self {
            id: a.id,
            code: a.code,
            name: a.name,
            account_type: a.account_type.into(),
        }
    }
}

/// Account with its balance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Active flag.
    pub is_active: bool,
    /// Σ debit − Σ credit.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update.
    pub updated_at: DateTime<FixedOffset>,
}

impl AccountResponse {
    /// Builds the view with an explicit balance.
    #[must_use]
    pub fn new(account: accounts::Model, balance: Decimal) -> Self {
        Self {
            id: account.id,
            code: account.code,
            name: account.name,
            description: account.description,
            account_type: account.account_type.into(),
            is_active: account.is_active,
            balance,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

impl From<AccountWithBalance> for AccountResponse {
    fn from(a: AccountWithBalance) -> Self {
        let balance = a.balance();
        Self::new(a.account, balance)
    }
}

/// Invoice summary embedded in transaction views.
#[derive(Debug, Serialize)]
pub struct InvoiceRef {
    /// Invoice ID.
    pub id: Uuid,
    /// Invoice number.
    pub number: String,
    /// Invoice type.
    #[serde(rename = "type")]
    pub invoice_type: String,
}

/// Ledger transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Booking date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// DEBIT or CREDIT.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// External reference.
    pub reference: Option<String>,
    /// Account ID.
    pub account_id: Uuid,
    /// Account summary.
    pub account: Option<AccountRef>,
    /// Owning invoice ID.
    pub invoice_id: Option<Uuid>,
    /// Owning invoice summary.
    pub invoice: Option<InvoiceRef>,
    /// Author.
    pub created_by: Uuid,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
}

impl From<TransactionLine> for TransactionResponse {
    fn from(line: TransactionLine) -> Self {
        let t = line.transaction;
        Self {
            id: t.id,
            date: t.date,
            description: t.description,
            amount: t.amount,
            entry_type: t.entry_type.into(),
            reference: t.reference,
            account_id: t.account_id,
            account: line.account.map(AccountRef::from),
            invoice_id: t.invoice_id,
            invoice: line.invoice.map(|i| InvoiceRef {
                id: i.id,
                number: i.number,
                invoice_type: i.invoice_type,
            }),
            created_by: t.created_by,
            created_at: t.created_at,
        }
    }
}

/// Invoice, with its ledger lines on the detail view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// Invoice number.
    pub number: String,
    /// Invoice type.
    #[serde(rename = "type")]
    pub invoice_type: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Client name.
    pub client_name: String,
    /// Client email.
    pub client_email: Option<String>,
    /// Client tax identifier.
    pub client_tax_id: Option<String>,
    /// Amount before tax.
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    /// Tax.
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    /// Amount due.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Status.
    pub status: InvoiceStatus,
    /// Notes.
    pub notes: Option<String>,
    /// Author.
    pub created_by: Uuid,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update.
    pub updated_at: DateTime<FixedOffset>,
    /// Booked transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<TransactionResponse>>,
}

impl From<invoices::Model> for InvoiceResponse {
    fn from(i: invoices::Model) -> Self {
        Self {
            id: i.id,
            number: i.number,
            invoice_type: i.invoice_type,
            date: i.date,
            due_date: i.due_date,
            client_name: i.client_name,
            client_email: i.client_email,
            client_tax_id: i.client_tax_id,
            subtotal: i.subtotal,
            tax: i.tax,
            total: i.total,
            status: i.status.into(),
            notes: i.notes,
            created_by: i.created_by,
            created_at: i.created_at,
            updated_at: i.updated_at,
            transactions: None,
        }
    }
}

/// Category summary embedded in product views.
#[derive(Debug, Serialize)]
pub struct CategoryRef {
    /// Category ID.
    pub id: Uuid,
    /// Category name.
    pub name: String,
}

impl From<categories::Model> for CategoryRef {
    fn from(c: categories::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

/// Supplier summary embedded in product views.
#[derive(Debug, Serialize)]
pub struct SupplierRef {
    /// Supplier ID.
    pub id: Uuid,
    /// Supplier name.
    pub name: String,
}

impl From<suppliers::Model> for SupplierRef {
    fn from(s: suppliers::Model) -> Self {
        Self {
            id: s.id,
            name: s.name,
        }
    }
}

/// Product with its folded stock.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    /// Product ID.
    pub id: Uuid,
    /// SKU.
    pub sku: String,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Sale price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Unit cost.
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    /// Minimum stock.
    pub min_stock: i64,
    /// Maximum stock.
    pub max_stock: Option<i64>,
    /// Active flag.
    pub is_active: bool,
    /// Category ID.
    pub category_id: Uuid,
    /// Category summary.
    pub category: Option<CategoryRef>,
    /// Supplier ID.
    pub supplier_id: Option<Uuid>,
    /// Supplier summary.
    pub supplier: Option<SupplierRef>,
    /// Σ IN − Σ OUT.
    pub current_stock: i64,
    /// LOW, NORMAL or OVER.
    pub stock_status: StockStatus,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update.
    pub updated_at: DateTime<FixedOffset>,
}

impl ProductResponse {
    /// Builds the view with an explicit stock.
    #[must_use]
    pub fn new(
        p: products::Model,
        category: Option<categories::Model>,
        supplier: Option<suppliers::Model>,
        stock: i64,
    ) -> Self {
        Self {
            stock_status: p.thresholds().classify(stock),
            id: p.id,
            sku: p.sku,
            name: p.name,
            description: p.description,
            price: p.price,
            cost: p.cost,
            min_stock: p.min_stock,
            max_stock: p.max_stock,
            is_active: p.is_active,
            category_id: p.category_id,
            category: category.map(CategoryRef::from),
            supplier_id: p.supplier_id,
            supplier: supplier.map(SupplierRef::from),
            current_stock: stock,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<ProductView> for ProductResponse {
    fn from(v: ProductView) -> Self {
        Self::new(v.product, v.category, v.supplier, v.stock)
    }
}

/// Product summary embedded in movement and alert views.
#[derive(Debug, Serialize)]
pub struct ProductRef {
    /// Product ID.
    pub id: Uuid,
    /// SKU.
    pub sku: String,
    /// Name.
    pub name: String,
}

impl From<products::Model> for ProductRef {
    fn from(p: products::Model) -> Self {
        Self {
            id: p.id,
            sku: p.sku,
            name: p.name,
        }
    }
}

/// Stock movement.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResponse {
    /// Movement ID.
    pub id: Uuid,
    /// IN or OUT.
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Units moved.
    pub quantity: i32,
    /// Reason.
    pub reason: String,
    /// External reference.
    pub reference: Option<String>,
    /// Product ID.
    pub product_id: Uuid,
    /// Product summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductRef>,
    /// Author.
    pub created_by: Uuid,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
}

impl MovementResponse {
    /// Builds the view, with the product summary when known.
    #[must_use]
    pub fn new(m: movements::Model, product: Option<products::Model>) -> Self {
        Self {
            id: m.id,
            movement_type: m.movement_type.into(),
            quantity: m.quantity,
            reason: m.reason,
            reference: m.reference,
            product_id: m.product_id,
            product: product.map(ProductRef::from),
            created_by: m.created_by,
            created_at: m.created_at,
        }
    }
}

impl From<MovementLine> for MovementResponse {
    fn from(line: MovementLine) -> Self {
        Self::new(line.movement, line.product)
    }
}

/// Inventory alert.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    /// Alert ID.
    pub id: Uuid,
    /// LOW_STOCK or OVER_STOCK.
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Message.
    pub message: String,
    /// Resolution flag.
    pub is_resolved: bool,
    /// Resolution time.
    pub resolved_at: Option<DateTime<FixedOffset>>,
    /// Product ID.
    pub product_id: Uuid,
    /// Product summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductRef>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
}

impl AlertResponse {
    /// Builds the view, with the product summary when known.
    #[must_use]
    pub fn new(a: inventory_alerts::Model, product: Option<products::Model>) -> Self {
        Self {
            id: a.id,
            alert_type: a.alert_type.into(),
            message: a.message,
            is_resolved: a.is_resolved,
            resolved_at: a.resolved_at,
            product_id: a.product_id,
            product: product.map(ProductRef::from),
            created_at: a.created_at,
        }
    }
}

impl From<AlertLine> for AlertResponse {
    fn from(line: AlertLine) -> Self {
        Self::new(line.alert, line.product)
    }
}
