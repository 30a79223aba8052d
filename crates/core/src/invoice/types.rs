//! Invoice domain types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::InvoiceError;
use crate::fields::{optional_text, required, required_money, required_text};
use crate::ledger::{NewTransaction, ValidTransaction};

/// Invoice lifecycle status.
///
/// Any status may overwrite any other; no transition rules are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    /// Created, not yet sent.
    Draft,
    /// Sent to the client.
    Issued,
    /// Settled.
    Paid,
    /// Voided.
    Cancelled,
}

impl InvoiceStatus {
    /// All statuses.
    pub const ALL: [Self; 4] = [Self::Draft, Self::Issued, Self::Paid, Self::Cancelled];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Issued => "ISSUED",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvoiceError::InvalidStatus(s.to_string()))
    }
}

/// Raw transaction line attached to an invoice.
#[derive(Debug, Clone, Default)]
pub struct NewInvoiceLine {
    /// Description.
    pub description: Option<String>,
    /// Amount.
    pub amount: Option<Decimal>,
    /// DEBIT or CREDIT.
    pub entry_type: Option<String>,
    /// Target account.
    pub account_id: Option<Uuid>,
    /// External reference.
    pub reference: Option<String>,
    /// Booking date override. Defaults to the invoice date.
    pub date: Option<NaiveDate>,
}

/// Raw invoice payload.
#[derive(Debug, Clone, Default)]
pub struct NewInvoice {
    /// Invoice number, unique.
    pub number: Option<String>,
    /// Free-form invoice type (`SALE`, `PURCHASE`, ...).
    pub invoice_type: Option<String>,
    /// Invoice date.
    pub date: Option<NaiveDate>,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Client name.
    pub client_name: Option<String>,
    /// Client email.
    pub client_email: Option<String>,
    /// Client tax identifier.
    pub client_tax_id: Option<String>,
    /// Amount before tax.
    pub subtotal: Option<Decimal>,
    /// Tax amount.
    pub tax: Option<Decimal>,
    /// Amount due.
    pub total: Option<Decimal>,
    /// Notes.
    pub notes: Option<String>,
    /// Ledger lines to book with the invoice.
    pub lines: Vec<NewInvoiceLine>,
}

/// Checked invoice, ready to be written in one database transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInvoice {
    /// Invoice number.
    pub number: String,
    /// Invoice type.
    pub invoice_type: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Client name.
    pub client_name: String,
    /// Client email.
    pub client_email: Option<String>,
    /// Client tax identifier.
    pub client_tax_id: Option<String>,
    /// Amount before tax.
    pub subtotal: Decimal,
    /// Tax amount.
    pub tax: Decimal,
    /// Amount due.
    pub total: Decimal,
    /// Notes.
    pub notes: Option<String>,
    /// Every new invoice starts as a draft.
    pub status: InvoiceStatus,
    /// Ledger lines, each with its booking date resolved.
    pub lines: Vec<ValidTransaction>,
}

impl NewInvoice {
    /// Validates the header and every line.
    ///
    /// Lines inherit the invoice date unless they carry their own.
    pub fn validate(self) -> Result<ValidInvoice, InvoiceError> {
        let number = required_text("number", self.number)?;
        let invoice_type = required_text("type", self.invoice_type)?;
        let date = required("date", self.date)?;
        let client_name = required_text("clientName", self.client_name)?;
        let subtotal = required_money("subtotal", self.subtotal)?;
        let tax = required_money("tax", self.tax)?;
        let total = required_money("total", self.total)?;

        let lines = self
            .lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                NewTransaction {
                    date: Some(line.date.unwrap_or(date)),
                    description: line.description,
                    amount: line.amount,
                    entry_type: line.entry_type,
                    account_id: line.account_id,
                    reference: line.reference,
                }
                .validate()
                .map_err(|source| InvoiceError::Line { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidInvoice {
            number,
            invoice_type,
            date,
            due_date: self.due_date,
            client_name,
            client_email: optional_text(self.client_email),
            client_tax_id: optional_text(self.client_tax_id),
            subtotal,
            tax,
            total,
            notes: optional_text(self.notes),
            status: InvoiceStatus::Draft,
            lines,
        })
    }
}

impl ValidInvoice {
    /// Distinct accounts referenced by the lines, in first-seen order.
    #[must_use]
    pub fn referenced_accounts(&self) -> Vec<Uuid> {
        let mut seen = Vec::new();
        for line in &self.lines {
            if !seen.contains(&line.account_id) {
                seen.push(line.account_id);
            }
        }
        seen
    }
}
