//! Invoice input and status rules.
//!
//! An invoice is stored together with the ledger transactions it produces.
//! This module validates the whole bundle up front so the database layer
//! only has to check references and write atomically.

pub mod error;
pub mod types;


pub use error::InvoiceError;
pub use types::{InvoiceStatus, NewInvoice, NewInvoiceLine, ValidInvoice};
