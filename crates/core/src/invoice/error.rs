//! Invoice error types.

use kontor_shared::AppError;
use thiserror::Error;

use crate::fields::FieldError;
use crate::ledger::LedgerError;

/// Errors raised while validating invoice input.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Invoice header field missing or out of range.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// One of the transaction lines is invalid.
    #[error("Line {index}: {source}")]
    Line {
        /// Zero-based line position.
        index: usize,
        /// Underlying ledger error.
        source: LedgerError,
    },

    /// Unknown invoice status.
    #[error("Invalid invoice status '{0}'. Must be one of: DRAFT, ISSUED, PAID, CANCELLED")]
    InvalidStatus(String),
}

impl From<InvoiceError> for AppError {
    fn from(e: InvoiceError) -> Self {
        Self::Validation(e.to_string())
    }
}
