//! Ledger error types.

use kontor_shared::AppError;
use thiserror::Error;

use crate::fields::FieldError;

/// Errors raised while validating ledger input.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required field is missing or a value is out of range.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Unknown account type.
    #[error("Invalid account type '{0}'. Must be one of: ASSET, LIABILITY, EQUITY, INCOME, EXPENSE")]
    InvalidAccountType(String),

    /// Unknown entry type.
    #[error("Invalid transaction type '{0}'. Must be DEBIT or CREDIT")]
    InvalidEntryType(String),
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        Self::Validation(e.to_string())
    }
}
