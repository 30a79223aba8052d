//! Account ledger logic.
//!
//! This module implements the ledger consistency model:
//! - Account types (chart of accounts classification)
//! - Entry types (debit/credit) and their sign convention
//! - Balance folding over the append-only transaction log
//! - Input validation for accounts and transactions
//! - Error types for ledger operations

pub mod account;
pub mod balance;
pub mod entry;
pub mod error;
pub mod validation;

#[cfg(test)]
mod balance_props;

pub use account::AccountType;
pub use balance::{AccountBalance, balance};
pub use entry::EntryType;
pub use error::LedgerError;
pub use validation::{
    AccountChanges, NewAccount, NewTransaction, ValidAccount, ValidAccountChanges, ValidTransaction,
};
