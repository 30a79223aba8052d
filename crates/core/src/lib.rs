//! Core business logic for Kontor.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and folds live here.
//!
//! # Modules
//!
//! - `ledger` - Accounts, ledger entries and the balance fold
//! - `invoice` - Invoice validation and line expansion
//! - `inventory` - Stock fold, thresholds and alert evaluation
//! - `reports` - Income statement, balance sheet and stock reports
//! - `auth` - Password hashing and capability policy

pub mod auth;
pub mod fields;
pub mod inventory;
pub mod invoice;
pub mod ledger;
pub mod reports;
