//! Report aggregation.
//!
//! Pure folds over rows already loaded by the persistence layer:
//! - Income Statement
//! - Balance Sheet
//! - Stock levels and low stock
//! - Inventory valuation by category

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
