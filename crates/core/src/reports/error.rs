//! Report error types.

use chrono::NaiveDate;
use kontor_shared::AppError;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        Self::Validation(e.to_string())
    }
}
