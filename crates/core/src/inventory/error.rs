//! Inventory error types.

use kontor_shared::AppError;
use thiserror::Error;

use crate::fields::FieldError;

/// Errors raised while validating inventory input.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// A required field is missing or a value is out of range.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Unknown movement type.
    #[error("Invalid movement type '{0}'. Must be IN or OUT")]
    InvalidMovementType(String),

    /// Movement quantity outside `1..=i32::MAX`.
    #[error("quantity must be a positive whole number, got {0}")]
    InvalidQuantity(i64),

    /// Threshold below zero.
    #[error("{0} cannot be negative")]
    NegativeThreshold(&'static str),

    /// Maximum below minimum.
    #[error("maxStock ({max}) cannot be lower than minStock ({min})")]
    InvertedThresholds {
        /// Minimum stock.
        min: i64,
        /// Maximum stock.
        max: i64,
    },
}

impl From<InventoryError> for AppError {
    fn from(e: InventoryError) -> Self {
        Self::Validation(e.to_string())
    }
}
