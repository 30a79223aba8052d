//! Stock folding and threshold classification.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::InventoryError;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Goods received.
    In,
    /// Goods issued.
    Out,
}

impl MovementType {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }

    /// Signed contribution of `quantity` to stock.
    #[must_use]
    pub const fn signed(self, quantity: i64) -> i64 {
        match self {
            Self::In => quantity,
            Self::Out => -quantity,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            _ => Err(InventoryError::InvalidMovementType(s.to_string())),
        }
    }
}

/// Folds a movement log into current stock.
///
/// Order does not matter. Stock may go negative: issuing more than is on
/// hand is recorded, not rejected.
pub fn current_stock<I>(movements: I) -> i64
where
    I: IntoIterator<Item = (MovementType, i64)>,
{
    movements
        .into_iter()
        .map(|(movement_type, quantity)| movement_type.signed(quantity))
        .sum()
}

/// Value of `stock` units at unit `cost`.
#[must_use]
pub fn stock_value(cost: Decimal, stock: i64) -> Decimal {
    cost * Decimal::from(stock)
}

/// Product stock thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockThresholds {
    /// Stock at or below this is low.
    pub min_stock: i64,
    /// Stock above this is over, when set.
    pub max_stock: Option<i64>,
}

impl StockThresholds {
    /// True when `stock` is at or below the minimum.
    #[must_use]
    pub const fn is_low(&self, stock: i64) -> bool {
        stock <= self.min_stock
    }

    /// True when a maximum is set and `stock` exceeds it.
    #[must_use]
    pub const fn is_over(&self, stock: i64) -> bool {
        match self.max_stock {
            Some(max) => stock > max,
            None => false,
        }
    }

    /// Classifies `stock`. Low wins over over.
    #[must_use]
    pub const fn classify(&self, stock: i64) -> StockStatus {
        if self.is_low(stock) {
            StockStatus::Low
        } else if self.is_over(stock) {
            StockStatus::Over
        } else {
            StockStatus::Normal
        }
    }
}

/// Stock level relative to thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StockStatus {
    /// At or below minimum.
    Low,
    /// Within range.
    Normal,
    /// Above maximum.
    Over,
}
