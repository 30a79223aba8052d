//! Stock alert evaluation.
//!
//! Alerts are opened reactively after a movement. An alert of a given type
//! is never duplicated while one is still unresolved, and nothing here ever
//! resolves an alert: that only happens on explicit request.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::stock::StockThresholds;

/// Kind of stock alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Stock at or below the minimum.
    LowStock,
    /// Stock above the maximum.
    OverStock,
}

impl AlertType {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowStock => "LOW_STOCK",
            Self::OverStock => "OVER_STOCK",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert that should be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertCandidate {
    /// Alert kind.
    pub alert_type: AlertType,
    /// Human-readable message.
    pub message: String,
}

/// Decides which alerts to open for a product after its stock changed.
///
/// `open` lists the alert types that already have an unresolved alert for
/// the product.
#[must_use]
pub fn evaluate_alerts(
    product_name: &str,
    stock: i64,
    thresholds: StockThresholds,
    open: &[AlertType],
) -> Vec<AlertCandidate> {
    let mut candidates = Vec::new();

    if thresholds.is_low(stock) && !open.contains(&AlertType::LowStock) {
        candidates.push(AlertCandidate {
            alert_type: AlertType::LowStock,
            message: format!(
                "Low stock for {product_name}. Current stock: {stock}, minimum: {}",
                thresholds.min_stock
            ),
        });
    }

    if let Some(max) = thresholds.max_stock
        && stock > max
        && !open.contains(&AlertType::OverStock)
    {
        candidates.push(AlertCandidate {
            alert_type: AlertType::OverStock,
            message: format!(
                "Overstock for {product_name}. Current stock: {stock}, maximum: {max}"
            ),
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::stock::{MovementType, current_stock};

    fn thresholds(min_stock: i64, max_stock: Option<i64>) -> StockThresholds {
        StockThresholds {
            min_stock,
            max_stock,
        }
    }

    #[test]
    fn test_low_stock_after_in_10_out_8() {
        let stock = current_stock([(MovementType::In, 10), (MovementType::Out, 8)]);
        let alerts = evaluate_alerts("Widget", stock, thresholds(5, None), &[]);

        assert_eq!(
            alerts,
            vec![AlertCandidate {
                alert_type: AlertType::LowStock,
                message: "Low stock for Widget. Current stock: 2, minimum: 5".to_string(),
            }]
        );
    }

    #[test]
    fn test_open_low_stock_alert_is_not_duplicated() {
        let alerts = evaluate_alerts("Widget", 1, thresholds(5, None), &[AlertType::LowStock]);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_over_stock() {
        let alerts = evaluate_alerts("Bolt", 120, thresholds(10, Some(100)), &[]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::OverStock);
        assert_eq!(
            alerts[0].message,
            "Overstock for Bolt. Current stock: 120, maximum: 100"
        );
    }

    #[test]
    fn test_open_low_alert_does_not_block_over_alert() {
        let alerts = evaluate_alerts("Bolt", 120, thresholds(10, Some(100)), &[AlertType::LowStock]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::OverStock);
    }

    #[test]
    fn test_in_range_opens_nothing() {
        assert!(evaluate_alerts("Nut", 50, thresholds(10, Some(100)), &[]).is_empty());
    }

    #[test]
    fn test_without_max_never_over() {
        assert!(evaluate_alerts("Nut", i64::MAX, thresholds(10, None), &[]).is_empty());
    }
}
