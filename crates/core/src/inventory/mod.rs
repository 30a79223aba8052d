//! Inventory stock projection.
//!
//! Stock is never stored: it is the fold of a product's movement log.
//! Alerts are derived from that fold and the product's thresholds.

pub mod alert;
pub mod error;
pub mod stock;
pub mod validation;

#[cfg(test)]
mod stock_props;

pub use alert::{AlertCandidate, AlertType, evaluate_alerts};
pub use error::InventoryError;
pub use stock::{MovementType, StockStatus, StockThresholds, current_stock, stock_value};
pub use validation::{
    CategoryChanges, NewCategory, NewMovement, NewProduct, NewSupplier, ProductChanges,
    SupplierChanges, ValidCategory, ValidCategoryChanges, ValidMovement, ValidProduct,
    ValidProductChanges, ValidSupplier, ValidSupplierChanges,
};
