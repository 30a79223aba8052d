//! Input validation for the product catalog and stock movements.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::InventoryError;
use super::stock::{MovementType, StockThresholds};
use crate::fields::{money, optional_text, required, required_money, required_text};

/// Raw category payload, used for both create and update.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    /// Category name, unique.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// Checked category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCategory {
    /// Category name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
}

impl NewCategory {
    /// Requires a non-blank name.
    pub fn validate(self) -> Result<ValidCategory, InventoryError> {
        Ok(ValidCategory {
            name: required_text("name", self.name)?,
            description: optional_text(self.description),
        })
    }
}

/// Raw supplier payload.
#[derive(Debug, Clone, Default)]
pub struct NewSupplier {
    /// Supplier name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Tax identifier.
    pub tax_id: Option<String>,
}

/// Checked supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSupplier {
    /// Supplier name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Tax identifier.
    pub tax_id: Option<String>,
}

impl NewSupplier {
    /// Requires a non-blank name.
    pub fn validate(self) -> Result<ValidSupplier, InventoryError> {
        Ok(ValidSupplier {
            name: required_text("name", self.name)?,
            email: optional_text(self.email),
            phone: optional_text(self.phone),
            address: optional_text(self.address),
            tax_id: optional_text(self.tax_id),
        })
    }
}

/// Raw category update payload.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Activation flag.
    pub is_active: Option<bool>,
}

/// Checked category update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidCategoryChanges {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Activation flag.
    pub is_active: Option<bool>,
}

impl CategoryChanges {
    /// Rejects a blank name.
    pub fn validate(self) -> Result<ValidCategoryChanges, InventoryError> {
        Ok(ValidCategoryChanges {
            name: self
                .name
                .map(|n| required_text("name", Some(n)))
                .transpose()?,
            description: optional_text(self.description),
            is_active: self.is_active,
        })
    }
}

/// Raw supplier update payload.
#[derive(Debug, Clone, Default)]
pub struct SupplierChanges {
    /// New name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New tax identifier.
    pub tax_id: Option<String>,
    /// Activation flag.
    pub is_active: Option<bool>,
}

/// Checked supplier update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidSupplierChanges {
    /// New name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New tax identifier.
    pub tax_id: Option<String>,
    /// Activation flag.
    pub is_active: Option<bool>,
}

impl SupplierChanges {
    /// Rejects a blank name.
    pub fn validate(self) -> Result<ValidSupplierChanges, InventoryError> {
        Ok(ValidSupplierChanges {
            name: self
                .name
                .map(|n| required_text("name", Some(n)))
                .transpose()?,
            email: optional_text(self.email),
            phone: optional_text(self.phone),
            address: optional_text(self.address),
            tax_id: optional_text(self.tax_id),
            is_active: self.is_active,
        })
    }
}

/// Raw product creation payload.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    /// Stock keeping unit, unique.
    pub sku: Option<String>,
    /// Product name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Sale price.
    pub price: Option<Decimal>,
    /// Unit cost.
    pub cost: Option<Decimal>,
    /// Owning category.
    pub category_id: Option<Uuid>,
    /// Preferred supplier.
    pub supplier_id: Option<Uuid>,
    /// Minimum stock, defaults to 0.
    pub min_stock: Option<i64>,
    /// Maximum stock.
    pub max_stock: Option<i64>,
}

/// Checked product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    /// Stock keeping unit.
    pub sku: String,
    /// Product name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Sale price.
    pub price: Decimal,
    /// Unit cost.
    pub cost: Decimal,
    /// Owning category.
    pub category_id: Uuid,
    /// Preferred supplier.
    pub supplier_id: Option<Uuid>,
    /// Stock thresholds.
    pub thresholds: StockThresholds,
}

impl NewProduct {
    /// Checks required fields, prices and thresholds.
    pub fn validate(self) -> Result<ValidProduct, InventoryError> {
        let sku = required_text("sku", self.sku)?;
        let name = required_text("name", self.name)?;
        let price = required_money("price", self.price)?;
        let cost = required_money("cost", self.cost)?;
        let category_id = required("categoryId", self.category_id)?;
        let thresholds = check_thresholds(self.min_stock.unwrap_or(0), self.max_stock)?;

        Ok(ValidProduct {
            sku,
            name,
            description: optional_text(self.description),
            price,
            cost,
            category_id,
            supplier_id: self.supplier_id,
            thresholds,
        })
    }
}

/// Raw product update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    /// New SKU.
    pub sku: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New price.
    pub price: Option<Decimal>,
    /// New cost.
    pub cost: Option<Decimal>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New supplier; `Some(None)` detaches the supplier.
    pub supplier_id: Option<Option<Uuid>>,
    /// New minimum stock.
    pub min_stock: Option<i64>,
    /// New maximum stock; `Some(None)` clears it.
    pub max_stock: Option<Option<i64>>,
    /// Activation flag.
    pub is_active: Option<bool>,
}

/// Checked product update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidProductChanges {
    /// New SKU.
    pub sku: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New price.
    pub price: Option<Decimal>,
    /// New cost.
    pub cost: Option<Decimal>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New supplier.
    pub supplier_id: Option<Option<Uuid>>,
    /// New minimum stock.
    pub min_stock: Option<i64>,
    /// New maximum stock.
    pub max_stock: Option<Option<i64>>,
    /// Activation flag.
    pub is_active: Option<bool>,
}

impl ProductChanges {
    /// Rejects blank replacements and negative prices.
    ///
    /// Thresholds are checked against the stored product with
    /// [`ValidProductChanges::merge_thresholds`].
    pub fn validate(self) -> Result<ValidProductChanges, InventoryError> {
        let sku = self.sku.map(|s| required_text("sku", Some(s))).transpose()?;
        let name = self
            .name
            .map(|n| required_text("name", Some(n)))
            .transpose()?;
        let price = self.price.map(|p| money("price", p)).transpose()?;
        let cost = self.cost.map(|c| money("cost", c)).transpose()?;

        Ok(ValidProductChanges {
            sku,
            name,
            description: optional_text(self.description),
            price,
            cost,
            category_id: self.category_id,
            supplier_id: self.supplier_id,
            min_stock: self.min_stock,
            max_stock: self.max_stock,
            is_active: self.is_active,
        })
    }
}

impl ValidProductChanges {
    /// Applies threshold changes on top of `current` and checks the result.
    pub fn merge_thresholds(
        &self,
        current: StockThresholds,
    ) -> Result<StockThresholds, InventoryError> {
        check_thresholds(
            self.min_stock.unwrap_or(current.min_stock),
            self.max_stock.unwrap_or(current.max_stock),
        )
    }
}

fn check_thresholds(min: i64, max: Option<i64>) -> Result<StockThresholds, InventoryError> {
    if min < 0 {
        return Err(InventoryError::NegativeThreshold("minStock"));
    }
    if let Some(max) = max {
        if max < 0 {
            return Err(InventoryError::NegativeThreshold("maxStock"));
        }
        if max < min {
            return Err(InventoryError::InvertedThresholds { min, max });
        }
    }
    Ok(StockThresholds {
        min_stock: min,
        max_stock: max,
    })
}

/// Raw stock movement payload.
#[derive(Debug, Clone, Default)]
pub struct NewMovement {
    /// IN or OUT.
    pub movement_type: Option<String>,
    /// Units moved.
    pub quantity: Option<i64>,
    /// Why the stock moved.
    pub reason: Option<String>,
    /// Product moved.
    pub product_id: Option<Uuid>,
    /// External reference (delivery note, order, ...).
    pub reference: Option<String>,
}

/// Checked stock movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMovement {
    /// Direction.
    pub movement_type: MovementType,
    /// Units moved, always positive.
    pub quantity: i32,
    /// Reason.
    pub reason: String,
    /// Product moved.
    pub product_id: Uuid,
    /// External reference.
    pub reference: Option<String>,
}

impl NewMovement {
    /// Checks required fields and that the quantity is positive.
    pub fn validate(self) -> Result<ValidMovement, InventoryError> {
        let movement_type = required_text("type", self.movement_type)?.parse()?;
        let quantity = required("quantity", self.quantity)?;
        let quantity = i32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(InventoryError::InvalidQuantity(quantity))?;
        let reason = required_text("reason", self.reason)?;
        let product_id = required("productId", self.product_id)?;

        Ok(ValidMovement {
            movement_type,
            quantity,
            reason,
            product_id,
            reference: optional_text(self.reference),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldError;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn widget() -> NewProduct {
        NewProduct {
            sku: Some("WID-001".into()),
            name: Some("Widget".into()),
            description: None,
            price: Some(dec!(9.99)),
            cost: Some(dec!(4.5)),
            category_id: Some(Uuid::new_v4()),
            supplier_id: None,
            min_stock: None,
            max_stock: None,
        }
    }

    fn movement(quantity: i64) -> NewMovement {
        NewMovement {
            movement_type: Some("OUT".into()),
            quantity: Some(quantity),
            reason: Some("Sale".into()),
            product_id: Some(Uuid::new_v4()),
            reference: None,
        }
    }

    #[test]
    fn test_min_stock_defaults_to_zero() {
        let product = widget().validate().unwrap();
        assert_eq!(product.thresholds, StockThresholds::default());
    }

    #[test]
    fn test_product_requires_category() {
        let result = NewProduct {
            category_id: None,
            ..widget()
        }
        .validate();
        assert!(matches!(
            result,
            Err(InventoryError::Field(FieldError::Missing("categoryId")))
        ));
    }

    #[test]
    fn test_product_rejects_inverted_thresholds() {
        let result = NewProduct {
            min_stock: Some(10),
            max_stock: Some(5),
            ..widget()
        }
        .validate();
        assert!(matches!(
            result,
            Err(InventoryError::InvertedThresholds { min: 10, max: 5 })
        ));
    }

    #[test]
    fn test_product_rejects_negative_cost() {
        let result = NewProduct {
            cost: Some(dec!(-1)),
            ..widget()
        }
        .validate();
        assert!(matches!(
            result,
            Err(InventoryError::Field(FieldError::Negative("cost")))
        ));
    }

    #[test]
    fn test_product_prices_bounded_by_storage() {
        let price = NewProduct {
            price: Some(dec!(10000000000000000)),
            ..widget()
        }
        .validate();
        assert!(matches!(
            price,
            Err(InventoryError::Field(FieldError::TooLarge("price")))
        ));

        let cost = ProductChanges {
            cost: Some(dec!(10000000000000000)),
            ..ProductChanges::default()
        }
        .validate();
        assert!(matches!(
            cost,
            Err(InventoryError::Field(FieldError::TooLarge("cost")))
        ));
    }

    #[test]
    fn test_changes_merge_thresholds() {
        let changes = ProductChanges {
            max_stock: Some(Some(50)),
            ..ProductChanges::default()
        }
        .validate()
        .unwrap();

        let merged = changes
            .merge_thresholds(StockThresholds {
                min_stock: 5,
                max_stock: None,
            })
            .unwrap();
        assert_eq!(merged.min_stock, 5);
        assert_eq!(merged.max_stock, Some(50));
    }

    #[test]
    fn test_changes_can_clear_max() {
        let changes = ProductChanges {
            max_stock: Some(None),
            ..ProductChanges::default()
        }
        .validate()
        .unwrap();

        let merged = changes
            .merge_thresholds(StockThresholds {
                min_stock: 5,
                max_stock: Some(10),
            })
            .unwrap();
        assert_eq!(merged.max_stock, None);
    }

    #[test]
    fn test_changes_reject_min_above_stored_max() {
        let changes = ProductChanges {
            min_stock: Some(20),
            ..ProductChanges::default()
        }
        .validate()
        .unwrap();

        assert!(
            changes
                .merge_thresholds(StockThresholds {
                    min_stock: 5,
                    max_stock: Some(10),
                })
                .is_err()
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    #[case(i64::from(i32::MAX) + 1)]
    fn test_movement_rejects_bad_quantity(#[case] quantity: i64) {
        assert!(matches!(
            movement(quantity).validate(),
            Err(InventoryError::InvalidQuantity(q)) if q == quantity
        ));
    }

    #[test]
    fn test_valid_movement() {
        let m = movement(8).validate().unwrap();
        assert_eq!(m.movement_type, MovementType::Out);
        assert_eq!(m.quantity, 8);
    }

    #[test]
    fn test_movement_requires_reason() {
        let result = NewMovement {
            reason: None,
            ..movement(1)
        }
        .validate();
        assert!(matches!(
            result,
            Err(InventoryError::Field(FieldError::Missing("reason")))
        ));
    }

    #[test]
    fn test_supplier_requires_name() {
        assert!(NewSupplier::default().validate().is_err());
        let supplier = NewSupplier {
            name: Some("Acme".into()),
            email: Some("".into()),
            ..NewSupplier::default()
        }
        .validate()
        .unwrap();
        assert_eq!(supplier.email, None);
    }

    #[test]
    fn test_blank_rename_rejected() {
        let result = CategoryChanges {
            name: Some(" ".into()),
            ..CategoryChanges::default()
        }
        .validate();
        assert!(result.is_err());
        assert!(
            SupplierChanges {
                is_active: Some(false),
                ..SupplierChanges::default()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_category_requires_name() {
        assert!(NewCategory::default().validate().is_err());
    }
}
