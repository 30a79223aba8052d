//! Request field helpers shared by the domain validators.
//!
//! Request payloads arrive with every field optional so that a missing field
//! surfaces as a domain validation error rather than a deserializer message.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Scale of every monetary column (`NUMERIC(19,4)`).
pub const MONEY_SCALE: u32 = 4;

/// Largest amount a `NUMERIC(19,4)` column holds.
pub const MAX_MONEY: Decimal =
    Decimal::from_parts(2_313_682_943, 2_328_306_436, 0, false, MONEY_SCALE);

/// Field-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Required field absent or blank.
    #[error("{0} is required")]
    Missing(&'static str),

    /// Monetary value below zero.
    #[error("{0} cannot be negative")]
    Negative(&'static str),

    /// Monetary value beyond what storage holds.
    #[error("{0} cannot exceed 999999999999999.9999")]
    TooLarge(&'static str),
}

/// Returns the trimmed value, rejecting absent or blank strings.
pub fn required_text(field: &'static str, value: Option<String>) -> Result<String, FieldError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(FieldError::Missing(field)),
    }
}

/// Returns the value, rejecting `None`.
pub fn required<T>(field: &'static str, value: Option<T>) -> Result<T, FieldError> {
    value.ok_or(FieldError::Missing(field))
}

/// Trims optional text, treating blank as absent.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Coerces a monetary amount to storage scale, rejecting negatives and
/// values above [`MAX_MONEY`].
pub fn money(field: &'static str, value: Decimal) -> Result<Decimal, FieldError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(FieldError::Negative(field));
    }
    let value = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if value > MAX_MONEY {
        return Err(FieldError::TooLarge(field));
    }
    Ok(value)
}

/// Required monetary amount.
pub fn required_money(field: &'static str, value: Option<Decimal>) -> Result<Decimal, FieldError> {
    money(field, required(field, value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("code", Some("  1001 ".into())).unwrap(), "1001");
    }

    #[test]
    fn test_required_text_rejects_blank() {
        assert_eq!(
            required_text("name", Some("   ".into())),
            Err(FieldError::Missing("name"))
        );
        assert_eq!(required_text("name", None), Err(FieldError::Missing("name")));
    }

    #[test]
    fn test_optional_text_drops_blank() {
        assert_eq!(optional_text(Some(String::new())), None);
        assert_eq!(optional_text(Some(" ref ".into())), Some("ref".into()));
    }

    #[test]
    fn test_money_rounds_to_storage_scale() {
        assert_eq!(money("amount", dec!(10.12345)).unwrap(), dec!(10.1235));
        assert_eq!(money("amount", dec!(0)).unwrap(), dec!(0));
    }

    #[test]
    fn test_money_rejects_negative() {
        assert_eq!(
            money("amount", dec!(-0.01)),
            Err(FieldError::Negative("amount"))
        );
    }

    #[test]
    fn test_max_money_is_fifteen_integer_digits() {
        assert_eq!(MAX_MONEY, dec!(999_999_999_999_999.9999));
    }

    #[test]
    fn test_money_accepts_storage_limit() {
        assert_eq!(money("amount", MAX_MONEY).unwrap(), MAX_MONEY);
    }

    #[test]
    fn test_money_rejects_values_beyond_storage() {
        assert_eq!(
            money("amount", dec!(10000000000000000)),
            Err(FieldError::TooLarge("amount"))
        );
        assert_eq!(
            money("amount", dec!(999_999_999_999_999.99995)),
            Err(FieldError::TooLarge("amount"))
        );
    }

    #[test]
    fn test_required_money_reports_missing_first() {
        assert_eq!(
            required_money("total", None),
            Err(FieldError::Missing("total"))
        );
    }
}
