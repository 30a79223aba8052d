//! Property-based tests for the stock fold and alert evaluation.

use proptest::prelude::*;

use super::alert::{AlertType, evaluate_alerts};
use super::stock::{MovementType, StockThresholds, current_stock};

fn movement_strategy() -> impl Strategy<Value = (MovementType, i64)> {
    (
        prop_oneof![Just(MovementType::In), Just(MovementType::Out)],
        1i64..10_000,
    )
}

fn log_strategy() -> impl Strategy<Value = Vec<(MovementType, i64)>> {
    prop::collection::vec(movement_strategy(), 0..50)
}

fn thresholds_strategy() -> impl Strategy<Value = StockThresholds> {
    (0i64..500, prop::option::of(0i64..1_000)).prop_map(|(min_stock, max)| StockThresholds {
        min_stock,
        max_stock: max.map(|m| m.max(min_stock)),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Stock is received minus issued.
    #[test]
    fn prop_stock_is_in_minus_out(log in log_strategy()) {
        let received: i64 = log.iter().filter(|(t, _)| *t == MovementType::In).map(|(_, q)| q).sum();
        let issued: i64 = log.iter().filter(|(t, _)| *t == MovementType::Out).map(|(_, q)| q).sum();

        prop_assert_eq!(current_stock(log), received - issued);
    }

    /// Replaying the log in any order gives the same stock.
    #[test]
    fn prop_stock_is_order_independent(
        (log, shuffled) in log_strategy().prop_flat_map(|l| (Just(l.clone()), Just(l).prop_shuffle())),
    ) {
        prop_assert_eq!(current_stock(log), current_stock(shuffled));
    }

    /// A low stock alert is proposed exactly when stock is at or below the
    /// minimum and no low stock alert is open.
    #[test]
    fn prop_low_alert_matches_threshold(
        stock in -100i64..1_500,
        thresholds in thresholds_strategy(),
        already_open in any::<bool>(),
    ) {
        let open = if already_open { vec![AlertType::LowStock] } else { Vec::new() };
        let alerts = evaluate_alerts("P", stock, thresholds, &open);
        let proposes_low = alerts.iter().any(|a| a.alert_type == AlertType::LowStock);

        prop_assert_eq!(proposes_low, stock <= thresholds.min_stock && !already_open);
    }

    /// Never more than one alert of each type per evaluation.
    #[test]
    fn prop_at_most_one_alert_per_type(
        stock in -100i64..1_500,
        thresholds in thresholds_strategy(),
    ) {
        let alerts = evaluate_alerts("P", stock, thresholds, &[]);
        for kind in [AlertType::LowStock, AlertType::OverStock] {
            prop_assert!(alerts.iter().filter(|a| a.alert_type == kind).count() <= 1);
        }
    }
}
