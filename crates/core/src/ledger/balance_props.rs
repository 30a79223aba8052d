//! Property-based tests for the balance fold.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{AccountBalance, balance};
use super::entry::EntryType;

/// Non-negative amounts with four decimal places, up to 10 million.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000_000i64).prop_map(|units| Decimal::new(units, 4))
}

fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)]
}

fn history_strategy(max_len: usize) -> impl Strategy<Value = Vec<(EntryType, Decimal)>> {
    prop::collection::vec((entry_type_strategy(), amount_strategy()), 0..=max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The fold equals the signed sum: debits positive, credits negative.
    #[test]
    fn prop_balance_is_signed_sum(history in history_strategy(40)) {
        let expected: Decimal = history
            .iter()
            .map(|(entry_type, amount)| entry_type.signed(*amount))
            .sum();

        prop_assert_eq!(balance(history), expected);
    }

    /// Any permutation of the history yields the same balance.
    #[test]
    fn prop_balance_is_order_independent(
        (history, shuffled) in history_strategy(40)
            .prop_flat_map(|h| (Just(h.clone()), Just(h).prop_shuffle())),
    ) {
        prop_assert_eq!(balance(history), balance(shuffled));
    }

    /// Folding two halves separately and merging matches folding the whole.
    #[test]
    fn prop_balance_splits_over_concatenation(
        left in history_strategy(20),
        right in history_strategy(20),
    ) {
        let mut whole = left.clone();
        whole.extend(right.iter().copied());

        let mut totals: AccountBalance = left.into_iter().collect();
        totals.extend(right);

        prop_assert_eq!(totals.balance(), balance(whole));
    }

    /// Debit and credit totals never go negative for valid amounts.
    #[test]
    fn prop_totals_are_non_negative(history in history_strategy(40)) {
        let totals: AccountBalance = history.into_iter().collect();
        prop_assert!(totals.debit_total >= Decimal::ZERO);
        prop_assert!(totals.credit_total >= Decimal::ZERO);
    }
}
