//! Account balance folding.
//!
//! Balances are never stored. Every read folds the account's full
//! transaction history (or the slice up to an as-of date) with the same
//! convention: `balance = Σ debit − Σ credit`, for every account type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::EntryType;

/// Running debit/credit totals for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
}

impl AccountBalance {
    /// Adds one transaction to the totals.
    pub fn add(&mut self, entry_type: EntryType, amount: Decimal) {
        match entry_type {
            EntryType::Debit => self.debit_total += amount,
            EntryType::Credit => self.credit_total += amount,
        }
    }

    /// Net balance.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.debit_total - self.credit_total
    }
}

impl Extend<(EntryType, Decimal)> for AccountBalance {
    fn extend<I: IntoIterator<Item = (EntryType, Decimal)>>(&mut self, iter: I) {
        for (entry_type, amount) in iter {
            self.add(entry_type, amount);
        }
    }
}

impl FromIterator<(EntryType, Decimal)> for AccountBalance {
    fn from_iter<I: IntoIterator<Item = (EntryType, Decimal)>>(iter: I) -> Self {
        let mut totals = Self::default();
        totals.extend(iter);
        totals
    }
}

/// Folds a transaction history into a balance.
///
/// Order does not matter.
pub fn balance<I>(entries: I) -> Decimal
where
    I: IntoIterator<Item = (EntryType, Decimal)>,
{
    entries.into_iter().collect::<AccountBalance>().balance()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_asset_account_debit_then_credit() {
        // Account 1001 (ASSET): DEBIT 100, CREDIT 30
        let history = [(EntryType::Debit, dec!(100)), (EntryType::Credit, dec!(30))];
        assert_eq!(balance(history), dec!(70));
    }

    #[test]
    fn test_empty_history_is_zero() {
        assert_eq!(balance(std::iter::empty()), Decimal::ZERO);
    }

    #[test]
    fn test_credit_heavy_account_goes_negative() {
        // Same convention for income/liability accounts: no sign flip.
        let history = [(EntryType::Credit, dec!(500.25)), (EntryType::Debit, dec!(0.25))];
        assert_eq!(balance(history), dec!(-500.00));
    }

    #[test]
    fn test_totals_are_tracked_separately() {
        let totals: AccountBalance = [
            (EntryType::Debit, dec!(10.5)),
            (EntryType::Debit, dec!(4.5)),
            (EntryType::Credit, dec!(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(totals.debit_total, dec!(15.0));
        assert_eq!(totals.credit_total, dec!(3));
        assert_eq!(totals.balance(), dec!(12.0));
    }

    #[test]
    fn test_extend_continues_fold() {
        let mut totals = AccountBalance::default();
        totals.extend([(EntryType::Debit, dec!(1))]);
        totals.extend([(EntryType::Credit, dec!(0.4))]);
        assert_eq!(totals.balance(), dec!(0.6));
    }
}
