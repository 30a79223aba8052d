//! Input validation for accounts and ledger transactions.
//!
//! Raw payloads (`New*`) are turned into checked values (`Valid*`) before any
//! database access happens.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::account::AccountType;
use super::entry::EntryType;
use super::error::LedgerError;
use crate::fields::{optional_text, required, required_money, required_text};

/// Raw account creation payload.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    /// Account code.
    pub code: Option<String>,
    /// Account name.
    pub name: Option<String>,
    /// Account type as sent by the client.
    pub account_type: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

/// Checked account creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAccount {
    /// Account code, unique across the chart.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Description.
    pub description: Option<String>,
}

impl NewAccount {
    /// Checks required fields and parses the account type.
    pub fn validate(self) -> Result<ValidAccount, LedgerError> {
        let code = required_text("code", self.code)?;
        let name = required_text("name", self.name)?;
        let account_type = required_text("type", self.account_type)?.parse()?;

        Ok(ValidAccount {
            code,
            name,
            account_type,
            description: optional_text(self.description),
        })
    }
}

/// Raw account update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    /// New code.
    pub code: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New type.
    pub account_type: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Activation flag.
    pub is_active: Option<bool>,
}

/// Checked account update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidAccountChanges {
    /// New code.
    pub code: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New type.
    pub account_type: Option<AccountType>,
    /// New description.
    pub description: Option<String>,
    /// Activation flag.
    pub is_active: Option<bool>,
}

impl AccountChanges {
    /// Rejects blank replacements and unknown types.
    pub fn validate(self) -> Result<ValidAccountChanges, LedgerError> {
        let code = self
            .code
            .map(|c| required_text("code", Some(c)))
            .transpose()?;
        let name = self
            .name
            .map(|n| required_text("name", Some(n)))
            .transpose()?;
        let account_type = self
            .account_type
            .map(|t| t.parse::<AccountType>())
            .transpose()?;

        Ok(ValidAccountChanges {
            code,
            name,
            account_type,
            description: optional_text(self.description),
            is_active: self.is_active,
        })
    }
}

/// Raw ledger transaction payload.
#[derive(Debug, Clone, Default)]
pub struct NewTransaction {
    /// Booking date.
    pub date: Option<NaiveDate>,
    /// Description.
    pub description: Option<String>,
    /// Amount.
    pub amount: Option<Decimal>,
    /// DEBIT or CREDIT.
    pub entry_type: Option<String>,
    /// Target account.
    pub account_id: Option<Uuid>,
    /// External reference.
    pub reference: Option<String>,
}

/// Checked ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTransaction {
    /// Booking date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Non-negative amount at storage scale.
    pub amount: Decimal,
    /// Direction.
    pub entry_type: EntryType,
    /// Target account.
    pub account_id: Uuid,
    /// External reference.
    pub reference: Option<String>,
}

impl NewTransaction {
    /// Checks required fields and coerces the amount.
    pub fn validate(self) -> Result<ValidTransaction, LedgerError> {
        let date = required("date", self.date)?;
        let description = required_text("description", self.description)?;
        let amount = required_money("amount", self.amount)?;
        let entry_type = required_text("type", self.entry_type)?.parse()?;
        let account_id = required("accountId", self.account_id)?;

        Ok(ValidTransaction {
            date,
            description,
            amount,
            entry_type,
            account_id,
            reference: optional_text(self.reference),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldError;
    use rust_decimal_macros::dec;

    fn sample_transaction() -> NewTransaction {
        NewTransaction {
            date: NaiveDate::from_ymd_opt(2025, 3, 14),
            description: Some("Office rent".into()),
            amount: Some(dec!(1200.5)),
            entry_type: Some("debit".into()),
            account_id: Some(Uuid::new_v4()),
            reference: Some("  ".into()),
        }
    }

    #[test]
    fn test_valid_account() {
        let account = NewAccount {
            code: Some("1001".into()),
            name: Some("Cash".into()),
            account_type: Some("ASSET".into()),
            description: None,
        }
        .validate()
        .unwrap();

        assert_eq!(account.code, "1001");
        assert_eq!(account.account_type, AccountType::Asset);
    }

    #[test]
    fn test_account_requires_code() {
        let result = NewAccount {
            code: None,
            name: Some("Cash".into()),
            account_type: Some("ASSET".into()),
            description: None,
        }
        .validate();

        assert!(matches!(
            result,
            Err(LedgerError::Field(FieldError::Missing("code")))
        ));
    }

    #[test]
    fn test_account_rejects_unknown_type() {
        let result = NewAccount {
            code: Some("9".into()),
            name: Some("Misc".into()),
            account_type: Some("OTHER".into()),
            description: None,
        }
        .validate();

        assert!(matches!(result, Err(LedgerError::InvalidAccountType(_))));
    }

    #[test]
    fn test_account_changes_reject_blank_code() {
        let result = AccountChanges {
            code: Some(" ".into()),
            ..AccountChanges::default()
        }
        .validate();

        assert!(matches!(
            result,
            Err(LedgerError::Field(FieldError::Missing("code")))
        ));
    }

    #[test]
    fn test_account_changes_deactivate_only() {
        let changes = AccountChanges {
            is_active: Some(false),
            ..AccountChanges::default()
        }
        .validate()
        .unwrap();

        assert_eq!(changes.is_active, Some(false));
        assert_eq!(changes.code, None);
    }

    #[test]
    fn test_valid_transaction() {
        let tx = sample_transaction().validate().unwrap();
        assert_eq!(tx.entry_type, EntryType::Debit);
        assert_eq!(tx.amount, dec!(1200.5));
        assert_eq!(tx.reference, None);
    }

    #[test]
    fn test_transaction_rejects_negative_amount() {
        let result = NewTransaction {
            amount: Some(dec!(-5)),
            ..sample_transaction()
        }
        .validate();

        assert!(matches!(
            result,
            Err(LedgerError::Field(FieldError::Negative("amount")))
        ));
    }

    #[test]
    fn test_transaction_rejects_amount_beyond_storage() {
        let result = NewTransaction {
            amount: Some(dec!(10000000000000000)),
            ..sample_transaction()
        }
        .validate();

        assert!(matches!(
            result,
            Err(LedgerError::Field(FieldError::TooLarge("amount")))
        ));
    }

    #[test]
    fn test_transaction_requires_account() {
        let result = NewTransaction {
            account_id: None,
            ..sample_transaction()
        }
        .validate();

        assert!(matches!(
            result,
            Err(LedgerError::Field(FieldError::Missing("accountId")))
        ));
    }

    #[test]
    fn test_transaction_rejects_unknown_type() {
        let result = NewTransaction {
            entry_type: Some("TRANSFER".into()),
            ..sample_transaction()
        }
        .validate();

        assert!(matches!(result, Err(LedgerError::InvalidEntryType(_))));
    }
}
