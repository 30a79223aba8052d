//! `SeaORM` active enums mirroring the PostgreSQL enum types.
//!
//! Each enum converts to and from its `kontor-core` counterpart so that
//! domain logic never sees a database type.

use kontor_core::{
    inventory::{AlertType as CoreAlertType, MovementType as CoreMovementType},
    invoice::InvoiceStatus as CoreInvoiceStatus,
    ledger::{AccountType as CoreAccountType, EntryType as CoreEntryType},
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "ASSET")]
    Asset,
    #[sea_orm(string_value = "LIABILITY")]
    Liability,
    #[sea_orm(string_value = "EQUITY")]
    Equity,
    #[sea_orm(string_value = "INCOME")]
    Income,
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
}

impl From<CoreAccountType> for AccountType {
    fn from(t: CoreAccountType) -> Self {
        match t {
            CoreAccountType::Asset => Self::Asset,
            CoreAccountType::Liability => Self::Liability,
            CoreAccountType::Equity => Self::Equity,
            CoreAccountType::Income => Self::Income,
            CoreAccountType::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for CoreAccountType {
    fn from(t: AccountType) -> Self {
        match t {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Income => Self::Income,
            AccountType::Expense => Self::Expense,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_type")]
pub enum EntryType {
    #[sea_orm(string_value = "DEBIT")]
    Debit,
    #[sea_orm(string_value = "CREDIT")]
    Credit,
}

impl From<CoreEntryType> for EntryType {
    fn from(t: CoreEntryType) -> Self {
        match t {
            CoreEntryType::Debit => Self::Debit,
            CoreEntryType::Credit => Self::Credit,
        }
    }
}

impl From<EntryType> for CoreEntryType {
    fn from(t: EntryType) -> Self {
        match t {
            EntryType::Debit => Self::Debit,
            EntryType::Credit => Self::Credit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "ISSUED")]
    Issued,
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl From<CoreInvoiceStatus> for InvoiceStatus {
    fn from(s: CoreInvoiceStatus) -> Self {
        match s {
            CoreInvoiceStatus::Draft => Self::Draft,
            CoreInvoiceStatus::Issued => Self::Issued,
            CoreInvoiceStatus::Paid => Self::Paid,
            CoreInvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<InvoiceStatus> for CoreInvoiceStatus {
    fn from(s: InvoiceStatus) -> Self {
        match s {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Issued => Self::Issued,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_type")]
pub enum MovementType {
    #[sea_orm(string_value = "IN")]
    In,
    #[sea_orm(string_value = "OUT")]
    Out,
}

impl From<CoreMovementType> for MovementType {
    fn from(t: CoreMovementType) -> Self {
        match t {
            CoreMovementType::In => Self::In,
            CoreMovementType::Out => Self::Out,
        }
    }
}

impl From<MovementType> for CoreMovementType {
    fn from(t: MovementType) -> Self {
        match t {
            MovementType::In => Self::In,
            MovementType::Out => Self::Out,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "alert_type")]
pub enum AlertType {
    #[sea_orm(string_value = "LOW_STOCK")]
    LowStock,
    #[sea_orm(string_value = "OVER_STOCK")]
    OverStock,
}

impl From<CoreAlertType> for AlertType {
    fn from(t: CoreAlertType) -> Self {
        match t {
            CoreAlertType::LowStock => Self::LowStock,
            CoreAlertType::OverStock => Self::OverStock,
        }
    }
}

impl From<AlertType> for CoreAlertType {
    fn from(t: AlertType) -> Self {
        match t {
            AlertType::LowStock => Self::LowStock,
            AlertType::OverStock => Self::OverStock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_db_values_match_wire_format() {
        for t in AccountType::iter() {
            assert_eq!(t.to_value(), CoreAccountType::from(t).as_str());
        }
        for t in EntryType::iter() {
            assert_eq!(t.to_value(), CoreEntryType::from(t).as_str());
        }
        for s in InvoiceStatus::iter() {
            assert_eq!(s.to_value(), CoreInvoiceStatus::from(s).as_str());
        }
        for t in MovementType::iter() {
            assert_eq!(t.to_value(), CoreMovementType::from(t).as_str());
        }
        for t in AlertType::iter() {
            assert_eq!(t.to_value(), CoreAlertType::from(t).as_str());
        }
    }
}
