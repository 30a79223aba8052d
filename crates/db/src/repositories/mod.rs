//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod alert;
pub mod category;
pub mod invoice;
pub mod movement;
pub mod product;
pub mod report;
pub mod role;
pub mod session;
pub mod supplier;
pub mod transaction;
pub mod user;

pub use account::{
    AccountDetail, AccountError, AccountFilter, AccountRepository, AccountWithBalance,
};
pub use alert::{AlertError, AlertLine, AlertRepository};
pub use category::{CategoryDetail, CategoryError, CategoryRepository, CategoryWithCount};
pub use invoice::{InvoiceError, InvoiceFilter, InvoiceRepository, InvoiceWithLines};
pub use movement::{
    MovementError, MovementFilter, MovementLine, MovementRepository, RecordedMovement,
};
pub use product::{ProductDetail, ProductError, ProductFilter, ProductRepository, ProductView};
pub use report::{AccountingDashboard, InventoryDashboard, ReportError, ReportRepository};
pub use role::{RoleError, RoleRepository};
pub use session::SessionRepository;
pub use supplier::{SupplierDetail, SupplierError, SupplierRepository, SupplierWithCount};
pub use transaction::{TransactionError, TransactionLine, TransactionRepository};
pub use user::{UserError, UserRepository, UserWithRole};

use sea_orm::{DbErr, SqlErr};

/// Maps a unique-index violation to `duplicate`; any other error converts
/// as usual.
///
/// Writes check uniqueness up front, so this only fires when a concurrent
/// writer claims the same key between the check and the write.
pub(crate) fn or_duplicate<E: From<DbErr>>(err: DbErr, duplicate: impl FnOnce() -> E) -> E {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate(),
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    enum KeyError {
        #[error("duplicate")]
        Duplicate,
        #[error(transparent)]
        Database(#[from] DbErr),
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = or_duplicate(DbErr::RecordNotInserted, || KeyError::Duplicate);
        assert!(matches!(err, KeyError::Database(DbErr::RecordNotInserted)));
    }
}
