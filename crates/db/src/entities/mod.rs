//! `SeaORM` entity definitions.

pub mod accounts;
pub mod categories;
pub mod inventory_alerts;
pub mod invoices;
pub mod movements;
pub mod products;
pub mod roles;
pub mod sea_orm_active_enums;
pub mod sessions;
pub mod suppliers;
pub mod transactions;
pub mod users;
