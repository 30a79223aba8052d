//! Capability policy.
//!
//! Authorization is a pure decision over the caller's role name and
//! permission tags. The admin role and the `*` tag allow everything.

use std::fmt;

use kontor_shared::types::UserId;
use serde::Serialize;

/// Role that bypasses every capability check.
pub const ADMIN_ROLE: &str = "admin";

/// Permission tag granting every capability.
pub const WILDCARD: &str = "*";

/// Role assigned to self-registered users.
pub const DEFAULT_ROLE: &str = "usuario";

/// A guarded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read accounts, transactions, invoices and accounting reports.
    AccountingRead,
    /// Create or modify accounting records.
    AccountingWrite,
    /// Read the catalog, movements, alerts and stock reports.
    InventoryRead,
    /// Create or modify inventory records.
    InventoryWrite,
    /// List users and roles.
    UsersRead,
    /// Create or modify users.
    UsersWrite,
    /// Deactivate users.
    UsersDelete,
}

impl Capability {
    /// Permission tag as stored in a role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccountingRead => "contabilidad:read",
            Self::AccountingWrite => "contabilidad:write",
            Self::InventoryRead => "almacen:read",
            Self::InventoryWrite => "almacen:write",
            Self::UsersRead => "users:read",
            Self::UsersWrite => "users:write",
            Self::UsersDelete => "users:delete",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User ID.
    pub user_id: UserId,
    /// Role name.
    pub role: String,
    /// Permission tags carried by the role.
    pub permissions: Vec<String>,
}

impl Identity {
    /// Returns true for the admin role or a wildcard grant.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE || self.permissions.iter().any(|p| p == WILDCARD)
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed.
    Allow,
    /// Refuse with 403.
    Deny,
}

impl Decision {
    /// True for [`Decision::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether `identity` may exercise `capability`.
#[must_use]
pub fn authorize(identity: &Identity, capability: Capability) -> Decision {
    if identity.is_admin() || identity.permissions.iter().any(|p| p == capability.as_str()) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// A role created on first start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleTemplate {
    /// Role name.
    pub name: &'static str,
    /// Description.
    pub description: &'static str,
    /// Permission tags.
    pub permissions: &'static [&'static str],
}

/// Roles seeded into an empty database.
pub const DEFAULT_ROLES: [RoleTemplate; 4] = [
    RoleTemplate {
        name: ADMIN_ROLE,
        description: "Administrador del sistema",
        permissions: &[WILDCARD],
    },
    RoleTemplate {
        name: DEFAULT_ROLE,
        description: "Usuario estándar",
        permissions: &["dashboard:read", "profile:read"],
    },
    RoleTemplate {
        name: "contabilidad",
        description: "Usuario de contabilidad",
        permissions: &["dashboard:read", "contabilidad:read", "contabilidad:write"],
    },
    RoleTemplate {
        name: "almacen",
        description: "Usuario de almacén",
        permissions: &["dashboard:read", "almacen:read", "almacen:write"],
    },
];
