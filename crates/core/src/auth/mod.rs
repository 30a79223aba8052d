//! Authentication and authorization.
//!
//! - Password hashing with Argon2id
//! - User input validation
//! - Capability policy over role permission tags

mod password;
mod policy;
mod user;

pub use password::{
    MIN_PASSWORD_LEN, PasswordError, check_password_policy, hash_password, verify_password,
};
pub use policy::{
    ADMIN_ROLE, Capability, DEFAULT_ROLE, DEFAULT_ROLES, Decision, Identity, RoleTemplate,
    WILDCARD, authorize,
};
pub use user::{NewUser, UserChanges, UserInputError, ValidUser, ValidUserChanges};
