//! Argon2id password hashing.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use kontor_shared::AppError;
use thiserror::Error;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Password hashing and policy failures.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Password shorter than [`MIN_PASSWORD_LEN`].
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    TooShort,

    /// Hashing failed.
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// Stored hash is not a PHC string.
    #[error("stored password hash is malformed")]
    MalformedHash,
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::TooShort => Self::Validation(e.to_string()),
            PasswordError::Hash(_) | PasswordError::MalformedHash => Self::Internal(e.to_string()),
        }
    }
}

/// Rejects passwords below the minimum length.
pub fn check_password_policy(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }
    Ok(())
}

/// Hashes `password` into a PHC string with a fresh salt.
///
/// # Example
///
/// ```
/// use kontor_core::auth::{hash_password, verify_password};
///
/// let hash = hash_password("admin123").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(verify_password("admin123", &hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    check_password_policy(password)?;
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Returns whether `password` matches the stored `hash`.
///
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::MalformedHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_admin_password_round_trips() {
        let hash = hash_password("admin123").unwrap();
        assert!(verify_password("admin123", &hash).unwrap());
        assert!(!verify_password("admin124", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(
            hash_password("secret1").unwrap(),
            hash_password("secret1").unwrap()
        );
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(hash_password("abc"), Err(PasswordError::TooShort)));
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            verify_password("whatever", "not-a-phc-string"),
            Err(PasswordError::MalformedHash)
        ));
    }
}
