//! User input validation.

use kontor_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use super::password::{PasswordError, check_password_policy};
use crate::fields::{FieldError, optional_text, required_text};

/// Errors raised while validating user input.
#[derive(Debug, Error)]
pub enum UserInputError {
    /// Missing field.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Email without a local part or domain.
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    /// Password rejected by policy.
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<UserInputError> for AppError {
    fn from(e: UserInputError) -> Self {
        match e {
            UserInputError::Password(p) => p.into(),
            other => Self::Validation(other.to_string()),
        }
    }
}

/// Raw user creation or registration payload.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    /// Login email.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Role; the default role is used when absent.
    pub role_id: Option<Uuid>,
}

/// Checked user creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUser {
    /// Normalized email.
    pub email: String,
    /// Plaintext password, policy checked.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role_id: Option<Uuid>,
}

impl NewUser {
    /// Checks required fields, email shape and password policy.
    pub fn validate(self) -> Result<ValidUser, UserInputError> {
        let email = normalize_email(required_text("email", self.email)?)?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or(FieldError::Missing("password"))?;
        check_password_policy(&password)?;
        let name = required_text("name", self.name)?;

        Ok(ValidUser {
            email,
            password,
            name,
            role_id: self.role_id,
        })
    }
}

/// Raw user update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// New email.
    pub email: Option<String>,
    /// New password.
    pub password: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New role.
    pub role_id: Option<Uuid>,
    /// Activation flag.
    pub is_active: Option<bool>,
}

/// Checked user update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidUserChanges {
    /// New normalized email.
    pub email: Option<String>,
    /// New plaintext password.
    pub password: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New role.
    pub role_id: Option<Uuid>,
    /// Activation flag.
    pub is_active: Option<bool>,
}

impl UserChanges {
    /// Blank password means "keep the current one".
    pub fn validate(self) -> Result<ValidUserChanges, UserInputError> {
        let email = self
            .email
            .map(|e| required_text("email", Some(e)).map_err(UserInputError::from))
            .transpose()?
            .map(normalize_email)
            .transpose()?;
        let password = optional_text(self.password);
        if let Some(password) = &password {
            check_password_policy(password)?;
        }
        let name = self
            .name
            .map(|n| required_text("name", Some(n)))
            .transpose()?;

        Ok(ValidUserChanges {
            email,
            password,
            name,
            role_id: self.role_id,
            is_active: self.is_active,
        })
    }
}

fn normalize_email(email: String) -> Result<String, UserInputError> {
    let email = email.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(UserInputError::InvalidEmail(email)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn admin() -> NewUser {
        NewUser {
            email: Some(" Admin@ERP.com ".into()),
            password: Some("admin123".into()),
            name: Some("Administrador".into()),
            role_id: None,
        }
    }

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(admin().validate().unwrap().email, "admin@erp.com");
    }

    #[rstest]
    #[case("admin")]
    #[case("@erp.com")]
    #[case("admin@localhost")]
    fn test_invalid_email(#[case] email: &str) {
        let result = NewUser {
            email: Some(email.into()),
            ..admin()
        }
        .validate();
        assert!(matches!(result, Err(UserInputError::InvalidEmail(_))));
    }

    #[test]
    fn test_short_password() {
        let result = NewUser {
            password: Some("123".into()),
            ..admin()
        }
        .validate();
        assert!(matches!(
            result,
            Err(UserInputError::Password(PasswordError::TooShort))
        ));
    }

    #[test]
    fn test_missing_password() {
        let result = NewUser {
            password: None,
            ..admin()
        }
        .validate();
        assert!(matches!(
            result,
            Err(UserInputError::Field(FieldError::Missing("password")))
        ));
    }

    #[test]
    fn test_blank_password_change_is_ignored() {
        let changes = UserChanges {
            password: Some(String::new()),
            ..UserChanges::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.password, None);
    }

    #[test]
    fn test_policy_failures_map_to_validation() {
        let err: AppError = UserInputError::Password(PasswordError::TooShort).into();
        assert_eq!(err.status_code(), 400);
    }
}
