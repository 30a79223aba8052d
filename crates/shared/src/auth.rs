//! JWT claims carried by access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User email at the time of login.
    pub email: String,
    /// Role name (`admin`, `contabilidad`, ...).
    pub role: String,
    /// Capability tags granted by the role.
    pub permissions: Vec<String>,
    /// Token ID, keeps tokens issued in the same second distinct.
    pub jti: Uuid,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        email: &str,
        role: &str,
        permissions: Vec<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id,
            email: email.to_string(),
            role: role.to_string(),
            permissions,
            jti: Uuid::new_v4(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}
