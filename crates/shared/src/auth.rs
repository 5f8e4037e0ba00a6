//! Authentication types for JWT and account requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::OwnerId;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (owner ID).
    pub sub: OwnerId,
    /// Account user name.
    pub name: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an account.
    #[must_use]
    pub fn new(owner_id: OwnerId, user_name: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: owner_id,
            name: user_name.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the owner ID from claims.
    #[must_use]
    pub const fn owner_id(&self) -> OwnerId {
        self.sub
    }
}

/// Sign-up and sign-in request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    /// Unique account name.
    #[serde(default, rename = "userName", alias = "user_name")]
    pub user_name: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

impl CredentialsRequest {
    /// Returns an error message when either field is blank.
    #[must_use]
    pub fn missing_fields(&self) -> Option<&'static str> {
        if self.user_name.trim().is_empty() || self.password.is_empty() {
            Some("userName and password are required")
        } else {
            None
        }
    }
}

/// Response after a successful sign-up.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    /// Human readable status.
    pub message: String,
    /// Newly created owner ID.
    #[serde(rename = "userId")]
    pub user_id: OwnerId,
    /// Access token.
    pub token: String,
}

/// Response after a successful sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    /// Human readable status.
    pub message: String,
    /// Access token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}
