use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{User, UserCredentials};

/// Credential storage for the authentication flow. This is the only trait that ever surfaces a password hash.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Fetches the credentials for an active account by (lowercased) email.
    async fn fetch_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AuthApiError>;

    /// Fetches the credentials for an active account by user id.
    async fn fetch_credentials_by_user_id(&self, user_id: i64) -> Result<Option<UserCredentials>, AuthApiError>;

    /// Replaces the stored password hash and clears any outstanding reset token.
    async fn update_password_hash(&self, user_id: i64, password_hash: &str) -> Result<(), AuthApiError>;

    /// Stores the SHA-256 digest of a password reset token, replacing any previous one.
    async fn store_reset_token(
        &self,
        user_id: i64,
        token_digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthApiError>;

    /// Resolves the active account holding an unexpired reset token with the given digest.
    async fn fetch_user_by_reset_digest(&self, token_digest: &str) -> Result<Option<User>, AuthApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("There is an internal database error: {0}")]
    DatabaseError(String),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Token has expired or is invalid.")]
    ResetTokenInvalid,
    #[error("No user found with id {0}")]
    UserNotFound(i64),
    #[error("Invalid password. {0}")]
    PasswordError(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}
