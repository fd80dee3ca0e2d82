use chrono::{Duration, Utc};
use log::*;

use crate::{
    db_types::User,
    helpers::passwords,
    traits::{AuthApiError, AuthManagement},
};

/// How long a password reset token stays valid.
pub const RESET_TOKEN_VALIDITY: Duration = Duration::minutes(10);

#[derive(Debug, Clone)]
pub struct AuthApi<B> {
    db: B,
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    /// Checks an email + password pair and returns the matching active user.
    ///
    /// Unknown emails and wrong passwords produce the same [`AuthApiError::InvalidCredentials`] so the
    /// response does not reveal which of the two was wrong.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AuthApiError> {
        let email = email.trim().to_lowercase();
        let Some(credentials) = self.db.fetch_credentials_by_email(&email).await? else {
            debug!("🔑️ Login attempt for unknown email");
            return Err(AuthApiError::InvalidCredentials);
        };
        if !passwords::verify_password(password, &credentials.password_hash) {
            debug!("🔑️ Wrong password for {}", credentials.user.email);
            return Err(AuthApiError::InvalidCredentials);
        }
        Ok(credentials.user)
    }

    /// Changes a user's password after checking the current one.
    pub async fn update_password(&self, user_id: i64, current: &str, new_password: &str) -> Result<(), AuthApiError> {
        let credentials =
            self.db.fetch_credentials_by_user_id(user_id).await?.ok_or(AuthApiError::UserNotFound(user_id))?;
        if !passwords::verify_password(current, &credentials.password_hash) {
            return Err(AuthApiError::InvalidCredentials);
        }
        let hash = passwords::hash_password(new_password).map_err(|e| AuthApiError::PasswordError(e.to_string()))?;
        self.db.update_password_hash(user_id, &hash).await?;
        info!("🔑️ Password updated for user #{user_id}");
        Ok(())
    }

    /// Issues a password reset token for the given email, valid for [`RESET_TOKEN_VALIDITY`].
    ///
    /// Returns the clear-text token for delivery to the user. Returns `None` when the email matches no active
    /// account — callers should respond identically in both cases to avoid leaking which emails exist.
    pub async fn issue_reset_token(&self, email: &str) -> Result<Option<String>, AuthApiError> {
        let email = email.trim().to_lowercase();
        let Some(credentials) = self.db.fetch_credentials_by_email(&email).await? else {
            debug!("🔑️ Reset token requested for unknown email");
            return Ok(None);
        };
        let token = passwords::generate_reset_token();
        let digest = passwords::reset_token_digest(&token);
        let expires_at = Utc::now() + RESET_TOKEN_VALIDITY;
        self.db.store_reset_token(credentials.user.id, &digest, expires_at).await?;
        info!("🔑️ Reset token issued for user #{}", credentials.user.id);
        Ok(Some(token))
    }

    /// Redeems a reset token: validates the digest and expiry, stores the new password hash and clears the
    /// token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<User, AuthApiError> {
        let digest = passwords::reset_token_digest(token);
        let user = self.db.fetch_user_by_reset_digest(&digest).await?.ok_or(AuthApiError::ResetTokenInvalid)?;
        let hash = passwords::hash_password(new_password).map_err(|e| AuthApiError::PasswordError(e.to_string()))?;
        self.db.update_password_hash(user.id, &hash).await?;
        info!("🔑️ Password reset completed for user #{}", user.id);
        Ok(user)
    }
}
