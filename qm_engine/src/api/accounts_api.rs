use log::*;

use crate::{
    db_types::{NewUser, User, UserUpdate},
    helpers::passwords,
    traits::{AccountApiError, UserManagement},
};

/// A registration request, as submitted by a client. The password is still clear text at this point; it is
/// hashed before anything is stored.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AccountApi<B> {
    db: B,
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: UserManagement
{
    pub async fn register_user(&self, registration: RegisterUser) -> Result<User, AccountApiError> {
        validate_name("Firstname", &registration.first_name)?;
        validate_name("Lastname", &registration.last_name)?;
        validate_email(&registration.email)?;
        let password_hash = passwords::hash_password(&registration.password)
            .map_err(|e| AccountApiError::ValidationError(e.to_string()))?;
        let user = NewUser::new(registration.first_name, registration.last_name, registration.email, password_hash);
        let user = self.db.insert_user(user).await?;
        info!("👤️ New user #{} registered ({})", user.id, user.email);
        Ok(user)
    }

    pub async fn fetch_user(&self, id: i64) -> Result<User, AccountApiError> {
        self.db.fetch_user_by_id(id).await?.ok_or(AccountApiError::UserNotFound(id))
    }

    pub async fn fetch_active_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError> {
        self.db.fetch_active_user_by_email(&email.trim().to_lowercase()).await
    }

    pub async fn fetch_all_users(&self) -> Result<Vec<User>, AccountApiError> {
        self.db.fetch_all_users().await
    }

    pub async fn update_user(&self, id: i64, mut update: UserUpdate) -> Result<User, AccountApiError> {
        if update.is_empty() {
            return Err(AccountApiError::UpdateNoOp);
        }
        if let Some(first_name) = &update.first_name {
            validate_name("Firstname", first_name)?;
        }
        if let Some(last_name) = &update.last_name {
            validate_name("Lastname", last_name)?;
        }
        if let Some(email) = update.email.take() {
            let email = email.trim().to_lowercase();
            validate_email(&email)?;
            update.email = Some(email);
        }
        self.db.update_user(id, update).await
    }

    pub async fn deactivate_user(&self, id: i64) -> Result<(), AccountApiError> {
        self.db.deactivate_user(id).await?;
        info!("👤️ User #{id} deactivated");
        Ok(())
    }
}

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_EMAIL_LENGTH: usize = 254;

fn validate_name(field: &str, value: &str) -> Result<(), AccountApiError> {
    if value.trim().is_empty() {
        return Err(AccountApiError::ValidationError(format!("{field} is required")));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(AccountApiError::ValidationError(format!("{field} cannot exceed {MAX_NAME_LENGTH} characters")));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AccountApiError> {
    let trimmed = email.trim();
    let looks_valid = trimmed.len() <= MAX_EMAIL_LENGTH
        && trimmed.split_once('@').map(|(local, domain)| !local.is_empty() && domain.contains('.')).unwrap_or(false);
    if looks_valid {
        Ok(())
    } else {
        Err(AccountApiError::ValidationError("Please enter a valid email".to_string()))
    }
}
