use thiserror::Error;

use crate::db_types::{NewUser, User, UserUpdate};

/// Access to user account records. Methods that exclude deactivated accounts say so in their name; nothing is
/// filtered implicitly.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, AccountApiError>;

    /// Resolves an account by (lowercased) email, excluding deactivated accounts. This is the lookup the
    /// reconciler uses to attribute a completed payment session to a buyer.
    async fn fetch_active_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError>;

    /// All accounts, active or not.
    async fn fetch_all_users(&self) -> Result<Vec<User>, AccountApiError>;

    /// Inserts a new account. The email must be unique.
    async fn insert_user(&self, user: NewUser) -> Result<User, AccountApiError>;

    /// Applies the non-`None` fields of the update.
    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, AccountApiError>;

    /// Marks the account inactive. The record is kept: orders reference it.
    async fn deactivate_user(&self, id: i64) -> Result<(), AccountApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("There is an internal database error: {0}")]
    DatabaseError(String),
    #[error("No user found with id {0}")]
    UserNotFound(i64),
    #[error("A user with email {0} already exists")]
    EmailAlreadyExists(String),
    #[error("Invalid account data. {0}")]
    ValidationError(String),
    #[error("The requested account change would result in a no-op.")]
    UpdateNoOp,
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}
