use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{User, UserCredentials};

pub async fn fetch_credentials_by_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1 AND is_active = 1").bind(email).fetch_optional(conn).await
}

pub async fn fetch_credentials_by_user_id(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1 AND is_active = 1").bind(user_id).fetch_optional(conn).await
}

/// Replaces the password hash and clears any outstanding reset token in the same statement.
/// Returns `false` if no user with the given id exists.
pub async fn update_password_hash(
    user_id: i64,
    password_hash: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE users
            SET password_hash = $1,
                password_reset_digest = NULL,
                password_reset_expires_at = NULL,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
        "#,
    )
    .bind(password_hash)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn store_reset_token(
    user_id: i64,
    token_digest: &str,
    expires_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE users
            SET password_reset_digest = $1,
                password_reset_expires_at = $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
        "#,
    )
    .bind(token_digest)
    .bind(expires_at)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_user_by_reset_digest(
    token_digest: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT * FROM users
            WHERE password_reset_digest = $1
              AND is_active = 1
              AND datetime(password_reset_expires_at) > datetime(CURRENT_TIMESTAMP)
        "#,
    )
    .bind(token_digest)
    .fetch_optional(conn)
    .await
}
