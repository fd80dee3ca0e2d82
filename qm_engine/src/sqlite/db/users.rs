use log::debug;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewUser, User, UserUpdate},
    traits::AccountApiError,
};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, AccountApiError> {
    let email = user.email.clone();
    let inserted = sqlx::query_as::<_, User>(
        r#"
            INSERT INTO users (first_name, last_name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.role)
    .fetch_one(conn)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(de) if de.is_unique_violation() => AccountApiError::EmailAlreadyExists(email),
        _ => AccountApiError::from(e),
    })?;
    debug!("📝️ User {} inserted with id {}", inserted.email, inserted.id);
    Ok(inserted)
}

pub async fn fetch_user_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// Deactivated accounts are excluded here by design: this is the lookup used to attribute completed payment
/// sessions to a buyer.
pub async fn fetch_active_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1 AND is_active = 1").bind(email).fetch_optional(conn).await
}

pub async fn fetch_all_users(conn: &mut SqliteConnection) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users ORDER BY created_at ASC").fetch_all(conn).await
}

pub async fn update_user(
    id: i64,
    update: UserUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, AccountApiError> {
    if update.is_empty() {
        return Err(AccountApiError::UpdateNoOp);
    }
    let mut builder = QueryBuilder::new("UPDATE users SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(first_name) = update.first_name {
        set_clause.push("first_name = ");
        set_clause.push_bind_unseparated(first_name);
    }
    if let Some(last_name) = update.last_name {
        set_clause.push("last_name = ");
        set_clause.push_bind_unseparated(last_name);
    }
    let email = update.email.clone();
    if let Some(email) = update.email {
        set_clause.push("email = ");
        set_clause.push_bind_unseparated(email);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    let res = builder
        .build()
        .fetch_optional(conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(de) if de.is_unique_violation() => {
                AccountApiError::EmailAlreadyExists(email.unwrap_or_default())
            },
            _ => AccountApiError::from(e),
        })?
        .map(|row: SqliteRow| User::from_row(&row))
        .transpose()
        .map_err(AccountApiError::from)?;
    Ok(res)
}

/// Returns `false` if no user with the given id exists.
pub async fn deactivate_user(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET is_active = 0, updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
