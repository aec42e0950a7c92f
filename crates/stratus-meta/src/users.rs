//! User repository functions.

use sqlx::PgExecutor;

use crate::error::MetaError;
use crate::models::User;

/// Insert a user and return the stored row.
///
/// # Errors
///
/// [`MetaError::Conflict`] when the username is taken.
pub async fn create_user(
    exec: impl PgExecutor<'_>,
    username: &str,
    password_hash: &str,
    email: Option<&str>,
    is_admin: bool,
) -> Result<User, MetaError> {
    let user = sqlx::query_as::<_, User>(
        r#"INSERT INTO users (username, password_hash, email, status, is_admin)
           VALUES ($1, $2, $3, 'active', $4)
           RETURNING *"#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(email)
    .bind(is_admin)
    .fetch_one(exec)
    .await?;
    Ok(user)
}

/// Look a user up by id; absent users are `Ok(None)`.
pub async fn get_user_by_id(
    exec: impl PgExecutor<'_>,
    id: i64,
) -> Result<Option<User>, MetaError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(user)
}

/// Look a user up by username; absent users are `Ok(None)`.
pub async fn get_user_by_username(
    exec: impl PgExecutor<'_>,
    username: &str,
) -> Result<Option<User>, MetaError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(exec)
        .await?;
    Ok(user)
}

/// Replace a user's mutable fields.
///
/// # Errors
///
/// [`MetaError::Conflict`] when renaming to a taken username.
pub async fn update_user(exec: impl PgExecutor<'_>, user: &User) -> Result<(), MetaError> {
    sqlx::query(
        r#"UPDATE users
           SET username = $1, password_hash = $2, email = $3, status = $4,
               is_admin = $5, updated_at = now()
           WHERE id = $6"#,
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.email)
    .bind(&user.status)
    .bind(user.is_admin)
    .bind(user.id)
    .execute(exec)
    .await?;
    Ok(())
}

/// Delete a user. Credentials cascade.
pub async fn delete_user(exec: impl PgExecutor<'_>, id: i64) -> Result<(), MetaError> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(())
}

/// All users, oldest first.
pub async fn list_users(exec: impl PgExecutor<'_>) -> Result<Vec<User>, MetaError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(exec)
        .await?;
    Ok(users)
}
