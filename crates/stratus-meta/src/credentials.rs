//! Credential repository functions.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::error::MetaError;
use crate::models::Credential;

/// Insert a credential and return the stored row.
///
/// # Errors
///
/// [`MetaError::Conflict`] when the access key already exists.
pub async fn create_credential(
    exec: impl PgExecutor<'_>,
    user_id: i64,
    access_key: &str,
    secret_key: &str,
    description: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
) -> Result<Credential, MetaError> {
    let cred = sqlx::query_as::<_, Credential>(
        r#"INSERT INTO credentials (user_id, access_key, secret_key, description, status, expires_at)
           VALUES ($1, $2, $3, $4, 'active', $5)
           RETURNING *"#,
    )
    .bind(user_id)
    .bind(access_key)
    .bind(secret_key)
    .bind(description)
    .bind(expires_at)
    .fetch_one(exec)
    .await?;
    Ok(cred)
}

/// Resolve an access key to its credential. Only `active` credentials are
/// returned; unknown or inactive keys are `Ok(None)`.
pub async fn get_credential_by_access_key(
    exec: impl PgExecutor<'_>,
    access_key: &str,
) -> Result<Option<Credential>, MetaError> {
    let cred = sqlx::query_as::<_, Credential>(
        "SELECT * FROM credentials WHERE access_key = $1 AND status = 'active'",
    )
    .bind(access_key)
    .fetch_optional(exec)
    .await?;
    Ok(cred)
}

/// All credentials belonging to a user.
pub async fn get_credentials_by_user_id(
    exec: impl PgExecutor<'_>,
    user_id: i64,
) -> Result<Vec<Credential>, MetaError> {
    let creds = sqlx::query_as::<_, Credential>(
        "SELECT * FROM credentials WHERE user_id = $1 ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(exec)
    .await?;
    Ok(creds)
}

/// Delete a credential by id.
pub async fn delete_credential(exec: impl PgExecutor<'_>, id: i64) -> Result<(), MetaError> {
    sqlx::query("DELETE FROM credentials WHERE id = $1")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(())
}
