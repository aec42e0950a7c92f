//! Bucket policy repository functions.

use serde_json::Value;
use sqlx::PgExecutor;

use crate::error::MetaError;

/// Attach or replace the policy document for a bucket.
pub async fn set_bucket_policy(
    exec: impl PgExecutor<'_>,
    bucket_id: i64,
    policy: &Value,
) -> Result<(), MetaError> {
    sqlx::query(
        r#"INSERT INTO bucket_policies (bucket_id, policy)
           VALUES ($1, $2)
           ON CONFLICT (bucket_id) DO UPDATE SET
               policy = EXCLUDED.policy,
               updated_at = now()"#,
    )
    .bind(bucket_id)
    .bind(policy)
    .execute(exec)
    .await?;
    Ok(())
}

/// The policy document for a bucket, or `Ok(None)` when none is attached.
pub async fn get_bucket_policy(
    exec: impl PgExecutor<'_>,
    bucket_id: i64,
) -> Result<Option<Value>, MetaError> {
    let policy: Option<(Value,)> =
        sqlx::query_as("SELECT policy FROM bucket_policies WHERE bucket_id = $1")
            .bind(bucket_id)
            .fetch_optional(exec)
            .await?;
    Ok(policy.map(|(value,)| value))
}

/// Detach the policy from a bucket. Missing policies are success.
pub async fn delete_bucket_policy(
    exec: impl PgExecutor<'_>,
    bucket_id: i64,
) -> Result<(), MetaError> {
    sqlx::query("DELETE FROM bucket_policies WHERE bucket_id = $1")
        .bind(bucket_id)
        .execute(exec)
        .await?;
    Ok(())
}
