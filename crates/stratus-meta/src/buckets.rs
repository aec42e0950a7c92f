//! Bucket repository functions.

use sqlx::PgExecutor;

use crate::error::MetaError;
use crate::models::Bucket;

/// Insert a bucket and return the stored row.
///
/// # Errors
///
/// [`MetaError::Conflict`] when the name is taken; callers race against
/// other creators between their existence check and this insert, and the
/// constraint is the arbiter.
pub async fn create_bucket(
    exec: impl PgExecutor<'_>,
    name: &str,
    owner_id: i64,
    region: &str,
    acl: &str,
) -> Result<Bucket, MetaError> {
    let bucket = sqlx::query_as::<_, Bucket>(
        r#"INSERT INTO buckets (name, owner_id, region, acl, versioning)
           VALUES ($1, $2, $3, $4, FALSE)
           RETURNING *"#,
    )
    .bind(name)
    .bind(owner_id)
    .bind(region)
    .bind(acl)
    .fetch_one(exec)
    .await?;
    Ok(bucket)
}

/// Look a bucket up by its globally unique name.
pub async fn get_bucket_by_name(
    exec: impl PgExecutor<'_>,
    name: &str,
) -> Result<Option<Bucket>, MetaError> {
    let bucket = sqlx::query_as::<_, Bucket>("SELECT * FROM buckets WHERE name = $1")
        .bind(name)
        .fetch_optional(exec)
        .await?;
    Ok(bucket)
}

/// Look a bucket up by id.
pub async fn get_bucket_by_id(
    exec: impl PgExecutor<'_>,
    id: i64,
) -> Result<Option<Bucket>, MetaError> {
    let bucket = sqlx::query_as::<_, Bucket>("SELECT * FROM buckets WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(bucket)
}

/// The caller's buckets, name-ordered.
pub async fn list_buckets(
    exec: impl PgExecutor<'_>,
    owner_id: i64,
) -> Result<Vec<Bucket>, MetaError> {
    let buckets =
        sqlx::query_as::<_, Bucket>("SELECT * FROM buckets WHERE owner_id = $1 ORDER BY name")
            .bind(owner_id)
            .fetch_all(exec)
            .await?;
    Ok(buckets)
}

/// Update a bucket's mutable fields (`owner_id` and `name` are not among
/// them).
pub async fn update_bucket(exec: impl PgExecutor<'_>, bucket: &Bucket) -> Result<(), MetaError> {
    sqlx::query("UPDATE buckets SET acl = $1, versioning = $2, default_expiry = $3 WHERE id = $4")
        .bind(&bucket.acl)
        .bind(bucket.versioning)
        .bind(&bucket.default_expiry)
        .bind(bucket.id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Delete a bucket row. The caller is responsible for the emptiness check.
pub async fn delete_bucket(exec: impl PgExecutor<'_>, id: i64) -> Result<(), MetaError> {
    sqlx::query("DELETE FROM buckets WHERE id = $1")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(())
}
