//! Object repository functions.

use sqlx::PgExecutor;
use sqlx::types::Json;

use crate::error::MetaError;
use crate::listing::fold_listing;
use crate::models::{ListParams, Listing, NewObject, ObjectRecord};

/// Largest page the listing API will serve.
pub const MAX_LIST_KEYS: i64 = 1000;

/// Insert or replace the object row for `(bucket_id, key, "null")`.
///
/// On conflict the size, etag, content type, storage path, metadata and
/// `updated_at` are overwritten; exactly the PutObject-over-PutObject
/// last-writer-wins contract.
pub async fn upsert_object(
    exec: impl PgExecutor<'_>,
    object: &NewObject,
) -> Result<ObjectRecord, MetaError> {
    let row = sqlx::query_as::<_, ObjectRecord>(
        r#"INSERT INTO objects
               (bucket_id, key, version_id, size, etag, content_type,
                storage_class, storage_path, metadata)
           VALUES ($1, $2, 'null', $3, $4, $5, 'STANDARD', $6, $7)
           ON CONFLICT (bucket_id, key, version_id) DO UPDATE SET
               size = EXCLUDED.size,
               etag = EXCLUDED.etag,
               content_type = EXCLUDED.content_type,
               storage_path = EXCLUDED.storage_path,
               metadata = EXCLUDED.metadata,
               updated_at = now()
           RETURNING *"#,
    )
    .bind(object.bucket_id)
    .bind(&object.key)
    .bind(object.size)
    .bind(&object.etag)
    .bind(&object.content_type)
    .bind(&object.storage_path)
    .bind(Json(&object.metadata))
    .fetch_one(exec)
    .await?;
    Ok(row)
}

/// The latest live row for `(bucket_id, key)`, or `Ok(None)`.
pub async fn get_object(
    exec: impl PgExecutor<'_>,
    bucket_id: i64,
    key: &str,
) -> Result<Option<ObjectRecord>, MetaError> {
    let row = sqlx::query_as::<_, ObjectRecord>(
        r#"SELECT * FROM objects
           WHERE bucket_id = $1 AND key = $2 AND is_delete_marker = FALSE
           ORDER BY updated_at DESC
           LIMIT 1"#,
    )
    .bind(bucket_id)
    .bind(key)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Delete the object row. Missing rows are success; delete is idempotent.
pub async fn delete_object(
    exec: impl PgExecutor<'_>,
    bucket_id: i64,
    key: &str,
) -> Result<(), MetaError> {
    sqlx::query("DELETE FROM objects WHERE bucket_id = $1 AND key = $2")
        .bind(bucket_id)
        .bind(key)
        .execute(exec)
        .await?;
    Ok(())
}

/// Object count and total size of the live objects in a bucket.
pub async fn bucket_stats(
    exec: impl PgExecutor<'_>,
    bucket_id: i64,
) -> Result<(i64, i64), MetaError> {
    let row: (i64, i64) = sqlx::query_as(
        r#"SELECT COUNT(*), COALESCE(SUM(size), 0)::BIGINT
           FROM objects
           WHERE bucket_id = $1 AND is_delete_marker = FALSE"#,
    )
    .bind(bucket_id)
    .fetch_one(exec)
    .await?;
    Ok(row)
}

/// List live objects with prefix/delimiter/marker paging.
///
/// Fetches one row beyond the page size so truncation is decided by the
/// database, then folds delimiter grouping in [`fold_listing`].
pub async fn list_objects(
    exec: impl PgExecutor<'_>,
    bucket_id: i64,
    params: &ListParams,
) -> Result<Listing, MetaError> {
    let max_keys = effective_max_keys(params.max_keys);
    let like_pattern = format!("{}%", params.prefix);

    let rows = sqlx::query_as::<_, ObjectRecord>(
        r#"SELECT * FROM objects
           WHERE bucket_id = $1
             AND is_delete_marker = FALSE
             AND ($2 = '' OR key LIKE $3)
             AND ($4 = '' OR key > $4)
           ORDER BY key ASC
           LIMIT $5"#,
    )
    .bind(bucket_id)
    .bind(&params.prefix)
    .bind(&like_pattern)
    .bind(&params.marker)
    .bind(max_keys + 1)
    .fetch_all(exec)
    .await?;

    Ok(fold_listing(rows, &params.prefix, &params.delimiter, max_keys))
}

/// Clamp the requested page size into `1..=1000`, defaulting to 1000.
#[must_use]
pub fn effective_max_keys(requested: i64) -> i64 {
    if requested <= 0 || requested > MAX_LIST_KEYS {
        MAX_LIST_KEYS
    } else {
        requested
    }
}
