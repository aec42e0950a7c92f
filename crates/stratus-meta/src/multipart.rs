//! Multipart upload repository functions.

use std::collections::HashMap;

use sqlx::PgExecutor;
use sqlx::types::Json;

use crate::error::MetaError;
use crate::models::{MultipartUpload, UploadPart};

/// Register a new in-progress upload.
pub async fn create_multipart_upload(
    exec: impl PgExecutor<'_>,
    upload_id: &str,
    bucket_id: i64,
    key: &str,
    content_type: Option<&str>,
    metadata: &HashMap<String, String>,
) -> Result<MultipartUpload, MetaError> {
    let upload = sqlx::query_as::<_, MultipartUpload>(
        r#"INSERT INTO multipart_uploads (upload_id, bucket_id, key, content_type, metadata, status)
           VALUES ($1, $2, $3, $4, $5, 'in_progress')
           RETURNING *"#,
    )
    .bind(upload_id)
    .bind(bucket_id)
    .bind(key)
    .bind(content_type)
    .bind(Json(metadata))
    .fetch_one(exec)
    .await?;
    Ok(upload)
}

/// Look an upload up by its id; absent uploads are `Ok(None)`.
pub async fn get_multipart_upload(
    exec: impl PgExecutor<'_>,
    upload_id: &str,
) -> Result<Option<MultipartUpload>, MetaError> {
    let upload = sqlx::query_as::<_, MultipartUpload>(
        "SELECT * FROM multipart_uploads WHERE upload_id = $1",
    )
    .bind(upload_id)
    .fetch_optional(exec)
    .await?;
    Ok(upload)
}

/// Remove an upload row. Complete and Abort both end here.
pub async fn delete_multipart_upload(
    exec: impl PgExecutor<'_>,
    upload_id: &str,
) -> Result<(), MetaError> {
    sqlx::query("DELETE FROM multipart_uploads WHERE upload_id = $1")
        .bind(upload_id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Insert or replace a part row. Re-uploading a part number overwrites the
/// previous size, etag and storage path; the storage engine replaces the
/// staged file in step.
pub async fn upsert_upload_part(
    exec: impl PgExecutor<'_>,
    upload_id: &str,
    part_number: i32,
    size: i64,
    etag: &str,
    storage_path: &str,
) -> Result<UploadPart, MetaError> {
    let part = sqlx::query_as::<_, UploadPart>(
        r#"INSERT INTO upload_parts (upload_id, part_number, size, etag, storage_path)
           VALUES ($1, $2, $3, $4, $5)
           ON CONFLICT (upload_id, part_number) DO UPDATE SET
               size = EXCLUDED.size,
               etag = EXCLUDED.etag,
               storage_path = EXCLUDED.storage_path
           RETURNING *"#,
    )
    .bind(upload_id)
    .bind(part_number)
    .bind(size)
    .bind(etag)
    .bind(storage_path)
    .fetch_one(exec)
    .await?;
    Ok(part)
}

/// All parts of an upload, ascending by part number.
pub async fn get_upload_parts(
    exec: impl PgExecutor<'_>,
    upload_id: &str,
) -> Result<Vec<UploadPart>, MetaError> {
    let parts = sqlx::query_as::<_, UploadPart>(
        "SELECT * FROM upload_parts WHERE upload_id = $1 ORDER BY part_number ASC",
    )
    .bind(upload_id)
    .fetch_all(exec)
    .await?;
    Ok(parts)
}

/// Remove all part rows of an upload.
pub async fn delete_upload_parts(
    exec: impl PgExecutor<'_>,
    upload_id: &str,
) -> Result<(), MetaError> {
    sqlx::query("DELETE FROM upload_parts WHERE upload_id = $1")
        .bind(upload_id)
        .execute(exec)
        .await?;
    Ok(())
}
