//! Row types and repository parameter/result structs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;

/// A service user. Created by bootstrap or by an admin.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    /// `active` or `disabled`.
    pub status: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user may authenticate.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// An access-key / secret-key pair owned by a user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credential {
    pub id: i64,
    pub user_id: i64,
    pub access_key: String,
    pub secret_key: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Whether the credential has passed its optional expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// A bucket row. `owner_id` never changes after creation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Bucket {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub region: String,
    pub acl: String,
    pub versioning: bool,
    /// Duration string like `7d` or `2h30m`; governs presigned-URL defaults.
    pub default_expiry: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An object row. Logical identity is `(bucket_id, key, version_id)` with
/// the version sentinel `"null"`; upserts replace the row in place.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ObjectRecord {
    pub id: i64,
    pub bucket_id: i64,
    pub key: String,
    pub version_id: String,
    pub size: i64,
    /// Unquoted hex MD5, or the multipart composite form.
    pub etag: String,
    pub content_type: String,
    pub storage_class: String,
    /// Opaque locator inside the storage engine.
    pub storage_path: String,
    pub metadata: Json<HashMap<String, String>>,
    pub is_delete_marker: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating or replacing an object row.
#[derive(Debug, Clone)]
pub struct NewObject {
    pub bucket_id: i64,
    pub key: String,
    pub size: i64,
    pub etag: String,
    pub content_type: String,
    pub storage_path: String,
    pub metadata: HashMap<String, String>,
}

/// A multipart upload in progress.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MultipartUpload {
    pub id: i64,
    pub upload_id: String,
    pub bucket_id: i64,
    pub key: String,
    pub content_type: Option<String>,
    pub metadata: Json<HashMap<String, String>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// One staged part of a multipart upload.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UploadPart {
    pub id: i64,
    pub upload_id: String,
    pub part_number: i32,
    pub size: i64,
    /// Unquoted hex MD5 of the part body.
    pub etag: String,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

/// Parameters for `ListObjects`.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub prefix: String,
    pub delimiter: String,
    pub marker: String,
    /// Defaults to 1000 and is capped at 1000.
    pub max_keys: i64,
}

/// Result of `ListObjects`.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub objects: Vec<ObjectRecord>,
    pub common_prefixes: Vec<String>,
    pub is_truncated: bool,
    pub next_marker: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn user(status: &str) -> User {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        User {
            id: 1,
            username: "root".to_owned(),
            password_hash: "x".to_owned(),
            email: None,
            status: status.to_owned(),
            is_admin: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_should_report_user_activity_from_status() {
        assert!(user("active").is_active());
        assert!(!user("disabled").is_active());
    }

    #[test]
    fn test_should_expire_credentials_only_when_deadline_passed() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut cred = Credential {
            id: 1,
            user_id: 1,
            access_key: "AKIA".to_owned(),
            secret_key: "s".to_owned(),
            description: None,
            status: "active".to_owned(),
            created_at: now,
            expires_at: None,
        };
        assert!(!cred.is_expired(now));

        cred.expires_at = Some(now + Duration::hours(1));
        assert!(!cred.is_expired(now));

        cred.expires_at = Some(now - Duration::hours(1));
        assert!(cred.is_expired(now));
    }
}
