//! XML document types for the S3 wire protocol.
//!
//! These are plain structs mirroring the S3 reference documents, element for
//! element. `stratus-xml` renders them with the namespace
//! `http://s3.amazonaws.com/doc/2006-03-01/` and RFC3339 UTC timestamps;
//! ETags are stored here already quoted, exactly as they go on the wire.

use chrono::{DateTime, Utc};

/// `<Owner>`: bucket or object owner identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    /// Owner id (the user id rendered as a string).
    pub id: String,
    /// Owner display name (the username).
    pub display_name: String,
}

/// One `<Bucket>` entry inside `ListAllMyBucketsResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketEntry {
    pub name: String,
    pub creation_date: DateTime<Utc>,
}

/// `GET /` response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListAllMyBucketsResult {
    pub owner: Owner,
    pub buckets: Vec<BucketEntry>,
}

/// One `<Contents>` entry inside `ListBucketResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    /// Quoted ETag, e.g. `"d41d8cd98f00b204e9800998ecf8427e"`.
    pub etag: String,
    pub size: i64,
    pub storage_class: String,
}

/// `GET /{bucket}` response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBucketResult {
    pub name: String,
    pub prefix: String,
    pub marker: String,
    pub max_keys: i32,
    pub delimiter: String,
    pub is_truncated: bool,
    pub next_marker: Option<String>,
    pub contents: Vec<ObjectEntry>,
    pub common_prefixes: Vec<String>,
}

/// `PUT /{bucket}/{key}` + `x-amz-copy-source` response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyObjectResult {
    pub last_modified: DateTime<Utc>,
    /// Quoted ETag.
    pub etag: String,
}

/// `POST /{bucket}/{key}?uploads` response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateMultipartUploadResult {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
}

/// `POST /{bucket}/{key}?uploadId=U` response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteMultipartUploadResult {
    pub location: String,
    pub bucket: String,
    pub key: String,
    /// Quoted composite ETag, e.g. `"9b2cf53...-2"`.
    pub etag: String,
}

/// One `<Part>` entry inside `ListPartsResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartEntry {
    pub part_number: i32,
    pub last_modified: DateTime<Utc>,
    /// Quoted ETag.
    pub etag: String,
    pub size: i64,
}

/// `GET /{bucket}/{key}?uploadId=U` response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPartsResult {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub max_parts: i32,
    pub is_truncated: bool,
    pub parts: Vec<PartEntry>,
}

/// The `<Error>` response document (no namespace attribute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDocument {
    pub code: String,
    pub message: String,
    pub resource: Option<String>,
    pub request_id: Option<String>,
}

/// One `<Part>` the client claims in a `CompleteMultipartUpload` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    pub part_number: i32,
    /// ETag as sent by the client; may or may not be quoted.
    pub etag: String,
}

/// The `POST /{bucket}/{key}?uploadId=U` request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompleteMultipartUploadRequest {
    pub parts: Vec<CompletedPart>,
}

impl CompletedPart {
    /// The ETag with surrounding quotes stripped, for comparison against
    /// stored part ETags.
    #[must_use]
    pub fn bare_etag(&self) -> &str {
        self.etag.trim_matches('"')
    }
}
