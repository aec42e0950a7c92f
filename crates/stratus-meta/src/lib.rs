//! PostgreSQL metadata store for Stratus.
//!
//! All durable relational state lives here: users, credentials, buckets,
//! objects, multipart uploads, parts, bucket policies and audit records.
//!
//! # Executor model
//!
//! [`MetaStore`] owns the connection pool; every repository function is a
//! free async fn generic over [`sqlx::PgExecutor`], so callers pass either
//! `store.pool()` or `&mut *tx` from [`MetaStore::begin`] and the query code
//! never branches on "is this a transaction". Absent rows come back as
//! `Ok(None)`: "not found" is a domain condition, not an error.

pub mod audit;
pub mod buckets;
pub mod credentials;
pub mod error;
pub mod listing;
pub mod models;
pub mod multipart;
pub mod objects;
pub mod policies;
pub mod policy;
pub mod store;
pub mod users;

pub use error::MetaError;
pub use models::{
    Bucket, Credential, ListParams, Listing, MultipartUpload, NewObject, ObjectRecord, UploadPart,
    User,
};
pub use policy::BucketPolicy;
pub use store::MetaStore;
