//! Wire-level S3 model for Stratus.
//!
//! This crate defines the protocol vocabulary shared by the HTTP layer and
//! the operation handlers:
//!
//! - [`S3Operation`]: every operation the service dispatches.
//! - [`error::S3Error`] / [`error::S3ErrorCode`]: the S3 error taxonomy with
//!   its HTTP status mapping and XML `<Error>` document shape.
//! - [`types`]: the XML response documents (`ListAllMyBucketsResult`,
//!   `ListBucketResult`, ...) and the `CompleteMultipartUpload` request body.
//!
//! Serialization to and from XML lives in `stratus-xml`; this crate holds
//! only the plain data types.

pub mod error;
pub mod operations;
pub mod types;

pub use error::{S3Error, S3ErrorCode};
pub use operations::S3Operation;
