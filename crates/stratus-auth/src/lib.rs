//! Authentication primitives for Stratus.
//!
//! This crate is pure computation: it verifies AWS Signature Version 4 in
//! both the `Authorization`-header and the presigned-query form, generates
//! presigned URLs, mints access/secret key pairs, hashes passwords and
//! validates bucket names and object keys. It never touches the network or
//! the metadata store; callers resolve the secret key first and hand it in.
//!
//! The SigV4 flow:
//!
//! 1. Parse the `Authorization` header or the `X-Amz-*` query parameters.
//! 2. Rebuild the canonical request from the HTTP request parts.
//! 3. Hash it into the string to sign with the credential scope.
//! 4. Derive the signing key by the HMAC-SHA256 chain and compute the
//!    expected signature.
//! 5. Compare against the supplied signature in constant time.

pub mod canonical;
pub mod error;
pub mod keys;
pub mod presign;
pub mod sigv4;
pub mod validate;

pub use error::AuthError;
pub use sigv4::{ParsedAuth, VerifiedAuth, parse_authorization_header, verify_header_signature};
pub use validate::{validate_bucket_name, validate_object_key};

/// The only signing algorithm this service accepts.
pub const SIGV4_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// The payload-hash literal that disables body digest verification.
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// SigV4 basic-format timestamp, e.g. `20130524T000000Z`.
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
