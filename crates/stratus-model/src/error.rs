//! The S3 error taxonomy.
//!
//! [`S3Error`] is the single error type crossing the handler boundary. It
//! pairs a well-known [`S3ErrorCode`] with a human-readable message and the
//! request resource path, and renders as the S3 `<Error>` XML document with
//! the HTTP status derived from the code.

use std::fmt;

/// Well-known S3 error codes produced by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum S3ErrorCode {
    /// Request was denied: disabled user, missing grant, or unauthorized action.
    #[default]
    AccessDenied,
    /// The requested bucket name is taken by another owner.
    BucketAlreadyExists,
    /// The bucket exists and the caller already owns it.
    BucketAlreadyOwnedByYou,
    /// The bucket still contains objects.
    BucketNotEmpty,
    /// Unexpected storage or database failure.
    InternalError,
    /// The access key in the credential scope is unknown or inactive.
    InvalidAccessKeyId,
    /// A request argument is out of range or malformed.
    InvalidArgument,
    /// The bucket name violates the naming rules.
    InvalidBucketName,
    /// A part listed in CompleteMultipartUpload does not match a stored part.
    InvalidPart,
    /// The part list was not in ascending part-number order.
    InvalidPartOrder,
    /// The requested byte range cannot be satisfied.
    InvalidRange,
    /// The request is structurally invalid.
    InvalidRequest,
    /// The policy document is not valid JSON or not a valid policy.
    MalformedPolicy,
    /// The XML request body could not be parsed.
    MalformedXML,
    /// The HTTP method is not allowed against this resource.
    MethodNotAllowed,
    /// The bucket does not exist.
    NoSuchBucket,
    /// The bucket has no policy attached.
    NoSuchBucketPolicy,
    /// The object does not exist.
    NoSuchKey,
    /// The multipart upload does not exist.
    NoSuchUpload,
    /// SigV4 verification failed.
    SignatureDoesNotMatch,
    /// The streamed body did not match the declared `x-amz-content-sha256`.
    XAmzContentSHA256Mismatch,
}

impl S3ErrorCode {
    /// The wire-format code string placed in `<Error><Code>`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::BucketAlreadyExists => "BucketAlreadyExists",
            Self::BucketAlreadyOwnedByYou => "BucketAlreadyOwnedByYou",
            Self::BucketNotEmpty => "BucketNotEmpty",
            Self::InternalError => "InternalError",
            Self::InvalidAccessKeyId => "InvalidAccessKeyId",
            Self::InvalidArgument => "InvalidArgument",
            Self::InvalidBucketName => "InvalidBucketName",
            Self::InvalidPart => "InvalidPart",
            Self::InvalidPartOrder => "InvalidPartOrder",
            Self::InvalidRange => "InvalidRange",
            Self::InvalidRequest => "InvalidRequest",
            Self::MalformedPolicy => "MalformedPolicy",
            Self::MalformedXML => "MalformedXML",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchBucketPolicy => "NoSuchBucketPolicy",
            Self::NoSuchKey => "NoSuchKey",
            Self::NoSuchUpload => "NoSuchUpload",
            Self::SignatureDoesNotMatch => "SignatureDoesNotMatch",
            Self::XAmzContentSHA256Mismatch => "XAmzContentSHA256Mismatch",
        }
    }

    /// The HTTP status this code maps to.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::InvalidArgument
            | Self::InvalidBucketName
            | Self::InvalidPart
            | Self::InvalidPartOrder
            | Self::InvalidRequest
            | Self::MalformedPolicy
            | Self::MalformedXML
            | Self::XAmzContentSHA256Mismatch => http::StatusCode::BAD_REQUEST,
            Self::AccessDenied | Self::InvalidAccessKeyId | Self::SignatureDoesNotMatch => {
                http::StatusCode::FORBIDDEN
            }
            Self::NoSuchBucket | Self::NoSuchBucketPolicy | Self::NoSuchKey | Self::NoSuchUpload => {
                http::StatusCode::NOT_FOUND
            }
            Self::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::BucketAlreadyExists | Self::BucketAlreadyOwnedByYou | Self::BucketNotEmpty => {
                http::StatusCode::CONFLICT
            }
            Self::InvalidRange => http::StatusCode::RANGE_NOT_SATISFIABLE,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An S3 protocol error: code, message and the resource it concerns.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct S3Error {
    /// The well-known error code.
    pub code: S3ErrorCode,
    /// Human-readable message placed in `<Error><Message>`.
    pub message: String,
    /// The request path, placed in `<Error><Resource>` when known.
    pub resource: Option<String>,
}

impl S3Error {
    /// Create an error with a custom message.
    #[must_use]
    pub fn new(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            resource: None,
        }
    }

    /// Attach the request resource path.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// The HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        self.code.status_code()
    }

    /// `NoSuchBucket` for the given bucket name.
    #[must_use]
    pub fn no_such_bucket(bucket: &str) -> Self {
        Self::new(
            S3ErrorCode::NoSuchBucket,
            format!("The specified bucket does not exist: {bucket}"),
        )
    }

    /// `NoSuchKey` for the given object key.
    #[must_use]
    pub fn no_such_key(key: &str) -> Self {
        Self::new(
            S3ErrorCode::NoSuchKey,
            format!("The specified key does not exist: {key}"),
        )
    }

    /// `NoSuchUpload` for the given upload id.
    #[must_use]
    pub fn no_such_upload(upload_id: &str) -> Self {
        Self::new(
            S3ErrorCode::NoSuchUpload,
            format!("The specified upload does not exist: {upload_id}"),
        )
    }

    /// `InvalidArgument` with the given message.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::InvalidArgument, message)
    }

    /// `AccessDenied` with the given message.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::AccessDenied, message)
    }

    /// `InternalError` wrapping an underlying failure.
    #[must_use]
    pub fn internal(message: impl fmt::Display) -> Self {
        Self::new(S3ErrorCode::InternalError, message.to_string())
    }
}
