//! Authentication error type.

/// Failure modes of SigV4 parsing and verification.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request carries neither an `Authorization` header nor presigned
    /// query parameters.
    #[error("missing authentication")]
    MissingAuth,

    /// The `Authorization` header could not be parsed.
    #[error("invalid authorization header")]
    InvalidAuthHeader,

    /// The algorithm is not `AWS4-HMAC-SHA256`.
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The credential scope is not `AK/date/region/service/aws4_request`.
    #[error("invalid credential scope")]
    InvalidCredential,

    /// A header named in `SignedHeaders` is absent from the request.
    #[error("missing signed header: {0}")]
    MissingHeader(String),

    /// A required presigned query parameter is absent or malformed.
    #[error("missing or invalid query parameter: {0}")]
    MissingQueryParam(String),

    /// The request timestamp is absent or not in SigV4 basic format.
    #[error("invalid request date")]
    InvalidDate,

    /// The request timestamp is outside the ±15 minute window.
    #[error("request time too skewed")]
    RequestSkewed,

    /// The presigned URL is past its declared expiry.
    #[error("request has expired")]
    RequestExpired,

    /// The computed signature does not match the supplied one.
    #[error("signature does not match")]
    SignatureDoesNotMatch,
}
