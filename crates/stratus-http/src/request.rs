//! Request-side helpers shared by the operation handlers.

use std::collections::HashMap;

use stratus_model::{S3Error, S3ErrorCode};

/// An inclusive byte range resolved against a known object size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    /// Inclusive end offset.
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes the range covers.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Ranges are never empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Parse a `Range` header against the object size.
///
/// Supported forms: `bytes=a-b` (inclusive) and the open-ended `bytes=a-`
/// (clamped to the last byte). The suffix form `bytes=-N` is not part of
/// the protocol surface and is rejected as `InvalidArgument`.
///
/// # Errors
///
/// `InvalidArgument` for malformed or suffix ranges, `InvalidRange` (416)
/// when the range cannot be satisfied against `size`.
pub fn parse_range(header: &str, size: u64) -> Result<ByteRange, S3Error> {
    let spec = header
        .trim()
        .strip_prefix("bytes=")
        .ok_or_else(|| S3Error::invalid_argument(format!("invalid range: {header}")))?;

    let (start_str, end_str) = spec
        .split_once('-')
        .ok_or_else(|| S3Error::invalid_argument(format!("invalid range: {header}")))?;

    if start_str.is_empty() {
        return Err(S3Error::invalid_argument(
            "suffix byte ranges are not supported",
        ));
    }

    let start: u64 = start_str
        .trim()
        .parse()
        .map_err(|_| S3Error::invalid_argument(format!("invalid range start: {start_str}")))?;

    let end: u64 = if end_str.trim().is_empty() {
        size.saturating_sub(1)
    } else {
        end_str
            .trim()
            .parse()
            .map_err(|_| S3Error::invalid_argument(format!("invalid range end: {end_str}")))?
    };

    if size == 0 || start >= size || start > end {
        return Err(S3Error::new(
            S3ErrorCode::InvalidRange,
            "The requested range is not satisfiable",
        ));
    }

    Ok(ByteRange {
        start,
        end: end.min(size - 1),
    })
}

/// Collect `x-amz-meta-*` request headers into a metadata map, prefix
/// stripped and names lowercased.
#[must_use]
pub fn extract_user_metadata(headers: &http::HeaderMap) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    for (name, value) in headers {
        let name = name.as_str();
        if let Some(meta_key) = name.strip_prefix("x-amz-meta-") {
            if let Ok(value) = value.to_str() {
                metadata.insert(meta_key.to_owned(), value.to_owned());
            }
        }
    }
    metadata
}

/// The declared `Content-Length`, when present and parseable.
#[must_use]
pub fn content_length(headers: &http::HeaderMap) -> Option<u64> {
    headers
        .get(http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// The request `Content-Type`, defaulting to `application/octet-stream`.
#[must_use]
pub fn content_type(headers: &http::HeaderMap) -> String {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("application/octet-stream")
        .to_owned()
}

/// Parse `x-amz-copy-source: /srcBucket/srcKey` into its components.
///
/// # Errors
///
/// `InvalidArgument` when the header does not name both a bucket and a key.
pub fn parse_copy_source(raw: &str) -> Result<(String, String), S3Error> {
    let trimmed = raw.trim_start_matches('/');
    let decoded = percent_encoding::percent_decode_str(trimmed).decode_utf8_lossy();
    match decoded.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
            Ok((bucket.to_owned(), key.to_owned()))
        }
        _ => Err(S3Error::invalid_argument(format!(
            "invalid copy source: {raw}"
        ))),
    }
}
