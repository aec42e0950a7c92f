//! URL disambiguation.
//!
//! The same request line means different operations depending on the path
//! depth, the query-parameter subresources and one header: `PUT /b/k` is a
//! plain put, an `UploadPart` (with `partNumber` + `uploadId`) or a
//! `CopyObject` (with `x-amz-copy-source`). This module resolves every
//! request to a [`RoutingContext`] before authentication and dispatch.
//!
//! Only path-style addressing is served: `/`, `/{bucket}` and
//! `/{bucket}/{key...}` where the key may contain slashes.

use percent_encoding::percent_decode_str;

use stratus_model::{S3Error, S3ErrorCode, S3Operation};

/// A routed request: resolved names plus the identified operation.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub operation: S3Operation,
    /// Decoded query parameters in request order.
    pub query: Vec<(String, String)>,
}

impl RoutingContext {
    /// Whether a query parameter is present (with or without a value).
    #[must_use]
    pub fn has_query(&self, name: &str) -> bool {
        self.query.iter().any(|(k, _)| k == name)
    }

    /// The first value of a query parameter.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Resolve a request line to its S3 operation.
///
/// # Errors
///
/// Returns `MethodNotAllowed` / `InvalidRequest` errors for shapes outside
/// the dispatch table.
pub fn route_request(
    method: &http::Method,
    uri: &http::Uri,
    headers: &http::HeaderMap,
) -> Result<RoutingContext, S3Error> {
    let (bucket, key) = split_path(uri.path());
    let query = parse_query(uri.query().unwrap_or(""));

    let operation = identify_operation(method, bucket.as_deref(), key.as_deref(), &query, headers)?;

    Ok(RoutingContext {
        bucket,
        key,
        operation,
        query,
    })
}

/// Split `/bucket/key...` into its decoded components.
fn split_path(path: &str) -> (Option<String>, Option<String>) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (None, None);
    }

    match trimmed.split_once('/') {
        Some((bucket, key)) if !key.is_empty() => (Some(decode(bucket)), Some(decode(key))),
        Some((bucket, _)) => (Some(decode(bucket)), None),
        None => (Some(decode(trimmed)), None),
    }
}

fn decode(component: &str) -> String {
    percent_decode_str(component).decode_utf8_lossy().into_owned()
}

/// Parse a query string into decoded pairs; bare keys get empty values.
fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode(k), decode(v)),
            None => (decode(pair), String::new()),
        })
        .collect()
}

fn has_key(query: &[(String, String)], name: &str) -> bool {
    query.iter().any(|(k, _)| k == name)
}

fn identify_operation(
    method: &http::Method,
    bucket: Option<&str>,
    key: Option<&str>,
    query: &[(String, String)],
    headers: &http::HeaderMap,
) -> Result<S3Operation, S3Error> {
    match (bucket, key) {
        (None, _) => {
            if *method == http::Method::GET {
                Ok(S3Operation::ListBuckets)
            } else {
                Err(S3Error::new(
                    S3ErrorCode::MethodNotAllowed,
                    "Only GET is allowed at the service level",
                ))
            }
        }
        (Some(_), None) => identify_bucket_operation(method, query),
        (Some(_), Some(_)) => identify_object_operation(method, query, headers),
    }
}

fn identify_bucket_operation(
    method: &http::Method,
    query: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    match *method {
        http::Method::PUT if has_key(query, "settings") => Ok(S3Operation::UpdateBucketSettings),
        http::Method::PUT if has_key(query, "policy") => Ok(S3Operation::PutBucketPolicy),
        http::Method::PUT => Ok(S3Operation::CreateBucket),
        http::Method::GET if has_key(query, "settings") => Ok(S3Operation::GetBucketSettings),
        http::Method::GET if has_key(query, "policy") => Ok(S3Operation::GetBucketPolicy),
        http::Method::GET => Ok(S3Operation::ListObjects),
        http::Method::HEAD => Ok(S3Operation::HeadBucket),
        http::Method::DELETE if has_key(query, "policy") => Ok(S3Operation::DeleteBucketPolicy),
        http::Method::DELETE => Ok(S3Operation::DeleteBucket),
        _ => Err(method_not_allowed(method)),
    }
}

fn identify_object_operation(
    method: &http::Method,
    query: &[(String, String)],
    headers: &http::HeaderMap,
) -> Result<S3Operation, S3Error> {
    match *method {
        http::Method::PUT if has_key(query, "partNumber") && has_key(query, "uploadId") => {
            Ok(S3Operation::UploadPart)
        }
        http::Method::PUT if headers.contains_key("x-amz-copy-source") => {
            Ok(S3Operation::CopyObject)
        }
        http::Method::PUT => Ok(S3Operation::PutObject),
        http::Method::GET if has_key(query, "uploadId") => Ok(S3Operation::ListParts),
        http::Method::GET => Ok(S3Operation::GetObject),
        http::Method::HEAD => Ok(S3Operation::HeadObject),
        http::Method::DELETE if has_key(query, "uploadId") => {
            Ok(S3Operation::AbortMultipartUpload)
        }
        http::Method::DELETE => Ok(S3Operation::DeleteObject),
        http::Method::POST if has_key(query, "uploads") => Ok(S3Operation::CreateMultipartUpload),
        http::Method::POST if has_key(query, "uploadId") => {
            Ok(S3Operation::CompleteMultipartUpload)
        }
        http::Method::POST => Err(S3Error::new(
            S3ErrorCode::InvalidRequest,
            "POST requires the uploads or uploadId subresource",
        )),
        _ => Err(method_not_allowed(method)),
    }
}

fn method_not_allowed(method: &http::Method) -> S3Error {
    S3Error::new(
        S3ErrorCode::MethodNotAllowed,
        format!("Method {method} is not allowed against this resource"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: &str, uri: &str) -> RoutingContext {
        route_with_headers(method, uri, &[])
    }

    fn route_with_headers(method: &str, uri: &str, headers: &[(&str, &str)]) -> RoutingContext {
        let method: http::Method = method.parse().expect("method");
        let uri: http::Uri = uri.parse().expect("uri");
        let mut map = http::HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                http::header::HeaderName::from_bytes(name.as_bytes()).expect("name"),
                value.parse().expect("value"),
            );
        }
        route_request(&method, &uri, &map).expect("should route")
    }

    #[test]
    fn test_should_route_service_level_get() {
        let ctx = route("GET", "/");
        assert_eq!(ctx.operation, S3Operation::ListBuckets);
        assert!(ctx.bucket.is_none());
    }

    #[test]
    fn test_should_reject_service_level_put() {
        let method = http::Method::PUT;
        let uri: http::Uri = "/".parse().expect("uri");
        let err = route_request(&method, &uri, &http::HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, S3ErrorCode::MethodNotAllowed);
    }

    #[test]
    fn test_should_route_bucket_operations() {
        assert_eq!(route("PUT", "/b").operation, S3Operation::CreateBucket);
        assert_eq!(route("GET", "/b").operation, S3Operation::ListObjects);
        assert_eq!(route("HEAD", "/b").operation, S3Operation::HeadBucket);
        assert_eq!(route("DELETE", "/b").operation, S3Operation::DeleteBucket);
    }

    #[test]
    fn test_should_route_bucket_subresources() {
        assert_eq!(
            route("PUT", "/b?policy").operation,
            S3Operation::PutBucketPolicy
        );
        assert_eq!(
            route("GET", "/b?policy").operation,
            S3Operation::GetBucketPolicy
        );
        assert_eq!(
            route("DELETE", "/b?policy").operation,
            S3Operation::DeleteBucketPolicy
        );
        assert_eq!(
            route("PUT", "/b?settings").operation,
            S3Operation::UpdateBucketSettings
        );
        assert_eq!(
            route("GET", "/b?settings").operation,
            S3Operation::GetBucketSettings
        );
    }

    #[test]
    fn test_should_route_object_operations() {
        let ctx = route("PUT", "/b/path/to/key");
        assert_eq!(ctx.operation, S3Operation::PutObject);
        assert_eq!(ctx.bucket.as_deref(), Some("b"));
        assert_eq!(ctx.key.as_deref(), Some("path/to/key"));

        assert_eq!(route("GET", "/b/k").operation, S3Operation::GetObject);
        assert_eq!(route("HEAD", "/b/k").operation, S3Operation::HeadObject);
        assert_eq!(route("DELETE", "/b/k").operation, S3Operation::DeleteObject);
    }

    #[test]
    fn test_should_route_copy_object_from_header() {
        let ctx = route_with_headers("PUT", "/b/k", &[("x-amz-copy-source", "/src/key")]);
        assert_eq!(ctx.operation, S3Operation::CopyObject);
    }

    #[test]
    fn test_should_route_multipart_lifecycle() {
        assert_eq!(
            route("POST", "/b/k?uploads").operation,
            S3Operation::CreateMultipartUpload
        );
        assert_eq!(
            route("PUT", "/b/k?partNumber=1&uploadId=u").operation,
            S3Operation::UploadPart
        );
        assert_eq!(
            route("POST", "/b/k?uploadId=u").operation,
            S3Operation::CompleteMultipartUpload
        );
        assert_eq!(
            route("DELETE", "/b/k?uploadId=u").operation,
            S3Operation::AbortMultipartUpload
        );
        assert_eq!(
            route("GET", "/b/k?uploadId=u").operation,
            S3Operation::ListParts
        );
    }

    #[test]
    fn test_should_require_both_multipart_params_for_upload_part() {
        // partNumber alone is a plain put of a key with a strange query.
        assert_eq!(
            route("PUT", "/b/k?partNumber=1").operation,
            S3Operation::PutObject
        );
    }

    #[test]
    fn test_should_prefer_upload_part_over_copy_header() {
        let ctx = route_with_headers(
            "PUT",
            "/b/k?partNumber=1&uploadId=u",
            &[("x-amz-copy-source", "/src/key")],
        );
        assert_eq!(ctx.operation, S3Operation::UploadPart);
    }

    #[test]
    fn test_should_reject_bare_object_post() {
        let method = http::Method::POST;
        let uri: http::Uri = "/b/k".parse().expect("uri");
        let err = route_request(&method, &uri, &http::HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, S3ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_should_decode_percent_encoded_components() {
        let ctx = route("GET", "/b/my%20key%2Bplus");
        assert_eq!(ctx.key.as_deref(), Some("my key+plus"));

        let ctx = route("GET", "/b?prefix=a%2Fb&delimiter=%2F");
        assert_eq!(ctx.query_value("prefix"), Some("a/b"));
        assert_eq!(ctx.query_value("delimiter"), Some("/"));
    }

    #[test]
    fn test_should_treat_trailing_slash_as_bucket_only() {
        let ctx = route("GET", "/b/");
        assert_eq!(ctx.operation, S3Operation::ListObjects);
        assert!(ctx.key.is_none());
    }

    #[test]
    fn test_should_expose_bare_query_keys() {
        let ctx = route("POST", "/b/k?uploads");
        assert!(ctx.has_query("uploads"));
        assert_eq!(ctx.query_value("uploads"), Some(""));
        assert!(!ctx.has_query("uploadId"));
    }
}
