//! Response construction helpers.

use chrono::{DateTime, Utc};
use tracing::error;

use stratus_model::S3Error;
use stratus_model::types::ErrorDocument;
use stratus_xml::error_to_xml;

use crate::body::S3ResponseBody;

/// Render an [`S3Error`] as its XML `<Error>` response.
#[must_use]
pub fn error_to_response(err: &S3Error, request_id: &str) -> http::Response<S3ResponseBody> {
    let doc = ErrorDocument {
        code: err.code.as_str().to_owned(),
        message: err.message.clone(),
        resource: err.resource.clone(),
        request_id: Some(request_id.to_owned()),
    };

    let body = match error_to_xml(&doc) {
        Ok(xml) => S3ResponseBody::from_xml(xml),
        Err(xml_err) => {
            // Nothing sane to send if the error document itself will not
            // render; fall back to an empty body with the right status.
            error!(error = %xml_err, "failed to render error document");
            S3ResponseBody::empty()
        }
    };

    http::Response::builder()
        .status(err.status_code())
        .header(http::header::CONTENT_TYPE, "application/xml")
        .body(body)
        .unwrap_or_else(|_| http::Response::new(S3ResponseBody::empty()))
}

/// An XML document response with the given status.
#[must_use]
pub fn xml_response(status: http::StatusCode, xml: Vec<u8>) -> http::Response<S3ResponseBody> {
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/xml")
        .body(S3ResponseBody::from_xml(xml))
        .unwrap_or_else(|_| http::Response::new(S3ResponseBody::empty()))
}

/// A status-only response with no body.
#[must_use]
pub fn empty_response(status: http::StatusCode) -> http::Response<S3ResponseBody> {
    http::Response::builder()
        .status(status)
        .body(S3ResponseBody::empty())
        .unwrap_or_else(|_| http::Response::new(S3ResponseBody::empty()))
}

/// Format a timestamp for HTTP date headers (`Last-Modified`).
#[must_use]
pub fn http_date(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Quote an ETag for the wire. ETags are surfaced quoted everywhere.
#[must_use]
pub fn quote_etag(etag: &str) -> String {
    format!("\"{etag}\"")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use stratus_model::S3ErrorCode;

    use super::*;

    #[test]
    fn test_should_render_error_response_with_status_and_xml() {
        let err = S3Error::no_such_bucket("ghost").with_resource("/ghost");
        let resp = error_to_response(&err, "req-42");
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers()
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/xml")
        );
    }

    #[test]
    fn test_should_map_conflict_errors_to_409() {
        let err = S3Error::new(S3ErrorCode::BucketNotEmpty, "not empty");
        let resp = error_to_response(&err, "req");
        assert_eq!(resp.status(), http::StatusCode::CONFLICT);
    }

    #[test]
    fn test_should_format_http_date() {
        let dt = Utc.with_ymd_and_hms(2026, 2, 3, 16, 45, 9).unwrap();
        assert_eq!(http_date(&dt), "Tue, 03 Feb 2026 16:45:09 GMT");
    }

    #[test]
    fn test_should_quote_etags() {
        assert_eq!(
            quote_etag("d41d8cd98f00b204e9800998ecf8427e"),
            "\"d41d8cd98f00b204e9800998ecf8427e\""
        );
    }
}
