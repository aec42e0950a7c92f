//! The hyper service tying the pipeline together.
//!
//! Per request: assign a request id, intercept health checks and CORS
//! preflight, route, authenticate, dispatch to the handler, attach the
//! common response headers, and hand an audit record to the sink. Request
//! bodies are passed through to the handler as a stream; they are never
//! collected here.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::body::{S3RequestBody, S3ResponseBody};
use crate::dispatch::{Authenticator, S3Handler};
use crate::response::error_to_response;
use crate::router::route_request;

/// One line of audit: what happened to whom, with what outcome.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    /// Operation name, or `"-"` when routing failed.
    pub action: String,
    pub resource: String,
    pub method: String,
    pub status_code: u16,
    pub request_id: String,
}

/// Consumer of audit records. Implementations must be fire-and-forget:
/// auditing never fails or delays a request.
pub trait AuditSink: Send + Sync + 'static {
    /// Accept one record.
    fn record(&self, record: AuditRecord);
}

/// A sink that drops every record.
#[derive(Debug, Clone, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _record: AuditRecord) {}
}

/// The S3 HTTP front end.
pub struct S3HttpService<H, A> {
    handler: Arc<H>,
    authenticator: Arc<A>,
    audit: Arc<dyn AuditSink>,
}

impl<H: S3Handler, A: Authenticator> S3HttpService<H, A> {
    /// Assemble the service.
    pub fn new(handler: Arc<H>, authenticator: Arc<A>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            handler,
            authenticator,
            audit,
        }
    }
}

impl<H, A> Clone for S3HttpService<H, A> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            authenticator: Arc::clone(&self.authenticator),
            audit: Arc::clone(&self.audit),
        }
    }
}

impl<H: S3Handler, A: Authenticator> Service<http::Request<Incoming>> for S3HttpService<H, A> {
    type Response = http::Response<S3ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let authenticator = Arc::clone(&self.authenticator);
        let audit = Arc::clone(&self.audit);

        Box::pin(async move {
            let request_id = Uuid::new_v4().to_string();
            let response =
                process_request(req, &*handler, &*authenticator, &*audit, &request_id).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

async fn process_request<H: S3Handler, A: Authenticator>(
    req: http::Request<Incoming>,
    handler: &H,
    authenticator: &A,
    audit: &dyn AuditSink,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    debug!(%method, %path, request_id, "processing request");

    if method == http::Method::GET && path == "/health" {
        return health_response();
    }
    if method == http::Method::OPTIONS {
        return cors_preflight_response();
    }

    let ctx = match route_request(req.method(), req.uri(), req.headers()) {
        Ok(ctx) => ctx,
        Err(err) => {
            warn!(%method, %path, error = %err, request_id, "failed to route request");
            let response = error_to_response(&err.with_resource(path.as_str()), request_id);
            emit_audit(audit, None, "-", &path, &method, response.status(), request_id);
            return response;
        }
    };

    let (parts, incoming) = req.into_parts();

    let auth = match authenticator.authenticate(&parts, &ctx).await {
        Ok(auth) => auth,
        Err(err) => {
            info!(operation = %ctx.operation, %path, error = %err, request_id, "authentication rejected");
            let response = error_to_response(&err.with_resource(path.as_str()), request_id);
            emit_audit(
                audit,
                None,
                ctx.operation.as_str(),
                &path,
                &method,
                response.status(),
                request_id,
            );
            return response;
        }
    };

    info!(
        operation = %ctx.operation,
        bucket = ?ctx.bucket,
        key = ?ctx.key,
        user = ?auth.username(),
        request_id,
        "dispatching request"
    );

    let body: S3RequestBody = incoming.map_err(|err| Box::new(err) as _).boxed();
    let operation = ctx.operation;
    let user_id = auth.user_id();
    let username = auth.username().map(ToOwned::to_owned);

    let response = match handler.handle_operation(operation, parts, body, ctx, auth).await {
        Ok(response) => response,
        Err(err) => {
            debug!(operation = %operation, error = %err, request_id, "operation returned error");
            error_to_response(&err.with_resource(path.as_str()), request_id)
        }
    };

    emit_audit(
        audit,
        user_id.zip(username),
        operation.as_str(),
        &path,
        &method,
        response.status(),
        request_id,
    );
    response
}

fn emit_audit(
    audit: &dyn AuditSink,
    user: Option<(i64, String)>,
    action: &str,
    resource: &str,
    method: &http::Method,
    status: http::StatusCode,
    request_id: &str,
) {
    let (user_id, username) = match user {
        Some((id, name)) => (Some(id), Some(name)),
        None => (None, None),
    };
    audit.record(AuditRecord {
        user_id,
        username,
        action: action.to_owned(),
        resource: resource.to_owned(),
        method: method.to_string(),
        status_code: status.as_u16(),
        request_id: request_id.to_owned(),
    });
}

fn health_response() -> http::Response<S3ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(S3ResponseBody::from_bytes(&b"{\"status\":\"ok\"}"[..]))
        .expect("static health response is valid")
}

fn cors_preflight_response() -> http::Response<S3ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header(
            "Access-Control-Allow-Methods",
            "GET, PUT, POST, DELETE, HEAD, OPTIONS",
        )
        .header(
            "Access-Control-Allow-Headers",
            "Authorization, Content-Type, X-Amz-Date, X-Amz-Content-Sha256, X-Amz-Security-Token",
        )
        .header("Access-Control-Max-Age", "86400")
        .body(S3ResponseBody::empty())
        .expect("static preflight response is valid")
}

fn add_common_headers(
    mut response: http::Response<S3ResponseBody>,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let headers = response.headers_mut();
    if let Ok(value) = http::header::HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", value);
    }
    headers.insert(
        http::header::SERVER,
        http::header::HeaderValue::from_static("Stratus"),
    );
    headers.insert(
        "Access-Control-Allow-Origin",
        http::header::HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Expose-Headers",
        http::header::HeaderValue::from_static("ETag, x-amz-request-id"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_produce_health_response() {
        let resp = health_response();
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn test_should_produce_cors_preflight_response() {
        let resp = cors_preflight_response();
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert!(resp.headers().contains_key("Access-Control-Allow-Methods"));
    }

    #[test]
    fn test_should_attach_common_headers() {
        let resp = http::Response::builder()
            .status(http::StatusCode::OK)
            .body(S3ResponseBody::empty())
            .expect("response");
        let resp = add_common_headers(resp, "req-1");
        assert_eq!(
            resp.headers()
                .get("x-amz-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-1")
        );
        assert_eq!(
            resp.headers()
                .get(http::header::SERVER)
                .and_then(|v| v.to_str().ok()),
            Some("Stratus")
        );
    }
}
