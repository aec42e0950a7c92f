//! Authentication middleware and audit persistence over the metadata store.

use std::future::Future;
use std::pin::Pin;

use chrono::Utc;
use tracing::{debug, warn};

use stratus_auth::error::AuthError;
use stratus_auth::presign::{is_presigned_query, parse_presigned_params, verify_presigned_signature};
use stratus_auth::sigv4::{parse_authorization_header, verify_header_signature, VerifiedAuth};
use stratus_http::dispatch::{AuthContext, Authenticator};
use stratus_http::router::RoutingContext;
use stratus_http::service::{AuditRecord, AuditSink};
use stratus_meta::audit::AuditEvent;
use stratus_meta::MetaStore;
use stratus_model::{S3Error, S3ErrorCode};

/// Authenticates requests against credentials in the metadata store.
///
/// Flow per request (the `/health` bypass happens upstream in the HTTP
/// service):
///
/// 1. No `Authorization` header and no presigned query: the request may
///    still pass as anonymous when it is an object GET on a bucket whose
///    policy grants public read. Everything else is denied.
/// 2. Otherwise the access key is parsed out, resolved to an active
///    credential, the signature is verified with the credential's secret,
///    and the owning user must exist and be active.
#[derive(Debug, Clone)]
pub struct MetaAuthenticator {
    meta: MetaStore,
}

impl MetaAuthenticator {
    #[must_use]
    pub fn new(meta: MetaStore) -> Self {
        Self { meta }
    }

    async fn authenticate_inner(
        &self,
        parts: &http::request::Parts,
        ctx: &RoutingContext,
    ) -> Result<AuthContext, S3Error> {
        let raw_query = parts.uri.query().unwrap_or("");
        let has_auth_header = parts.headers.contains_key(http::header::AUTHORIZATION);
        let presigned = is_presigned_query(raw_query);

        if !has_auth_header && !presigned {
            return self.try_anonymous(ctx).await;
        }

        let access_key = if has_auth_header {
            let header = parts
                .headers
                .get(http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| S3Error::access_denied("Unreadable authorization header"))?;
            parse_authorization_header(header)
                .map_err(auth_parse_error)?
                .access_key
        } else {
            parse_presigned_params(raw_query)
                .map_err(auth_parse_error)?
                .access_key
        };

        let credential =
            stratus_meta::credentials::get_credential_by_access_key(self.meta.pool(), &access_key)
                .await
                .map_err(crate::service::meta_error)?
                .ok_or_else(|| {
                    S3Error::new(S3ErrorCode::InvalidAccessKeyId, "Invalid access key")
                })?;
        if credential.is_expired(Utc::now()) {
            return Err(S3Error::new(
                S3ErrorCode::InvalidAccessKeyId,
                "The access key has expired",
            ));
        }

        let verified = if presigned {
            verify_presigned_signature(parts, &credential.secret_key)
        } else {
            verify_header_signature(parts, &credential.secret_key)
        }
        .map_err(auth_verify_error)?;

        let user = stratus_meta::users::get_user_by_id(self.meta.pool(), credential.user_id)
            .await
            .map_err(crate::service::meta_error)?
            .filter(stratus_meta::User::is_active)
            .ok_or_else(|| S3Error::access_denied("User not found or disabled"))?;

        debug!(username = %user.username, access_key = %access_key, "request authenticated");

        let VerifiedAuth { content_sha256, .. } = verified;
        Ok(AuthContext::User {
            user_id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            access_key,
            content_sha256,
        })
    }

    /// The anonymous path: object GETs on public-read buckets only.
    async fn try_anonymous(&self, ctx: &RoutingContext) -> Result<AuthContext, S3Error> {
        let denied = || S3Error::access_denied("Missing authentication");

        if !ctx.operation.allows_anonymous() {
            return Err(denied());
        }
        let Some(bucket_name) = ctx.bucket.as_deref() else {
            return Err(denied());
        };

        let bucket = stratus_meta::buckets::get_bucket_by_name(self.meta.pool(), bucket_name)
            .await
            .map_err(crate::service::meta_error)?
            .ok_or_else(denied)?;

        let document = stratus_meta::policies::get_bucket_policy(self.meta.pool(), bucket.id)
            .await
            .map_err(crate::service::meta_error)?
            .ok_or_else(denied)?;

        let raw = serde_json::to_vec(&document).map_err(S3Error::internal)?;
        let policy = stratus_meta::BucketPolicy::parse(&raw).map_err(|err| {
            warn!(bucket = %bucket.name, error = %err, "stored bucket policy failed to parse");
            denied()
        })?;

        if policy.is_public_read() {
            debug!(bucket = %bucket.name, "granting anonymous public read");
            Ok(AuthContext::Anonymous)
        } else {
            Err(denied())
        }
    }
}

impl Authenticator for MetaAuthenticator {
    fn authenticate<'a>(
        &'a self,
        parts: &'a http::request::Parts,
        ctx: &'a RoutingContext,
    ) -> Pin<Box<dyn Future<Output = Result<AuthContext, S3Error>> + Send + 'a>> {
        Box::pin(self.authenticate_inner(parts, ctx))
    }
}

/// Parse-stage failures (malformed header / query) are denials.
fn auth_parse_error(err: AuthError) -> S3Error {
    S3Error::access_denied(err.to_string())
}

/// Verification-stage failures. Skewed clocks fail the same way a bad
/// signature does: the signed timestamp no longer proves anything.
fn auth_verify_error(err: AuthError) -> S3Error {
    match err {
        AuthError::SignatureDoesNotMatch | AuthError::RequestSkewed => S3Error::new(
            S3ErrorCode::SignatureDoesNotMatch,
            "The request signature we calculated does not match the signature you provided",
        ),
        AuthError::RequestExpired => S3Error::access_denied("Request has expired"),
        other => S3Error::access_denied(other.to_string()),
    }
}

/// Persists one audit row per request from a detached task. Failures are
/// logged and dropped; auditing never fails a request.
#[derive(Debug, Clone)]
pub struct MetaAuditSink {
    meta: MetaStore,
}

impl MetaAuditSink {
    #[must_use]
    pub fn new(meta: MetaStore) -> Self {
        Self { meta }
    }
}

impl AuditSink for MetaAuditSink {
    fn record(&self, record: AuditRecord) {
        let meta = self.meta.clone();
        let event = AuditEvent {
            user_id: record.user_id,
            username: record.username,
            action: record.action,
            resource: record.resource,
            method: record.method,
            status_code: i32::from(record.status_code),
            request_id: record.request_id,
        };
        tokio::spawn(async move {
            if let Err(err) = stratus_meta::audit::insert_audit_log(meta.pool(), &event).await {
                warn!(error = %err, action = %event.action, "failed to persist audit record");
            }
        });
    }
}
