//! The handler and authenticator boundaries.
//!
//! `stratus-core` implements both traits; the HTTP service drives them.
//! Boxed futures keep the traits object-safe so the service can hold them
//! behind `Arc`s without generics leaking into hyper's connection plumbing.

use std::future::Future;
use std::pin::Pin;

use stratus_model::{S3Error, S3Operation};

use crate::body::{S3RequestBody, S3ResponseBody};
use crate::router::RoutingContext;

/// Who is making the request, as established by the auth middleware.
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// A signature-verified user.
    User {
        user_id: i64,
        username: String,
        is_admin: bool,
        access_key: String,
        /// Declared body digest to enforce while streaming, when the client
        /// signed a real `x-amz-content-sha256`.
        content_sha256: Option<String>,
    },
    /// Anonymous access granted by a public-read bucket policy.
    Anonymous,
}

impl AuthContext {
    /// The authenticated user id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Self::User { user_id, .. } => Some(*user_id),
            Self::Anonymous => None,
        }
    }

    /// The authenticated username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::User { username, .. } => Some(username),
            Self::Anonymous => None,
        }
    }

    /// The digest the request body must hash to, if one was signed.
    #[must_use]
    pub fn content_sha256(&self) -> Option<&str> {
        match self {
            Self::User { content_sha256, .. } => content_sha256.as_deref(),
            Self::Anonymous => None,
        }
    }
}

/// The business-logic boundary: one call per routed request.
pub trait S3Handler: Send + Sync + 'static {
    /// Execute the operation and produce the HTTP response.
    fn handle_operation(
        &self,
        op: S3Operation,
        parts: http::request::Parts,
        body: S3RequestBody,
        ctx: RoutingContext,
        auth: AuthContext,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send>>;
}

/// The authentication boundary, run before dispatch.
pub trait Authenticator: Send + Sync + 'static {
    /// Establish the caller's identity or reject the request.
    fn authenticate<'a>(
        &'a self,
        parts: &'a http::request::Parts,
        ctx: &'a RoutingContext,
    ) -> Pin<Box<dyn Future<Output = Result<AuthContext, S3Error>> + Send + 'a>>;
}

/// An authenticator that grants everything; test plumbing only.
#[derive(Debug, Clone, Default)]
pub struct AllowAllAuthenticator;

impl Authenticator for AllowAllAuthenticator {
    fn authenticate<'a>(
        &'a self,
        _parts: &'a http::request::Parts,
        _ctx: &'a RoutingContext,
    ) -> Pin<Box<dyn Future<Output = Result<AuthContext, S3Error>> + Send + 'a>> {
        Box::pin(async {
            Ok(AuthContext::User {
                user_id: 1,
                username: "test".to_owned(),
                is_admin: true,
                access_key: "AKIATEST".to_owned(),
                content_sha256: None,
            })
        })
    }
}
