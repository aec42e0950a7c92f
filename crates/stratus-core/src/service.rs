//! The handler entry point and shared translation helpers.

use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use stratus_http::body::S3RequestBody;
use stratus_http::dispatch::{AuthContext, S3Handler};
use stratus_http::router::RoutingContext;
use stratus_http::S3ResponseBody;
use stratus_meta::{Bucket, MetaError, MetaStore};
use stratus_model::{S3Error, S3ErrorCode, S3Operation};
use stratus_store::{FsStore, StoreError};

use crate::ops;

/// The S3 business logic: metadata store + storage engine + home region.
#[derive(Debug, Clone)]
pub struct StratusService {
    pub(crate) meta: MetaStore,
    pub(crate) store: FsStore,
    pub(crate) region: String,
}

impl StratusService {
    /// Assemble the service.
    #[must_use]
    pub fn new(meta: MetaStore, store: FsStore, region: impl Into<String>) -> Self {
        Self {
            meta,
            store,
            region: region.into(),
        }
    }

    /// The bucket named in the routing context, or the matching S3 error.
    pub(crate) async fn resolve_bucket(&self, ctx: &RoutingContext) -> Result<Bucket, S3Error> {
        let name = required_bucket(ctx)?;
        stratus_meta::buckets::get_bucket_by_name(self.meta.pool(), name)
            .await
            .map_err(meta_error)?
            .ok_or_else(|| S3Error::no_such_bucket(name))
    }
}

/// The bucket path component, which the router guarantees for every
/// bucket- and object-level operation.
pub(crate) fn required_bucket(ctx: &RoutingContext) -> Result<&str, S3Error> {
    ctx.bucket
        .as_deref()
        .ok_or_else(|| S3Error::new(S3ErrorCode::InvalidRequest, "missing bucket in request path"))
}

/// The key path component, for object-level operations.
pub(crate) fn required_key(ctx: &RoutingContext) -> Result<&str, S3Error> {
    ctx.key
        .as_deref()
        .ok_or_else(|| S3Error::new(S3ErrorCode::InvalidRequest, "missing key in request path"))
}

/// Metadata-store failures cross the handler boundary as `InternalError`;
/// conflict cases are matched explicitly where a handler expects them.
pub(crate) fn meta_error(err: MetaError) -> S3Error {
    warn!(error = %err, "metadata store error");
    S3Error::internal(err)
}

/// Storage-engine failures, mapped by class: missing files keep their
/// not-found meaning, digest mismatches surface as the 400 the client can
/// act on, everything else is internal.
pub(crate) fn store_error(err: StoreError) -> S3Error {
    match &err {
        StoreError::NotFound(what) => S3Error::no_such_key(what),
        StoreError::DigestMismatch { declared, computed } => S3Error::new(
            S3ErrorCode::XAmzContentSHA256Mismatch,
            format!(
                "The provided x-amz-content-sha256 does not match what was computed: declared {declared}, computed {computed}"
            ),
        ),
        StoreError::SizeMismatch { declared, written } => S3Error::invalid_argument(format!(
            "Request body ended after {written} bytes, Content-Length declared {declared}"
        )),
        StoreError::InvalidPath(_) | StoreError::Io(_) => {
            warn!(error = %err, "storage engine error");
            S3Error::internal(err)
        }
    }
}

impl S3Handler for StratusService {
    fn handle_operation(
        &self,
        op: S3Operation,
        parts: http::request::Parts,
        body: S3RequestBody,
        ctx: RoutingContext,
        auth: AuthContext,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send>>
    {
        let svc = self.clone();
        Box::pin(async move {
            match op {
                S3Operation::ListBuckets => ops::bucket::list_buckets(&svc, &auth).await,
                S3Operation::CreateBucket => ops::bucket::create_bucket(&svc, &ctx, &auth).await,
                S3Operation::HeadBucket => ops::bucket::head_bucket(&svc, &ctx).await,
                S3Operation::DeleteBucket => ops::bucket::delete_bucket(&svc, &ctx, &auth).await,
                S3Operation::ListObjects => ops::list::list_objects(&svc, &ctx).await,
                S3Operation::PutBucketPolicy => {
                    ops::policy::put_bucket_policy(&svc, &ctx, body).await
                }
                S3Operation::GetBucketPolicy => ops::policy::get_bucket_policy(&svc, &ctx).await,
                S3Operation::DeleteBucketPolicy => {
                    ops::policy::delete_bucket_policy(&svc, &ctx).await
                }
                S3Operation::GetBucketSettings => {
                    ops::settings::get_bucket_settings(&svc, &ctx).await
                }
                S3Operation::UpdateBucketSettings => {
                    ops::settings::update_bucket_settings(&svc, &ctx, body).await
                }
                S3Operation::PutObject => {
                    ops::object::put_object(&svc, &parts, &ctx, body, &auth).await
                }
                S3Operation::GetObject => ops::object::get_object(&svc, &parts, &ctx).await,
                S3Operation::HeadObject => ops::object::head_object(&svc, &ctx).await,
                S3Operation::DeleteObject => ops::object::delete_object(&svc, &ctx).await,
                S3Operation::CopyObject => ops::object::copy_object(&svc, &parts, &ctx).await,
                S3Operation::CreateMultipartUpload => {
                    ops::multipart::create_multipart_upload(&svc, &parts, &ctx).await
                }
                S3Operation::UploadPart => {
                    ops::multipart::upload_part(&svc, &parts, &ctx, body, &auth).await
                }
                S3Operation::CompleteMultipartUpload => {
                    ops::multipart::complete_multipart_upload(&svc, &ctx, body).await
                }
                S3Operation::AbortMultipartUpload => {
                    ops::multipart::abort_multipart_upload(&svc, &ctx).await
                }
                S3Operation::ListParts => ops::multipart::list_parts(&svc, &ctx).await,
            }
        })
    }
}
