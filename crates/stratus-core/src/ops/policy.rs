//! Bucket policy operations: Put, Get, Delete.

use http::StatusCode;

use stratus_http::body::{S3RequestBody, collect_body};
use stratus_http::response::empty_response;
use stratus_http::router::RoutingContext;
use stratus_http::S3ResponseBody;
use stratus_meta::BucketPolicy;
use stratus_model::{S3Error, S3ErrorCode};

use crate::service::{StratusService, meta_error};

/// `PUT /{bucket}?policy`: validate and attach the policy document.
pub(crate) async fn put_bucket_policy(
    svc: &StratusService,
    ctx: &RoutingContext,
    body: S3RequestBody,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket = svc.resolve_bucket(ctx).await?;

    let raw = collect_body(body).await?;
    // Validate against the policy grammar before storing; the stored value
    // is the parsed JSON so the column always holds a well-formed document.
    BucketPolicy::parse(&raw).map_err(|err| {
        S3Error::new(S3ErrorCode::MalformedPolicy, format!("invalid policy: {err}"))
    })?;
    let document: serde_json::Value = serde_json::from_slice(&raw)
        .map_err(|err| S3Error::new(S3ErrorCode::MalformedPolicy, err.to_string()))?;

    stratus_meta::policies::set_bucket_policy(svc.meta.pool(), bucket.id, &document)
        .await
        .map_err(meta_error)?;

    Ok(empty_response(StatusCode::NO_CONTENT))
}

/// `GET /{bucket}?policy`: the raw policy document.
pub(crate) async fn get_bucket_policy(
    svc: &StratusService,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket = svc.resolve_bucket(ctx).await?;

    let document = stratus_meta::policies::get_bucket_policy(svc.meta.pool(), bucket.id)
        .await
        .map_err(meta_error)?
        .ok_or_else(|| {
            S3Error::new(S3ErrorCode::NoSuchBucketPolicy, "The bucket policy does not exist")
        })?;

    let body = serde_json::to_vec(&document).map_err(S3Error::internal)?;
    http::Response::builder()
        .status(StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(S3ResponseBody::from_bytes(body))
        .map_err(S3Error::internal)
}

/// `DELETE /{bucket}?policy`: detach the policy.
pub(crate) async fn delete_bucket_policy(
    svc: &StratusService,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket = svc.resolve_bucket(ctx).await?;

    stratus_meta::policies::delete_bucket_policy(svc.meta.pool(), bucket.id)
        .await
        .map_err(meta_error)?;

    Ok(empty_response(StatusCode::NO_CONTENT))
}
