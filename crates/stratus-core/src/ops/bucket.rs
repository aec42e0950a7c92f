//! Bucket-level operations: ListBuckets, CreateBucket, HeadBucket,
//! DeleteBucket.

use http::StatusCode;

use stratus_auth::validate_bucket_name;
use stratus_http::dispatch::AuthContext;
use stratus_http::response::{empty_response, xml_response};
use stratus_http::router::RoutingContext;
use stratus_http::S3ResponseBody;
use stratus_meta::MetaError;
use stratus_model::types::{BucketEntry, ListAllMyBucketsResult, Owner};
use stratus_model::{S3Error, S3ErrorCode};
use stratus_xml::to_xml;

use crate::service::{StratusService, meta_error, required_bucket};

/// `GET /`: the caller's buckets.
pub(crate) async fn list_buckets(
    svc: &StratusService,
    auth: &AuthContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let user_id = auth
        .user_id()
        .ok_or_else(|| S3Error::access_denied("Anonymous callers cannot list buckets"))?;

    let buckets = stratus_meta::buckets::list_buckets(svc.meta.pool(), user_id)
        .await
        .map_err(meta_error)?;

    let doc = ListAllMyBucketsResult {
        owner: Owner {
            id: user_id.to_string(),
            display_name: auth.username().unwrap_or_default().to_owned(),
        },
        buckets: buckets
            .into_iter()
            .map(|bucket| BucketEntry {
                name: bucket.name,
                creation_date: bucket.created_at,
            })
            .collect(),
    };

    let xml = to_xml("ListAllMyBucketsResult", &doc).map_err(S3Error::internal)?;
    Ok(xml_response(StatusCode::OK, xml))
}

/// `PUT /{bucket}`: create a bucket owned by the caller.
pub(crate) async fn create_bucket(
    svc: &StratusService,
    ctx: &RoutingContext,
    auth: &AuthContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let name = required_bucket(ctx)?;
    let user_id = auth
        .user_id()
        .ok_or_else(|| S3Error::access_denied("Anonymous callers cannot create buckets"))?;

    validate_bucket_name(name).map_err(|reason| {
        S3Error::new(S3ErrorCode::InvalidBucketName, reason)
    })?;

    if let Some(existing) = stratus_meta::buckets::get_bucket_by_name(svc.meta.pool(), name)
        .await
        .map_err(meta_error)?
    {
        let code = if existing.owner_id == user_id {
            S3ErrorCode::BucketAlreadyOwnedByYou
        } else {
            S3ErrorCode::BucketAlreadyExists
        };
        return Err(S3Error::new(code, "Bucket already exists"));
    }

    svc.store
        .create_bucket(name)
        .await
        .map_err(crate::service::store_error)?;

    match stratus_meta::buckets::create_bucket(svc.meta.pool(), name, user_id, &svc.region, "private")
        .await
    {
        Ok(_) => {}
        // Lost the race between the existence check and the insert.
        Err(MetaError::Conflict(_)) => {
            return Err(S3Error::new(
                S3ErrorCode::BucketAlreadyExists,
                "Bucket already exists",
            ));
        }
        Err(err) => return Err(meta_error(err)),
    }

    let response = http::Response::builder()
        .status(StatusCode::OK)
        .header(http::header::LOCATION, format!("/{name}"))
        .body(S3ResponseBody::empty())
        .map_err(S3Error::internal)?;
    Ok(response)
}

/// `HEAD /{bucket}`: existence probe. HEAD responses carry no body, so
/// missing buckets answer with a bare 404.
pub(crate) async fn head_bucket(
    svc: &StratusService,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let name = required_bucket(ctx)?;
    match stratus_meta::buckets::get_bucket_by_name(svc.meta.pool(), name)
        .await
        .map_err(meta_error)?
    {
        Some(bucket) => {
            let response = http::Response::builder()
                .status(StatusCode::OK)
                .header("x-amz-bucket-region", bucket.region)
                .body(S3ResponseBody::empty())
                .map_err(S3Error::internal)?;
            Ok(response)
        }
        None => Ok(empty_response(StatusCode::NOT_FOUND)),
    }
}

/// `DELETE /{bucket}`: owner-only, and only when empty.
pub(crate) async fn delete_bucket(
    svc: &StratusService,
    ctx: &RoutingContext,
    auth: &AuthContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket = svc.resolve_bucket(ctx).await?;

    if auth.user_id() != Some(bucket.owner_id) {
        return Err(S3Error::access_denied("Only the bucket owner can delete it"));
    }

    let (count, _) = stratus_meta::objects::bucket_stats(svc.meta.pool(), bucket.id)
        .await
        .map_err(meta_error)?;
    if count > 0 {
        return Err(S3Error::new(
            S3ErrorCode::BucketNotEmpty,
            "The bucket you tried to delete is not empty",
        ));
    }

    svc.store
        .delete_bucket(&bucket.name)
        .await
        .map_err(crate::service::store_error)?;
    stratus_meta::buckets::delete_bucket(svc.meta.pool(), bucket.id)
        .await
        .map_err(meta_error)?;

    Ok(empty_response(StatusCode::NO_CONTENT))
}
