//! Object-level operations: PutObject, GetObject, HeadObject, DeleteObject,
//! CopyObject.

use http::StatusCode;
use tracing::debug;

use stratus_auth::validate_object_key;
use stratus_http::body::{S3RequestBody, body_reader};
use stratus_http::dispatch::AuthContext;
use stratus_http::request::{
    content_length, content_type, extract_user_metadata, parse_copy_source, parse_range,
};
use stratus_http::response::{empty_response, http_date, quote_etag, xml_response};
use stratus_http::router::RoutingContext;
use stratus_http::S3ResponseBody;
use stratus_meta::{NewObject, ObjectRecord};
use stratus_model::types::CopyObjectResult;
use stratus_model::S3Error;
use stratus_xml::to_xml;

use crate::service::{StratusService, meta_error, required_key, store_error};

/// `PUT /{bucket}/{key}`: stream the body into the store, then commit the
/// metadata row. The file lands before the row so a dropped connection can
/// only orphan bytes, never corrupt the namespace.
pub(crate) async fn put_object(
    svc: &StratusService,
    parts: &http::request::Parts,
    ctx: &RoutingContext,
    body: S3RequestBody,
    auth: &AuthContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let key = required_key(ctx)?;
    validate_object_key(key).map_err(S3Error::invalid_argument)?;
    let bucket = svc.resolve_bucket(ctx).await?;

    let content_type = content_type(&parts.headers);
    let declared_size = content_length(&parts.headers);
    let metadata = extract_user_metadata(&parts.headers);

    let mut reader = body_reader(body);
    let outcome = svc
        .store
        .put(
            &bucket.name,
            key,
            &mut reader,
            declared_size,
            auth.content_sha256(),
        )
        .await
        .map_err(store_error)?;

    let object = NewObject {
        bucket_id: bucket.id,
        key: key.to_owned(),
        size: outcome.size as i64,
        etag: outcome.etag.clone(),
        content_type,
        storage_path: outcome.storage_path,
        metadata,
    };
    stratus_meta::objects::upsert_object(svc.meta.pool(), &object)
        .await
        .map_err(meta_error)?;

    debug!(bucket = %bucket.name, key, size = outcome.size, "stored object");

    let response = http::Response::builder()
        .status(StatusCode::OK)
        .header(http::header::ETAG, quote_etag(&outcome.etag))
        .body(S3ResponseBody::empty())
        .map_err(S3Error::internal)?;
    Ok(response)
}

/// `GET /{bucket}/{key}`: stream the object, honoring `Range`.
pub(crate) async fn get_object(
    svc: &StratusService,
    parts: &http::request::Parts,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let key = required_key(ctx)?;
    let bucket = svc.resolve_bucket(ctx).await?;

    let object = stratus_meta::objects::get_object(svc.meta.pool(), bucket.id, key)
        .await
        .map_err(meta_error)?
        .ok_or_else(|| S3Error::no_such_key(key))?;

    let range_header = parts
        .headers
        .get(http::header::RANGE)
        .and_then(|v| v.to_str().ok());

    if let Some(raw_range) = range_header {
        let range = parse_range(raw_range, object.size as u64)?;
        let (reader, _) = svc
            .store
            .get_range(&bucket.name, key, range.start, range.end)
            .await
            .map_err(store_error)?;

        let builder = object_headers(http::Response::builder().status(StatusCode::PARTIAL_CONTENT), &object)
            .header(http::header::CONTENT_LENGTH, range.len())
            .header(
                http::header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", range.start, range.end, object.size),
            );
        return builder
            .body(S3ResponseBody::streaming(reader, range.len()))
            .map_err(S3Error::internal);
    }

    let (reader, _) = svc
        .store
        .get(&bucket.name, key)
        .await
        .map_err(store_error)?;

    let builder = object_headers(http::Response::builder().status(StatusCode::OK), &object)
        .header(http::header::CONTENT_LENGTH, object.size);
    builder
        .body(S3ResponseBody::streaming(reader, object.size as u64))
        .map_err(S3Error::internal)
}

/// `HEAD /{bucket}/{key}`: object headers with no body. Missing buckets
/// and keys answer with a bare 404, as HEAD replies cannot carry an error
/// document.
pub(crate) async fn head_object(
    svc: &StratusService,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let key = required_key(ctx)?;
    let bucket = match svc.resolve_bucket(ctx).await {
        Ok(bucket) => bucket,
        Err(err) if err.code == stratus_model::S3ErrorCode::NoSuchBucket => {
            return Ok(empty_response(StatusCode::NOT_FOUND));
        }
        Err(err) => return Err(err),
    };

    let Some(object) = stratus_meta::objects::get_object(svc.meta.pool(), bucket.id, key)
        .await
        .map_err(meta_error)?
    else {
        return Ok(empty_response(StatusCode::NOT_FOUND));
    };

    object_headers(http::Response::builder().status(StatusCode::OK), &object)
        .header(http::header::CONTENT_LENGTH, object.size)
        .body(S3ResponseBody::empty())
        .map_err(S3Error::internal)
}

/// `DELETE /{bucket}/{key}`: idempotent removal from store and metadata.
pub(crate) async fn delete_object(
    svc: &StratusService,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let key = required_key(ctx)?;
    let bucket = svc.resolve_bucket(ctx).await?;

    // A missing file is not an error; the row is the source of truth.
    if let Err(err) = svc.store.delete(&bucket.name, key).await {
        if !err.is_not_found() {
            return Err(store_error(err));
        }
    }

    stratus_meta::objects::delete_object(svc.meta.pool(), bucket.id, key)
        .await
        .map_err(meta_error)?;

    Ok(empty_response(StatusCode::NO_CONTENT))
}

/// `PUT /{bucket}/{key}` + `x-amz-copy-source`: server-side copy.
pub(crate) async fn copy_object(
    svc: &StratusService,
    parts: &http::request::Parts,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let dst_key = required_key(ctx)?;
    validate_object_key(dst_key).map_err(S3Error::invalid_argument)?;
    let dst_bucket = svc.resolve_bucket(ctx).await?;

    let copy_source = parts
        .headers
        .get("x-amz-copy-source")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| S3Error::invalid_argument("missing x-amz-copy-source header"))?;
    let (src_bucket_name, src_key) = parse_copy_source(copy_source)?;

    let src_bucket = stratus_meta::buckets::get_bucket_by_name(svc.meta.pool(), &src_bucket_name)
        .await
        .map_err(meta_error)?
        .ok_or_else(|| S3Error::no_such_bucket(&src_bucket_name))?;

    let src_object = stratus_meta::objects::get_object(svc.meta.pool(), src_bucket.id, &src_key)
        .await
        .map_err(meta_error)?
        .ok_or_else(|| S3Error::no_such_key(&src_key))?;

    let outcome = svc
        .store
        .copy(&src_bucket.name, &src_key, &dst_bucket.name, dst_key)
        .await
        .map_err(store_error)?;

    let object = NewObject {
        bucket_id: dst_bucket.id,
        key: dst_key.to_owned(),
        size: outcome.size as i64,
        etag: outcome.etag.clone(),
        content_type: src_object.content_type.clone(),
        storage_path: outcome.storage_path,
        metadata: src_object.metadata.0.clone(),
    };
    stratus_meta::objects::upsert_object(svc.meta.pool(), &object)
        .await
        .map_err(meta_error)?;

    let doc = CopyObjectResult {
        last_modified: outcome.last_modified,
        etag: quote_etag(&outcome.etag),
    };
    let xml = to_xml("CopyObjectResult", &doc).map_err(S3Error::internal)?;
    Ok(xml_response(StatusCode::OK, xml))
}

/// The header set shared by GetObject and HeadObject responses.
fn object_headers(
    mut builder: http::response::Builder,
    object: &ObjectRecord,
) -> http::response::Builder {
    builder = builder
        .header(http::header::CONTENT_TYPE, &object.content_type)
        .header(http::header::ETAG, quote_etag(&object.etag))
        .header(http::header::LAST_MODIFIED, http_date(&object.updated_at))
        .header(http::header::ACCEPT_RANGES, "bytes");
    for (name, value) in object.metadata.0.iter() {
        builder = builder.header(format!("x-amz-meta-{name}"), value.as_str());
    }
    builder
}
