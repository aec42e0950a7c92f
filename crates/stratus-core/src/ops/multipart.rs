//! The multipart upload lifecycle: Create, UploadPart, Complete, Abort,
//! ListParts.

use http::StatusCode;
use tracing::debug;
use uuid::Uuid;

use stratus_auth::validate_object_key;
use stratus_http::body::{S3RequestBody, body_reader, collect_body};
use stratus_http::dispatch::AuthContext;
use stratus_http::request::{content_length, extract_user_metadata};
use stratus_http::response::{empty_response, quote_etag, xml_response};
use stratus_http::router::RoutingContext;
use stratus_http::S3ResponseBody;
use stratus_meta::{MultipartUpload, NewObject};
use stratus_model::types::{
    CompleteMultipartUploadRequest, CompleteMultipartUploadResult, InitiateMultipartUploadResult,
    ListPartsResult, PartEntry,
};
use stratus_model::{S3Error, S3ErrorCode};
use stratus_store::PartInfo;
use stratus_xml::{from_xml, to_xml};

use crate::service::{StratusService, meta_error, required_key, store_error};

/// Part numbers accepted by UploadPart.
const MIN_PART_NUMBER: i32 = 1;
const MAX_PART_NUMBER: i32 = 10_000;

/// `MaxParts` advertised by ListParts.
const MAX_LISTED_PARTS: i32 = 1000;

/// `POST /{bucket}/{key}?uploads`: open a multipart upload.
pub(crate) async fn create_multipart_upload(
    svc: &StratusService,
    parts: &http::request::Parts,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let key = required_key(ctx)?;
    validate_object_key(key).map_err(S3Error::invalid_argument)?;
    let bucket = svc.resolve_bucket(ctx).await?;

    let upload_id = Uuid::new_v4().to_string();
    svc.store
        .init_multipart(&upload_id)
        .await
        .map_err(store_error)?;

    let content_type = parts
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());
    let metadata = extract_user_metadata(&parts.headers);

    stratus_meta::multipart::create_multipart_upload(
        svc.meta.pool(),
        &upload_id,
        bucket.id,
        key,
        content_type,
        &metadata,
    )
    .await
    .map_err(meta_error)?;

    debug!(bucket = %bucket.name, key, upload_id, "created multipart upload");

    let doc = InitiateMultipartUploadResult {
        bucket: bucket.name,
        key: key.to_owned(),
        upload_id,
    };
    let xml = to_xml("InitiateMultipartUploadResult", &doc).map_err(S3Error::internal)?;
    Ok(xml_response(StatusCode::OK, xml))
}

/// `PUT /{bucket}/{key}?partNumber=N&uploadId=U`: stage one part.
pub(crate) async fn upload_part(
    svc: &StratusService,
    parts: &http::request::Parts,
    ctx: &RoutingContext,
    body: S3RequestBody,
    auth: &AuthContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let part_number: i32 = ctx
        .query_value("partNumber")
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| S3Error::invalid_argument("partNumber must be an integer"))?;
    if !(MIN_PART_NUMBER..=MAX_PART_NUMBER).contains(&part_number) {
        return Err(S3Error::invalid_argument(format!(
            "part number must be between {MIN_PART_NUMBER} and {MAX_PART_NUMBER}"
        )));
    }

    let upload = resolve_upload(svc, ctx).await?;

    let declared_size = content_length(&parts.headers);
    let mut reader = body_reader(body);
    let outcome = svc
        .store
        .put_part(
            &upload.upload_id,
            part_number,
            &mut reader,
            declared_size,
            auth.content_sha256(),
        )
        .await
        .map_err(store_error)?;

    stratus_meta::multipart::upsert_upload_part(
        svc.meta.pool(),
        &upload.upload_id,
        part_number,
        outcome.size as i64,
        &outcome.etag,
        &outcome.storage_path,
    )
    .await
    .map_err(meta_error)?;

    let response = http::Response::builder()
        .status(StatusCode::OK)
        .header(http::header::ETAG, quote_etag(&outcome.etag))
        .body(S3ResponseBody::empty())
        .map_err(S3Error::internal)?;
    Ok(response)
}

/// `POST /{bucket}/{key}?uploadId=U`: validate the claimed parts, assemble
/// them, commit the object row and drop the upload state in one
/// transaction.
pub(crate) async fn complete_multipart_upload(
    svc: &StratusService,
    ctx: &RoutingContext,
    body: S3RequestBody,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let key = required_key(ctx)?;
    let bucket = svc.resolve_bucket(ctx).await?;
    let upload = resolve_upload(svc, ctx).await?;

    let raw = collect_body(body).await?;
    let request: CompleteMultipartUploadRequest = from_xml(&raw).map_err(|err| {
        S3Error::new(S3ErrorCode::MalformedXML, format!("invalid XML body: {err}"))
    })?;
    if request.parts.is_empty() {
        return Err(S3Error::new(
            S3ErrorCode::MalformedXML,
            "CompleteMultipartUpload requires at least one part",
        ));
    }

    // The client-supplied order must already be ascending; the assembly
    // honors it verbatim.
    let ascending = request
        .parts
        .windows(2)
        .all(|pair| pair[0].part_number < pair[1].part_number);
    if !ascending {
        return Err(S3Error::new(
            S3ErrorCode::InvalidPartOrder,
            "The list of parts was not in ascending order",
        ));
    }

    let stored = stratus_meta::multipart::get_upload_parts(svc.meta.pool(), &upload.upload_id)
        .await
        .map_err(meta_error)?;

    let mut assembly = Vec::with_capacity(request.parts.len());
    for claimed in &request.parts {
        let matched = stored
            .iter()
            .find(|part| part.part_number == claimed.part_number)
            .filter(|part| part.etag == claimed.bare_etag());
        match matched {
            Some(part) => assembly.push(PartInfo {
                part_number: part.part_number,
            }),
            None => {
                return Err(S3Error::new(
                    S3ErrorCode::InvalidPart,
                    format!("Part {} was not found or does not match", claimed.part_number),
                ));
            }
        }
    }

    let outcome = svc
        .store
        .complete_parts(&bucket.name, key, &upload.upload_id, &assembly)
        .await
        .map_err(store_error)?;

    let object = NewObject {
        bucket_id: bucket.id,
        key: key.to_owned(),
        size: outcome.size as i64,
        etag: outcome.etag.clone(),
        content_type: upload
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_owned()),
        storage_path: outcome.storage_path,
        metadata: upload.metadata.0.clone(),
    };

    let mut tx = svc.meta.begin().await.map_err(meta_error)?;
    stratus_meta::objects::upsert_object(&mut *tx, &object)
        .await
        .map_err(meta_error)?;
    stratus_meta::multipart::delete_upload_parts(&mut *tx, &upload.upload_id)
        .await
        .map_err(meta_error)?;
    stratus_meta::multipart::delete_multipart_upload(&mut *tx, &upload.upload_id)
        .await
        .map_err(meta_error)?;
    tx.commit().await.map_err(|err| meta_error(err.into()))?;

    debug!(
        bucket = %bucket.name,
        key,
        upload_id = %upload.upload_id,
        parts = assembly.len(),
        size = outcome.size,
        "completed multipart upload"
    );

    let doc = CompleteMultipartUploadResult {
        location: format!("/{}/{key}", bucket.name),
        bucket: bucket.name,
        key: key.to_owned(),
        etag: quote_etag(&outcome.etag),
    };
    let xml = to_xml("CompleteMultipartUploadResult", &doc).map_err(S3Error::internal)?;
    Ok(xml_response(StatusCode::OK, xml))
}

/// `DELETE /{bucket}/{key}?uploadId=U`: discard the upload and its parts.
pub(crate) async fn abort_multipart_upload(
    svc: &StratusService,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let upload = resolve_upload(svc, ctx).await?;

    svc.store
        .abort_multipart(&upload.upload_id)
        .await
        .map_err(store_error)?;

    let mut tx = svc.meta.begin().await.map_err(meta_error)?;
    stratus_meta::multipart::delete_upload_parts(&mut *tx, &upload.upload_id)
        .await
        .map_err(meta_error)?;
    stratus_meta::multipart::delete_multipart_upload(&mut *tx, &upload.upload_id)
        .await
        .map_err(meta_error)?;
    tx.commit().await.map_err(|err| meta_error(err.into()))?;

    Ok(empty_response(StatusCode::NO_CONTENT))
}

/// `GET /{bucket}/{key}?uploadId=U`: the staged parts, ascending.
pub(crate) async fn list_parts(
    svc: &StratusService,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket = svc.resolve_bucket(ctx).await?;
    let upload = resolve_upload(svc, ctx).await?;

    let parts = stratus_meta::multipart::get_upload_parts(svc.meta.pool(), &upload.upload_id)
        .await
        .map_err(meta_error)?;

    let doc = ListPartsResult {
        bucket: bucket.name,
        key: upload.key.clone(),
        upload_id: upload.upload_id.clone(),
        max_parts: MAX_LISTED_PARTS,
        is_truncated: false,
        parts: parts
            .iter()
            .map(|part| PartEntry {
                part_number: part.part_number,
                last_modified: part.created_at,
                etag: quote_etag(&part.etag),
                size: part.size,
            })
            .collect(),
    };

    let xml = to_xml("ListPartsResult", &doc).map_err(S3Error::internal)?;
    Ok(xml_response(StatusCode::OK, xml))
}

/// The upload named by `uploadId`, or `NoSuchUpload`.
async fn resolve_upload(
    svc: &StratusService,
    ctx: &RoutingContext,
) -> Result<MultipartUpload, S3Error> {
    let upload_id = ctx
        .query_value("uploadId")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| S3Error::invalid_argument("missing uploadId"))?;

    stratus_meta::multipart::get_multipart_upload(svc.meta.pool(), upload_id)
        .await
        .map_err(meta_error)?
        .ok_or_else(|| S3Error::no_such_upload(upload_id))
}
