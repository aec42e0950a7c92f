//! The `?settings` bucket subresource: the default-expiry duration used
//! when presigning links for the bucket. JSON in and out; this is a
//! service extension, not part of the S3 XML surface.

use http::StatusCode;
use serde::{Deserialize, Serialize};

use stratus_http::body::{S3RequestBody, collect_body};
use stratus_http::router::RoutingContext;
use stratus_http::S3ResponseBody;
use stratus_model::S3Error;

use crate::duration::{format_duration, parse_duration};
use crate::service::{StratusService, meta_error};

/// Shortest accepted default expiry.
const MIN_EXPIRY_SECS: u64 = 10;
/// Longest accepted default expiry: 30 days.
const MAX_EXPIRY_SECS: u64 = 30 * 24 * 3600;

#[derive(Debug, Deserialize)]
struct UpdateSettingsRequest {
    #[serde(default)]
    default_expiry: String,
}

#[derive(Debug, Serialize)]
struct SettingsResponse {
    default_expiry: Option<String>,
}

/// `GET /{bucket}?settings`.
pub(crate) async fn get_bucket_settings(
    svc: &StratusService,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket = svc.resolve_bucket(ctx).await?;
    json_response(
        StatusCode::OK,
        &SettingsResponse {
            default_expiry: bucket.default_expiry,
        },
    )
}

/// `PUT /{bucket}?settings`: set or clear the default expiry.
pub(crate) async fn update_bucket_settings(
    svc: &StratusService,
    ctx: &RoutingContext,
    body: S3RequestBody,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let raw = collect_body(body).await?;
    let request: UpdateSettingsRequest = serde_json::from_slice(&raw)
        .map_err(|err| S3Error::invalid_argument(format!("invalid request body: {err}")))?;

    let normalized = if request.default_expiry.is_empty() {
        None
    } else {
        let duration = parse_duration(&request.default_expiry)
            .map_err(|err| S3Error::invalid_argument(format!("invalid duration: {err}")))?;
        let secs = duration.as_secs();
        if secs < MIN_EXPIRY_SECS {
            return Err(S3Error::invalid_argument(
                "expiry must be at least 10 seconds",
            ));
        }
        if secs > MAX_EXPIRY_SECS {
            return Err(S3Error::invalid_argument("expiry cannot exceed 30 days"));
        }
        Some(format_duration(duration))
    };

    let mut bucket = svc.resolve_bucket(ctx).await?;
    bucket.default_expiry = normalized;
    stratus_meta::buckets::update_bucket(svc.meta.pool(), &bucket)
        .await
        .map_err(meta_error)?;

    json_response(
        StatusCode::OK,
        &SettingsResponse {
            default_expiry: bucket.default_expiry,
        },
    )
}

fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let body = serde_json::to_vec(value).map_err(S3Error::internal)?;
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(S3ResponseBody::from_bytes(body))
        .map_err(S3Error::internal)
}
