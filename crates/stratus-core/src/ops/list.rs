//! `GET /{bucket}`: ListObjects.

use http::StatusCode;

use stratus_http::response::{quote_etag, xml_response};
use stratus_http::router::RoutingContext;
use stratus_http::S3ResponseBody;
use stratus_meta::ListParams;
use stratus_model::types::{ListBucketResult, ObjectEntry};
use stratus_model::S3Error;
use stratus_xml::to_xml;

use crate::service::{StratusService, meta_error};

pub(crate) async fn list_objects(
    svc: &StratusService,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket = svc.resolve_bucket(ctx).await?;

    let params = ListParams {
        prefix: ctx.query_value("prefix").unwrap_or_default().to_owned(),
        delimiter: ctx.query_value("delimiter").unwrap_or_default().to_owned(),
        marker: ctx.query_value("marker").unwrap_or_default().to_owned(),
        max_keys: ctx
            .query_value("max-keys")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0),
    };
    let max_keys = stratus_meta::objects::effective_max_keys(params.max_keys);

    let listing = stratus_meta::objects::list_objects(svc.meta.pool(), bucket.id, &params)
        .await
        .map_err(meta_error)?;

    let doc = ListBucketResult {
        name: bucket.name,
        prefix: params.prefix.clone(),
        marker: params.marker.clone(),
        max_keys: max_keys as i32,
        delimiter: params.delimiter.clone(),
        is_truncated: listing.is_truncated,
        next_marker: listing.is_truncated.then(|| listing.next_marker.clone()).flatten(),
        contents: listing
            .objects
            .iter()
            .map(|object| ObjectEntry {
                key: object.key.clone(),
                last_modified: object.updated_at,
                etag: quote_etag(&object.etag),
                size: object.size,
                storage_class: object.storage_class.clone(),
            })
            .collect(),
        common_prefixes: listing.common_prefixes,
    };

    let xml = to_xml("ListBucketResult", &doc).map_err(S3Error::internal)?;
    Ok(xml_response(StatusCode::OK, xml))
}
