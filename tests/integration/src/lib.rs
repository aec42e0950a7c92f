//! End-to-end tests for the Stratus server.
//!
//! These tests require a running server and are marked `#[ignore]` so they
//! stay out of normal `cargo test` runs:
//!
//! ```text
//! STRATUS_TEST_ACCESS_KEY=... STRATUS_TEST_SECRET_KEY=... \
//!     cargo test -p stratus-integration -- --ignored
//! ```
//!
//! The endpoint defaults to `http://localhost:9000` and can be overridden
//! with `STRATUS_TEST_ENDPOINT`. The credentials must belong to an active
//! user on the target server (the bootstrap credentials work).

use std::sync::Once;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

pub mod test_bucket;
pub mod test_list;
pub mod test_multipart;
pub mod test_object;
pub mod test_policy;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// The server under test.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("STRATUS_TEST_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_owned())
}

fn test_credentials() -> Credentials {
    let access_key =
        std::env::var("STRATUS_TEST_ACCESS_KEY").unwrap_or_else(|_| "AKIATEST".to_owned());
    let secret_key =
        std::env::var("STRATUS_TEST_SECRET_KEY").unwrap_or_else(|_| "testsecret".to_owned());
    Credentials::new(access_key, secret_key, None, None, "stratus-integration")
}

/// An S3 client pointed at the server, path-style.
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    init_tracing();

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(test_credentials())
        .endpoint_url(endpoint_url())
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// A unique bucket name for one test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a bucket and return its name. Callers clean up with
/// [`cleanup_bucket`].
pub async fn create_test_bucket(client: &aws_sdk_s3::Client, prefix: &str) -> String {
    let name = test_bucket_name(prefix);
    client
        .create_bucket()
        .bucket(&name)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create bucket {name}: {e}"));
    name
}

/// Delete every object in a bucket, then the bucket itself.
pub async fn cleanup_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
    let mut marker: Option<String> = None;
    loop {
        let mut req = client.list_objects().bucket(bucket);
        if let Some(m) = marker.take() {
            req = req.marker(m);
        }
        let Ok(resp) = req.send().await else {
            return;
        };

        for object in resp.contents() {
            if let Some(key) = object.key() {
                let _ = client.delete_object().bucket(bucket).key(key).send().await;
            }
        }

        if resp.is_truncated() == Some(true) {
            marker = resp.next_marker().map(ToOwned::to_owned);
        } else {
            break;
        }
    }

    let _ = client.delete_bucket().bucket(bucket).send().await;
}
