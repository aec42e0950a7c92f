//! Object round-trip, range and copy tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_object_with_md5_etag() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "roundtrip").await;

        let put = client
            .put_object()
            .bucket(&bucket)
            .key("hello")
            .body(ByteStream::from_static(b"world"))
            .send()
            .await
            .expect("put_object");
        assert_eq!(
            put.e_tag(),
            Some("\"7d793037a0760186574b0282f2f435e7\""),
            "ETag must be the quoted hex MD5 of the body"
        );

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("hello")
            .send()
            .await
            .expect("get_object");
        assert_eq!(
            resp.e_tag(),
            Some("\"7d793037a0760186574b0282f2f435e7\"")
        );
        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"world");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_serve_range_reads() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "range").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("digits")
            .body(ByteStream::from_static(b"0123456789"))
            .send()
            .await
            .expect("put digits");

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("digits")
            .range("bytes=2-5")
            .send()
            .await
            .expect("ranged get");
        assert_eq!(resp.content_range(), Some("bytes 2-5/10"));
        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"2345");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_object_between_buckets() {
        let client = s3_client();
        let src = create_test_bucket(&client, "copysrc").await;
        let dst = create_test_bucket(&client, "copydst").await;

        client
            .put_object()
            .bucket(&src)
            .key("original")
            .body(ByteStream::from_static(b"copy me"))
            .send()
            .await
            .expect("put source");

        let copy = client
            .copy_object()
            .bucket(&dst)
            .key("duplicate")
            .copy_source(format!("{src}/original"))
            .send()
            .await
            .expect("copy_object");
        assert!(copy.copy_object_result().is_some());

        let resp = client
            .get_object()
            .bucket(&dst)
            .key("duplicate")
            .send()
            .await
            .expect("get copy");
        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"copy me");

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_404_after_delete() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "deleted").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("ephemeral")
            .body(ByteStream::from_static(b"x"))
            .send()
            .await
            .expect("put");
        client
            .delete_object()
            .bucket(&bucket)
            .key("ephemeral")
            .send()
            .await
            .expect("delete");

        let get = client
            .get_object()
            .bucket(&bucket)
            .key("ephemeral")
            .send()
            .await;
        assert!(get.is_err(), "deleted object must be gone");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_user_metadata() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "meta").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("annotated")
            .metadata("author", "integration")
            .body(ByteStream::from_static(b"x"))
            .send()
            .await
            .expect("put with metadata");

        let head = client
            .head_object()
            .bucket(&bucket)
            .key("annotated")
            .send()
            .await
            .expect("head");
        assert_eq!(
            head.metadata().and_then(|m| m.get("author")).map(String::as_str),
            Some("integration")
        );

        cleanup_bucket(&client, &bucket).await;
    }
}
