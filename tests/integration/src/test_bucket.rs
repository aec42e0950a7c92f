//! Bucket lifecycle tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client, test_bucket_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_head_and_delete_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "lifecycle").await;

        client
            .head_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect("head_bucket after create");

        client
            .delete_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect("delete_bucket");

        let head = client.head_bucket().bucket(&bucket).send().await;
        assert!(head.is_err(), "deleted bucket should not HEAD");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_created_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "listed").await;

        let resp = client.list_buckets().send().await.expect("list_buckets");
        let names: Vec<&str> = resp.buckets().iter().filter_map(|b| b.name()).collect();
        assert!(names.contains(&bucket.as_str()), "bucket missing from listing");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_invalid_bucket_names() {
        let client = s3_client();
        for name in ["ab", "UPPER", "double--hyphen", "-edge"] {
            let result = client.create_bucket().bucket(name).send().await;
            assert!(result.is_err(), "{name} should be rejected");
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_refuse_to_delete_non_empty_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "nonempty").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("blocker")
            .body(ByteStream::from_static(b"x"))
            .send()
            .await
            .expect("put blocker object");

        let err = client
            .delete_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect_err("delete of non-empty bucket must fail");
        let service_err = err.into_service_error();
        assert!(
            service_err.to_string().contains("BucketNotEmpty")
                || format!("{service_err:?}").contains("BucketNotEmpty"),
            "unexpected error: {service_err:?}"
        );

        // Removing the object unblocks the delete.
        client
            .delete_object()
            .bucket(&bucket)
            .key("blocker")
            .send()
            .await
            .expect("delete blocker");
        client
            .delete_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect("delete now-empty bucket");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_answer_404_for_missing_bucket() {
        let client = s3_client();
        let head = client
            .head_bucket()
            .bucket(test_bucket_name("ghost"))
            .send()
            .await;
        assert!(head.is_err());
    }
}
