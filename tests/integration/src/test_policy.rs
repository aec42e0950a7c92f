//! Bucket policy and anonymous access tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, endpoint_url, s3_client};

    fn public_read_policy(bucket: &str) -> String {
        format!(
            r#"{{"Version":"2012-10-17","Statement":[{{"Effect":"Allow","Principal":"*","Action":"s3:GetObject","Resource":"arn:aws:s3:::{bucket}/*"}}]}}"#
        )
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_grant_anonymous_read_with_public_policy() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "pub").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("file")
            .body(ByteStream::from_static(b"public content"))
            .send()
            .await
            .expect("put object");

        let anonymous = reqwest::Client::new();
        let url = format!("{}/{bucket}/file", endpoint_url());

        // Without a policy, anonymous access is denied.
        let denied = anonymous.get(&url).send().await.expect("anonymous get");
        assert_eq!(denied.status(), 403);

        client
            .put_bucket_policy()
            .bucket(&bucket)
            .policy(public_read_policy(&bucket))
            .send()
            .await
            .expect("put policy");

        let granted = anonymous.get(&url).send().await.expect("anonymous get");
        assert_eq!(granted.status(), 200);
        assert_eq!(granted.text().await.expect("body"), "public content");

        // Removing the policy closes the door again.
        client
            .delete_bucket_policy()
            .bucket(&bucket)
            .send()
            .await
            .expect("delete policy");
        let redenied = anonymous.get(&url).send().await.expect("anonymous get");
        assert_eq!(redenied.status(), 403);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_policy_document() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "poldoc").await;

        let missing = client.get_bucket_policy().bucket(&bucket).send().await;
        assert!(missing.is_err(), "no policy attached yet");

        client
            .put_bucket_policy()
            .bucket(&bucket)
            .policy(public_read_policy(&bucket))
            .send()
            .await
            .expect("put policy");

        let fetched = client
            .get_bucket_policy()
            .bucket(&bucket)
            .send()
            .await
            .expect("get policy");
        let body = fetched.policy().expect("policy body");
        assert!(body.contains("s3:GetObject"));
        assert!(body.contains(&bucket));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_malformed_policy() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "badpol").await;

        let result = client
            .put_bucket_policy()
            .bucket(&bucket)
            .policy("{not json")
            .send()
            .await;
        assert!(result.is_err(), "malformed policy must be rejected");

        cleanup_bucket(&client, &bucket).await;
    }
}
