//! ListObjects ordering, paging and delimiter tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    async fn put_keys(client: &aws_sdk_s3::Client, bucket: &str, keys: &[&str]) {
        for key in keys {
            client
                .put_object()
                .bucket(bucket)
                .key(*key)
                .body(ByteStream::from_static(b"x"))
                .send()
                .await
                .unwrap_or_else(|e| panic!("put {key}: {e}"));
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_keys_in_lexicographic_order() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "order").await;
        put_keys(&client, &bucket, &["cherry", "apple", "banana"]).await;

        let resp = client
            .list_objects()
            .bucket(&bucket)
            .send()
            .await
            .expect("list_objects");
        let keys: Vec<&str> = resp.contents().iter().filter_map(|o| o.key()).collect();
        assert_eq!(keys, vec!["apple", "banana", "cherry"]);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_group_prefixes_under_delimiter() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "delim").await;
        put_keys(
            &client,
            &bucket,
            &[
                "photos/2025/a.jpg",
                "photos/2025/b.jpg",
                "photos/2026/c.jpg",
                "photos/readme.txt",
            ],
        )
        .await;

        let resp = client
            .list_objects()
            .bucket(&bucket)
            .prefix("photos/")
            .delimiter("/")
            .send()
            .await
            .expect("list with delimiter");

        let prefixes: Vec<&str> = resp
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix())
            .collect();
        assert_eq!(prefixes, vec!["photos/2025/", "photos/2026/"]);

        let keys: Vec<&str> = resp.contents().iter().filter_map(|o| o.key()).collect();
        assert_eq!(keys, vec!["photos/readme.txt"]);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_page_with_marker() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "paging").await;
        put_keys(&client, &bucket, &["k1", "k2", "k3", "k4", "k5"]).await;

        let first = client
            .list_objects()
            .bucket(&bucket)
            .max_keys(2)
            .send()
            .await
            .expect("first page");
        assert_eq!(first.contents().len(), 2);
        assert_eq!(first.is_truncated(), Some(true));

        let marker = first
            .contents()
            .last()
            .and_then(|o| o.key())
            .expect("last key")
            .to_owned();
        let second = client
            .list_objects()
            .bucket(&bucket)
            .marker(marker)
            .send()
            .await
            .expect("second page");
        let keys: Vec<&str> = second.contents().iter().filter_map(|o| o.key()).collect();
        assert_eq!(keys, vec!["k3", "k4", "k5"]);
        assert_eq!(second.is_truncated(), Some(false));

        cleanup_bucket(&client, &bucket).await;
    }
}
