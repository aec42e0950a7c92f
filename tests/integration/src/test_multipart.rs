//! Multipart upload lifecycle tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_assemble_two_parts_with_composite_etag() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "mpu").await;

        let create = client
            .create_multipart_upload()
            .bucket(&bucket)
            .key("assembled")
            .send()
            .await
            .expect("create_multipart_upload");
        let upload_id = create.upload_id().expect("upload_id");

        let part1 = client
            .upload_part()
            .bucket(&bucket)
            .key("assembled")
            .upload_id(upload_id)
            .part_number(1)
            .body(ByteStream::from_static(b"aaaaa"))
            .send()
            .await
            .expect("upload part 1");
        let part2 = client
            .upload_part()
            .bucket(&bucket)
            .key("assembled")
            .upload_id(upload_id)
            .part_number(2)
            .body(ByteStream::from_static(b"bbbbb"))
            .send()
            .await
            .expect("upload part 2");

        let completed = CompletedMultipartUpload::builder()
            .parts(
                CompletedPart::builder()
                    .part_number(1)
                    .e_tag(part1.e_tag().unwrap_or_default())
                    .build(),
            )
            .parts(
                CompletedPart::builder()
                    .part_number(2)
                    .e_tag(part2.e_tag().unwrap_or_default())
                    .build(),
            )
            .build();

        let complete = client
            .complete_multipart_upload()
            .bucket(&bucket)
            .key("assembled")
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .expect("complete_multipart_upload");
        let etag = complete.e_tag().expect("etag");
        assert!(etag.ends_with("-2\""), "composite etag expected, got {etag}");

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("assembled")
            .send()
            .await
            .expect("get assembled object");
        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"aaaaabbbbb");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_uploaded_parts() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "parts").await;

        let create = client
            .create_multipart_upload()
            .bucket(&bucket)
            .key("listed")
            .send()
            .await
            .expect("create");
        let upload_id = create.upload_id().expect("upload_id");

        for number in 1..=3 {
            client
                .upload_part()
                .bucket(&bucket)
                .key("listed")
                .upload_id(upload_id)
                .part_number(number)
                .body(ByteStream::from(vec![number as u8; 16]))
                .send()
                .await
                .unwrap_or_else(|e| panic!("upload part {number}: {e}"));
        }

        let parts = client
            .list_parts()
            .bucket(&bucket)
            .key("listed")
            .upload_id(upload_id)
            .send()
            .await
            .expect("list_parts");
        let numbers: Vec<i32> = parts.parts().iter().filter_map(|p| p.part_number()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        client
            .abort_multipart_upload()
            .bucket(&bucket)
            .key("listed")
            .upload_id(upload_id)
            .send()
            .await
            .expect("abort");
        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_upload_after_abort() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "abort").await;

        let create = client
            .create_multipart_upload()
            .bucket(&bucket)
            .key("aborted")
            .send()
            .await
            .expect("create");
        let upload_id = create.upload_id().expect("upload_id").to_owned();

        client
            .abort_multipart_upload()
            .bucket(&bucket)
            .key("aborted")
            .upload_id(&upload_id)
            .send()
            .await
            .expect("abort");

        let late = client
            .upload_part()
            .bucket(&bucket)
            .key("aborted")
            .upload_id(&upload_id)
            .part_number(1)
            .body(ByteStream::from_static(b"late"))
            .send()
            .await;
        assert!(late.is_err(), "upload after abort must fail");

        cleanup_bucket(&client, &bucket).await;
    }
}
