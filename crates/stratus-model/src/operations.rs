//! The set of S3 operations Stratus serves.
//!
//! An operation is identified by the router from the HTTP method, the path
//! depth (service / bucket / object), the query-parameter subresources and,
//! for `CopyObject`, the `x-amz-copy-source` header.

use std::fmt;

/// An S3 operation resolved from an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3Operation {
    // Service level.
    /// `GET /`: list the caller's buckets.
    ListBuckets,

    // Bucket level.
    /// `PUT /{bucket}`: create a bucket.
    CreateBucket,
    /// `HEAD /{bucket}`: probe bucket existence.
    HeadBucket,
    /// `DELETE /{bucket}`: delete an empty bucket.
    DeleteBucket,
    /// `GET /{bucket}`: list objects (with prefix/delimiter/marker).
    ListObjects,
    /// `PUT /{bucket}?policy`: attach a bucket policy.
    PutBucketPolicy,
    /// `GET /{bucket}?policy`: fetch the bucket policy document.
    GetBucketPolicy,
    /// `DELETE /{bucket}?policy`: remove the bucket policy.
    DeleteBucketPolicy,
    /// `GET /{bucket}?settings`: read bucket settings (default expiry).
    GetBucketSettings,
    /// `PUT /{bucket}?settings`: update bucket settings.
    UpdateBucketSettings,

    // Object level.
    /// `PUT /{bucket}/{key}`: store an object.
    PutObject,
    /// `GET /{bucket}/{key}`: fetch an object (optionally ranged).
    GetObject,
    /// `HEAD /{bucket}/{key}`: fetch object metadata only.
    HeadObject,
    /// `DELETE /{bucket}/{key}`: delete an object.
    DeleteObject,
    /// `PUT /{bucket}/{key}` with `x-amz-copy-source`: server-side copy.
    CopyObject,

    // Multipart lifecycle.
    /// `POST /{bucket}/{key}?uploads`: start a multipart upload.
    CreateMultipartUpload,
    /// `PUT /{bucket}/{key}?partNumber=N&uploadId=U`: upload one part.
    UploadPart,
    /// `POST /{bucket}/{key}?uploadId=U`: assemble the uploaded parts.
    CompleteMultipartUpload,
    /// `DELETE /{bucket}/{key}?uploadId=U`: abandon the upload.
    AbortMultipartUpload,
    /// `GET /{bucket}/{key}?uploadId=U`: list the uploaded parts.
    ListParts,
}

impl S3Operation {
    /// The canonical operation name, as used in audit records and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListBuckets => "ListBuckets",
            Self::CreateBucket => "CreateBucket",
            Self::HeadBucket => "HeadBucket",
            Self::DeleteBucket => "DeleteBucket",
            Self::ListObjects => "ListObjects",
            Self::PutBucketPolicy => "PutBucketPolicy",
            Self::GetBucketPolicy => "GetBucketPolicy",
            Self::DeleteBucketPolicy => "DeleteBucketPolicy",
            Self::GetBucketSettings => "GetBucketSettings",
            Self::UpdateBucketSettings => "UpdateBucketSettings",
            Self::PutObject => "PutObject",
            Self::GetObject => "GetObject",
            Self::HeadObject => "HeadObject",
            Self::DeleteObject => "DeleteObject",
            Self::CopyObject => "CopyObject",
            Self::CreateMultipartUpload => "CreateMultipartUpload",
            Self::UploadPart => "UploadPart",
            Self::CompleteMultipartUpload => "CompleteMultipartUpload",
            Self::AbortMultipartUpload => "AbortMultipartUpload",
            Self::ListParts => "ListParts",
        }
    }

    /// Whether a public-read bucket policy can grant this operation to an
    /// anonymous caller. Only plain object GETs qualify.
    #[must_use]
    pub fn allows_anonymous(&self) -> bool {
        matches!(self, Self::GetObject)
    }
}

impl fmt::Display for S3Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_render_operation_names() {
        assert_eq!(S3Operation::ListBuckets.as_str(), "ListBuckets");
        assert_eq!(
            S3Operation::CompleteMultipartUpload.to_string(),
            "CompleteMultipartUpload"
        );
    }

    #[test]
    fn test_should_mark_only_object_gets_as_anonymous_eligible() {
        assert!(S3Operation::GetObject.allows_anonymous());
        assert!(!S3Operation::HeadObject.allows_anonymous());
        assert!(!S3Operation::PutObject.allows_anonymous());
        assert!(!S3Operation::ListObjects.allows_anonymous());
    }
}
