//! Rendering response documents as S3 XML.
//!
//! [`S3Serialize`] implementors write their child elements into an open
//! writer; [`to_xml`] wraps them with the XML declaration and the namespaced
//! root element. Element names and ordering match the S3 reference documents
//! exactly, because AWS SDK decoders are strict about both.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Error as QxError;

type QxResult<T> = Result<T, QxError>;

use stratus_model::types::{
    BucketEntry, CompleteMultipartUploadResult, CopyObjectResult, ErrorDocument,
    InitiateMultipartUploadResult, ListAllMyBucketsResult, ListBucketResult, ListPartsResult,
    ObjectEntry, Owner, PartEntry,
};

use crate::error::XmlError;

/// The S3 XML namespace carried on response root elements.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Serialize a type as child elements of an already-opened XML element.
///
/// Uses `io::Result` because that is what `quick_xml::Writer`'s
/// element-builder closures expect.
pub trait S3Serialize {
    /// Write this value's child elements into `writer`.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()>;
}

/// Render a complete S3 XML document: declaration, namespaced root, content.
///
/// # Errors
///
/// Returns [`XmlError`] if writing fails.
pub fn to_xml<T: S3Serialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

/// Render the `<Error>` document. Unlike the result documents, the error
/// root carries no namespace attribute.
///
/// # Errors
///
/// Returns [`XmlError`] if writing fails.
pub fn error_to_xml(doc: &ErrorDocument) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(256);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element("Error")
        .write_inner_content(|w| doc.serialize_xml(w))?;

    Ok(buf)
}

// ---------------------------------------------------------------------------
// Writer helpers
// ---------------------------------------------------------------------------

/// Write a `<tag>text</tag>` element.
fn write_text<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> QxResult<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::from_escaped(quick_xml::escape::partial_escape(
            text,
        )))?;
    Ok(())
}

/// Write `<tag>text</tag>` only when the value is present.
fn write_optional<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> QxResult<()> {
    if let Some(v) = value {
        write_text(writer, tag, v)?;
    }
    Ok(())
}

/// Write a lowercase boolean element.
fn write_bool<W: Write>(writer: &mut Writer<W>, tag: &str, value: bool) -> QxResult<()> {
    write_text(writer, tag, if value { "true" } else { "false" })
}

/// Format a timestamp the way every S3 document in this service does:
/// RFC3339 UTC with second precision and a `Z` suffix.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn write_timestamp<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    dt: &DateTime<Utc>,
) -> QxResult<()> {
    write_text(writer, tag, &format_timestamp(dt))
}

// ---------------------------------------------------------------------------
// Document implementations
// ---------------------------------------------------------------------------

impl S3Serialize for Owner {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        write_text(writer, "ID", &self.id)?;
        write_text(writer, "DisplayName", &self.display_name)
    }
}

impl S3Serialize for ListAllMyBucketsResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        writer
            .create_element("Owner")
            .write_inner_content(|w| self.owner.serialize_xml(w))?;
        writer.create_element("Buckets").write_inner_content(|w| {
            for bucket in &self.buckets {
                w.create_element("Bucket")
                    .write_inner_content(|inner| bucket.serialize_xml(inner))?;
            }
            Ok::<_, QxError>(())
        })?;
        Ok(())
    }
}

impl S3Serialize for BucketEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        write_text(writer, "Name", &self.name)?;
        write_timestamp(writer, "CreationDate", &self.creation_date)
    }
}

impl S3Serialize for ObjectEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        write_text(writer, "Key", &self.key)?;
        write_timestamp(writer, "LastModified", &self.last_modified)?;
        write_text(writer, "ETag", &self.etag)?;
        write_text(writer, "Size", &self.size.to_string())?;
        write_text(writer, "StorageClass", &self.storage_class)
    }
}

impl S3Serialize for ListBucketResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        write_text(writer, "Name", &self.name)?;
        write_text(writer, "Prefix", &self.prefix)?;
        if !self.marker.is_empty() {
            write_text(writer, "Marker", &self.marker)?;
        }
        write_text(writer, "MaxKeys", &self.max_keys.to_string())?;
        if !self.delimiter.is_empty() {
            write_text(writer, "Delimiter", &self.delimiter)?;
        }
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for entry in &self.contents {
            writer
                .create_element("Contents")
                .write_inner_content(|w| entry.serialize_xml(w))?;
        }
        for prefix in &self.common_prefixes {
            writer
                .create_element("CommonPrefixes")
                .write_inner_content(|w| write_text(w, "Prefix", prefix))?;
        }
        write_optional(writer, "NextMarker", self.next_marker.as_deref())?;
        Ok(())
    }
}

impl S3Serialize for CopyObjectResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        write_timestamp(writer, "LastModified", &self.last_modified)?;
        write_text(writer, "ETag", &self.etag)
    }
}

impl S3Serialize for InitiateMultipartUploadResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        write_text(writer, "Bucket", &self.bucket)?;
        write_text(writer, "Key", &self.key)?;
        write_text(writer, "UploadId", &self.upload_id)
    }
}

impl S3Serialize for CompleteMultipartUploadResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        write_text(writer, "Location", &self.location)?;
        write_text(writer, "Bucket", &self.bucket)?;
        write_text(writer, "Key", &self.key)?;
        write_text(writer, "ETag", &self.etag)
    }
}

impl S3Serialize for PartEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        write_text(writer, "PartNumber", &self.part_number.to_string())?;
        write_timestamp(writer, "LastModified", &self.last_modified)?;
        write_text(writer, "ETag", &self.etag)?;
        write_text(writer, "Size", &self.size.to_string())
    }
}

impl S3Serialize for ListPartsResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        write_text(writer, "Bucket", &self.bucket)?;
        write_text(writer, "Key", &self.key)?;
        write_text(writer, "UploadId", &self.upload_id)?;
        write_text(writer, "MaxParts", &self.max_parts.to_string())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for part in &self.parts {
            writer
                .create_element("Part")
                .write_inner_content(|w| part.serialize_xml(w))?;
        }
        Ok(())
    }
}

impl S3Serialize for ErrorDocument {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> QxResult<()> {
        write_text(writer, "Code", &self.code)?;
        write_text(writer, "Message", &self.message)?;
        write_optional(writer, "Resource", self.resource.as_deref())?;
        write_optional(writer, "RequestId", self.request_id.as_deref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 3, 16, 45, 9).unwrap()
    }

    fn render<T: S3Serialize>(root: &str, value: &T) -> String {
        String::from_utf8(to_xml(root, value).expect("serialize")).expect("utf8")
    }

    #[test]
    fn test_should_render_list_buckets_document() {
        let doc = ListAllMyBucketsResult {
            owner: Owner {
                id: "1".to_owned(),
                display_name: "admin".to_owned(),
            },
            buckets: vec![BucketEntry {
                name: "mybucket".to_owned(),
                creation_date: ts(),
            }],
        };
        let xml = render("ListAllMyBucketsResult", &doc);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "<ListAllMyBucketsResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">"
        ));
        assert!(xml.contains("<Owner><ID>1</ID><DisplayName>admin</DisplayName></Owner>"));
        assert!(xml.contains(
            "<Buckets><Bucket><Name>mybucket</Name><CreationDate>2026-02-03T16:45:09Z</CreationDate></Bucket></Buckets>"
        ));
    }

    #[test]
    fn test_should_render_list_bucket_result_with_common_prefixes() {
        let doc = ListBucketResult {
            name: "mybucket".to_owned(),
            prefix: "photos/".to_owned(),
            marker: String::new(),
            max_keys: 1000,
            delimiter: "/".to_owned(),
            is_truncated: true,
            next_marker: Some("photos/z.jpg".to_owned()),
            contents: vec![ObjectEntry {
                key: "photos/a.jpg".to_owned(),
                last_modified: ts(),
                etag: "\"abc\"".to_owned(),
                size: 42,
                storage_class: "STANDARD".to_owned(),
            }],
            common_prefixes: vec!["photos/2026/".to_owned()],
        };
        let xml = render("ListBucketResult", &doc);
        assert!(xml.contains("<Prefix>photos/</Prefix>"));
        assert!(!xml.contains("<Marker>"));
        assert!(xml.contains("<Delimiter>/</Delimiter>"));
        assert!(xml.contains("<IsTruncated>true</IsTruncated>"));
        assert!(xml.contains("<Contents><Key>photos/a.jpg</Key>"));
        assert!(xml.contains("<CommonPrefixes><Prefix>photos/2026/</Prefix></CommonPrefixes>"));
        assert!(xml.contains("<NextMarker>photos/z.jpg</NextMarker>"));
    }

    #[test]
    fn test_should_render_copy_object_result() {
        let doc = CopyObjectResult {
            last_modified: ts(),
            etag: "\"abc\"".to_owned(),
        };
        let xml = render("CopyObjectResult", &doc);
        assert!(
            xml.contains("<LastModified>2026-02-03T16:45:09Z</LastModified><ETag>\"abc\"</ETag>")
        );
    }

    #[test]
    fn test_should_render_initiate_multipart_result() {
        let doc = InitiateMultipartUploadResult {
            bucket: "b".to_owned(),
            key: "k".to_owned(),
            upload_id: "u-1".to_owned(),
        };
        let xml = render("InitiateMultipartUploadResult", &doc);
        assert!(xml.contains("<Bucket>b</Bucket><Key>k</Key><UploadId>u-1</UploadId>"));
    }

    #[test]
    fn test_should_render_error_without_namespace() {
        let doc = ErrorDocument {
            code: "NoSuchBucket".to_owned(),
            message: "The specified bucket does not exist".to_owned(),
            resource: Some("/missing".to_owned()),
            request_id: Some("req-1".to_owned()),
        };
        let xml = String::from_utf8(error_to_xml(&doc).expect("serialize")).expect("utf8");
        assert!(xml.contains("<Error><Code>NoSuchBucket</Code>"));
        assert!(!xml.contains("xmlns"));
        assert!(xml.contains("<Resource>/missing</Resource>"));
        assert!(xml.contains("<RequestId>req-1</RequestId>"));
    }

    #[test]
    fn test_should_escape_xml_special_characters_in_keys() {
        let doc = InitiateMultipartUploadResult {
            bucket: "b".to_owned(),
            key: "a<b>&c".to_owned(),
            upload_id: "u".to_owned(),
        };
        let xml = render("InitiateMultipartUploadResult", &doc);
        assert!(xml.contains("<Key>a&lt;b&gt;&amp;c</Key>"));
    }
}
