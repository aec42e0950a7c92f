//! Parsing S3 XML request bodies.
//!
//! The only XML input the protocol accepts is the `CompleteMultipartUpload`
//! request body. Parsing is event-driven: unknown elements are skipped so
//! that SDK variations (extra checksum elements, namespace attributes) do
//! not break the decoder.

use quick_xml::Reader;
use quick_xml::events::Event;

use stratus_model::types::{CompleteMultipartUploadRequest, CompletedPart};

use crate::error::XmlError;

/// Deserialize a type from S3-flavored XML.
pub trait S3Deserialize: Sized {
    /// Parse an instance from the reader, positioned just after the opening
    /// tag of this element. Implementations consume through the matching
    /// end tag.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] if the XML is malformed or required elements are
    /// missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Parse a complete document: skips the declaration, finds the root element
/// and delegates to the type's [`S3Deserialize`] implementation.
///
/// # Errors
///
/// Returns [`XmlError`] if the document has no root element or parsing fails.
pub fn from_xml<T: S3Deserialize>(xml: &[u8]) -> Result<T, XmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(_) => return T::deserialize_xml(&mut reader),
            Event::Eof => return Err(XmlError::MissingElement("root element".to_owned())),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Reader helpers
// ---------------------------------------------------------------------------

/// Read the text content of the current element and consume its end tag.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let unescaped = e
                    .unescape()
                    .map_err(|err| XmlError::InvalidContent(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::End(_) => return Ok(text),
            Event::Eof => {
                return Err(XmlError::InvalidContent(
                    "unexpected EOF inside element".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip the current element and all of its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::InvalidContent(
                    "unexpected EOF while skipping element".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// CompleteMultipartUpload request body
// ---------------------------------------------------------------------------

impl S3Deserialize for CompletedPart {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut part_number = None;
        let mut etag = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name();
                    match name.as_ref() {
                        b"PartNumber" => {
                            let text = read_text(reader)?;
                            let parsed = text.parse::<i32>().map_err(|_| {
                                XmlError::InvalidContent(format!("invalid PartNumber: {text}"))
                            })?;
                            part_number = Some(parsed);
                        }
                        b"ETag" => etag = Some(read_text(reader)?),
                        _ => skip_element(reader)?,
                    }
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::InvalidContent(
                        "unexpected EOF inside Part".to_owned(),
                    ));
                }
                _ => {}
            }
        }

        Ok(CompletedPart {
            part_number: part_number
                .ok_or_else(|| XmlError::MissingElement("PartNumber".to_owned()))?,
            etag: etag.ok_or_else(|| XmlError::MissingElement("ETag".to_owned()))?,
        })
    }
}

impl S3Deserialize for CompleteMultipartUploadRequest {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut parts = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if e.name().as_ref() == b"Part" {
                        parts.push(CompletedPart::deserialize_xml(reader)?);
                    } else {
                        skip_element(reader)?;
                    }
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::InvalidContent(
                        "unexpected EOF inside CompleteMultipartUpload".to_owned(),
                    ));
                }
                _ => {}
            }
        }

        Ok(CompleteMultipartUploadRequest { parts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_complete_multipart_request() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
            <CompleteMultipartUpload>
                <Part><PartNumber>1</PartNumber><ETag>"aaa"</ETag></Part>
                <Part><PartNumber>2</PartNumber><ETag>"bbb"</ETag></Part>
            </CompleteMultipartUpload>"#;

        let req: CompleteMultipartUploadRequest = from_xml(xml).expect("should parse");
        assert_eq!(req.parts.len(), 2);
        assert_eq!(req.parts[0].part_number, 1);
        assert_eq!(req.parts[0].etag, "\"aaa\"");
        assert_eq!(req.parts[1].part_number, 2);
        assert_eq!(req.parts[1].bare_etag(), "bbb");
    }

    #[test]
    fn test_should_parse_namespaced_sdk_request() {
        // The AWS SDKs put the namespace on the root; element matching must
        // not care.
        let xml = br#"<CompleteMultipartUpload xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
            <Part><ETag>&quot;abc&quot;</ETag><PartNumber>1</PartNumber></Part>
        </CompleteMultipartUpload>"#;

        let req: CompleteMultipartUploadRequest = from_xml(xml).expect("should parse");
        assert_eq!(req.parts.len(), 1);
        assert_eq!(req.parts[0].bare_etag(), "abc");
    }

    #[test]
    fn test_should_skip_unknown_elements() {
        let xml = br#"<CompleteMultipartUpload>
            <Part>
                <ChecksumCRC32>n/a</ChecksumCRC32>
                <PartNumber>7</PartNumber>
                <ETag>"e7"</ETag>
            </Part>
        </CompleteMultipartUpload>"#;

        let req: CompleteMultipartUploadRequest = from_xml(xml).expect("should parse");
        assert_eq!(req.parts.len(), 1);
        assert_eq!(req.parts[0].part_number, 7);
    }

    #[test]
    fn test_should_reject_part_without_number() {
        let xml = br#"<CompleteMultipartUpload>
            <Part><ETag>"x"</ETag></Part>
        </CompleteMultipartUpload>"#;

        let result: Result<CompleteMultipartUploadRequest, _> = from_xml(xml);
        assert!(matches!(result, Err(XmlError::MissingElement(_))));
    }

    #[test]
    fn test_should_reject_empty_document() {
        let result: Result<CompleteMultipartUploadRequest, _> = from_xml(b"   ");
        assert!(matches!(result, Err(XmlError::MissingElement(_))));
    }

    #[test]
    fn test_should_accept_empty_part_list() {
        let xml = b"<CompleteMultipartUpload></CompleteMultipartUpload>";
        let req: CompleteMultipartUploadRequest = from_xml(xml).expect("should parse");
        assert!(req.parts.is_empty());
    }
}
