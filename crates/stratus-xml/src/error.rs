//! XML codec errors.

/// Error produced while encoding or decoding S3 XML documents.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The underlying writer failed.
    #[error("xml write error: {0}")]
    Write(#[from] std::io::Error),

    /// The XML stream is not well-formed.
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A required element was absent.
    #[error("missing element: {0}")]
    MissingElement(String),

    /// Element content could not be interpreted.
    #[error("invalid content: {0}")]
    InvalidContent(String),
}
