//! S3 XML codec for Stratus.
//!
//! Renders the `stratus-model` document types as S3-compatible XML and
//! parses the XML request bodies the protocol accepts. Conventions follow
//! the AWS RestXml protocol:
//!
//! - namespace `http://s3.amazonaws.com/doc/2006-03-01/` on response roots
//!   (the `<Error>` document carries no namespace),
//! - timestamps as RFC3339 UTC (`2026-02-03T16:45:09Z`),
//! - booleans as lowercase `true`/`false`,
//! - an XML declaration on every document.

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::{S3Deserialize, from_xml};
pub use error::XmlError;
pub use serialize::{S3Serialize, error_to_xml, to_xml};
