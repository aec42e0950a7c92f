//! Request and response body types.
//!
//! Requests arrive as a boxed byte-frame body; handlers either collect the
//! small control bodies (XML, policy JSON) or adapt the frames into an
//! `AsyncRead` that the storage engine consumes chunk by chunk. Responses
//! are buffered for XML documents, empty for status-only replies, and
//! streamed from a file handle for object GETs.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, BodyStream, Full};
use tokio::io::AsyncRead;
use tokio_util::io::{ReaderStream, StreamReader};

use stratus_model::S3Error;

/// Boxed error for request-body frames.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The request body as handed to operation handlers.
pub type S3RequestBody = BoxBody<Bytes, BoxError>;

/// Collect a (small) request body fully into memory. Object bodies go
/// through [`body_reader`] instead.
///
/// # Errors
///
/// Returns an internal [`S3Error`] if the client stream fails mid-body.
pub async fn collect_body(body: S3RequestBody) -> Result<Bytes, S3Error> {
    body.collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|err| S3Error::internal(format!("failed to read request body: {err}")))
}

/// Adapt the request body into an `AsyncRead` for streaming writes.
pub fn body_reader(body: S3RequestBody) -> impl AsyncRead + Send + Unpin {
    let frames = BodyStream::new(body)
        .map(|result| match result {
            Ok(frame) => frame.into_data().ok().map(Ok),
            Err(err) => Some(Err(io::Error::new(io::ErrorKind::Other, err))),
        })
        .filter_map(std::future::ready);
    StreamReader::new(frames)
}

/// Readers the response can stream from (object files and range views).
pub type DynReader = Box<dyn AsyncRead + Send + Unpin>;

/// S3 response body: buffered, streamed from a reader, or empty.
pub enum S3ResponseBody {
    /// Buffered body for XML payloads and error documents.
    Buffered(Full<Bytes>),
    /// Body streamed from a file handle, with its exact length.
    Streaming {
        stream: ReaderStream<DynReader>,
        size: u64,
    },
    /// No body: 204 responses, HEAD replies.
    Empty,
}

impl Default for S3ResponseBody {
    fn default() -> Self {
        Self::Empty
    }
}

impl std::fmt::Debug for S3ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buffered(_) => f.write_str("S3ResponseBody::Buffered"),
            Self::Streaming { size, .. } => {
                f.debug_struct("S3ResponseBody::Streaming").field("size", size).finish()
            }
            Self::Empty => f.write_str("S3ResponseBody::Empty"),
        }
    }
}

impl S3ResponseBody {
    /// An empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// A buffered body from raw bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    /// A buffered body from an XML document.
    #[must_use]
    pub fn from_xml(xml: Vec<u8>) -> Self {
        Self::Buffered(Full::new(Bytes::from(xml)))
    }

    /// A body streamed from a reader of exactly `size` bytes.
    #[must_use]
    pub fn streaming(reader: impl AsyncRead + Send + Unpin + 'static, size: u64) -> Self {
        Self::Streaming {
            stream: ReaderStream::new(Box::new(reader) as DynReader),
            size,
        }
    }
}

impl http_body::Body for S3ResponseBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map_err(|never| match never {}),
            Self::Streaming { stream, .. } => match Pin::new(stream).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    Poll::Ready(Some(Ok(http_body::Frame::data(chunk))))
                }
                Poll::Ready(Some(Err(err))) => Poll::Ready(Some(Err(err))),
                Poll::Ready(None) => Poll::Ready(None),
                Poll::Pending => Poll::Pending,
            },
            Self::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Buffered(full) => full.is_end_stream(),
            Self::Streaming { .. } => false,
            Self::Empty => true,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Buffered(full) => full.size_hint(),
            Self::Streaming { size, .. } => http_body::SizeHint::with_exact(*size),
            Self::Empty => http_body::SizeHint::with_exact(0),
        }
    }
}
