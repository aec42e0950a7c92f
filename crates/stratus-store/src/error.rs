//! Storage engine errors.

/// Error produced by the filesystem storage engine.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The object or part does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The bucket name or object key would escape the storage hierarchy.
    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    /// The streamed body did not hash to the digest the request declared.
    #[error("content sha256 mismatch: declared {declared}, computed {computed}")]
    DigestMismatch {
        /// Digest the request signed.
        declared: String,
        /// Digest of the bytes actually received.
        computed: String,
    },

    /// The stream ended at a different length than the request declared.
    #[error("size mismatch: declared {declared} bytes, wrote {written}")]
    SizeMismatch {
        /// Bytes the request promised.
        declared: u64,
        /// Bytes actually consumed from the stream.
        written: u64,
    },

    /// Any other filesystem failure.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this error means the target simply was not there.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
