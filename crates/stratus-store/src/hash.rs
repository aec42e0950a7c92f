//! Content hashing for ETags and payload verification.

use md5::Md5;
use sha2::{Digest, Sha256};

/// Hashes a byte stream incrementally: MD5 always (for the ETag), SHA-256
/// on demand (to enforce a declared `x-amz-content-sha256`).
pub struct StreamHasher {
    md5: Md5,
    sha256: Option<Sha256>,
}

impl StreamHasher {
    /// Create a hasher; `with_sha256` adds the SHA-256 lane.
    #[must_use]
    pub fn new(with_sha256: bool) -> Self {
        Self {
            md5: Md5::new(),
            sha256: with_sha256.then(Sha256::new),
        }
    }

    /// Feed one chunk.
    pub fn update(&mut self, chunk: &[u8]) {
        self.md5.update(chunk);
        if let Some(sha) = &mut self.sha256 {
            sha.update(chunk);
        }
    }

    /// Finish, producing `(md5_hex, sha256_hex?)`.
    #[must_use]
    pub fn finish(self) -> (String, Option<String>) {
        let md5_hex = hex::encode(self.md5.finalize());
        let sha_hex = self.sha256.map(|sha| hex::encode(sha.finalize()));
        (md5_hex, sha_hex)
    }
}

/// Hex MD5 of a full buffer.
#[must_use]
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// The S3 composite ETag for a multipart object: the hex MD5 of the
/// concatenated *binary* part digests, suffixed with `-<part count>`.
#[must_use]
pub fn composite_etag(part_digests: &[[u8; 16]]) -> String {
    let mut all = Md5::new();
    for digest in part_digests {
        all.update(digest);
    }
    format!("{}-{}", hex::encode(all.finalize()), part_digests.len())
}

/// Decode a hex MD5 string into its 16 raw bytes.
#[must_use]
pub fn md5_digest_from_hex(hex_str: &str) -> Option<[u8; 16]> {
    let bytes = hex::decode(hex_str).ok()?;
    bytes.try_into().ok()
}
