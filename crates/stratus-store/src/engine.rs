//! The filesystem engine.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt, Take};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::hash::{StreamHasher, composite_etag, md5_digest_from_hex};

/// Streaming copy buffer size.
const IO_BUF_SIZE: usize = 64 * 1024;

/// Directory under the base path holding staged multipart parts. Bucket
/// names never start with a dot, so this cannot shadow a bucket.
const UPLOADS_DIR: &str = ".uploads";

/// Prefix of in-flight temp files inside a bucket directory.
const TMP_PREFIX: &str = ".tmp-";

/// Metadata about a stored object.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Result of a completed write (single put or multipart assembly).
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub size: u64,
    /// Unquoted ETag: hex MD5, or the composite form for assemblies.
    pub etag: String,
    /// Locator persisted in the metadata store: `<bucket>/<key>`.
    pub storage_path: String,
    pub last_modified: DateTime<Utc>,
}

/// One part to assemble, in client-supplied order.
#[derive(Debug, Clone)]
pub struct PartInfo {
    pub part_number: i32,
}

/// Filesystem-backed object store rooted at a base directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    base: PathBuf,
}

impl FsStore {
    /// Open (creating if needed) a store rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the base directory cannot be created.
    pub async fn new(base: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base = base.into();
        fs::create_dir_all(&base).await?;
        fs::create_dir_all(base.join(UPLOADS_DIR)).await?;
        debug!(base = %base.display(), "opened filesystem store");
        Ok(Self { base })
    }

    // -----------------------------------------------------------------------
    // Buckets
    // -----------------------------------------------------------------------

    /// Create the bucket directory. Idempotent.
    pub async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        fs::create_dir_all(self.bucket_dir(bucket)?).await?;
        Ok(())
    }

    /// Remove the bucket directory and everything beneath it. Idempotent.
    pub async fn delete_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        match fs::remove_dir_all(self.bucket_dir(bucket)?).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Whether the bucket directory exists.
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        match fs::metadata(self.bucket_dir(bucket)?).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    /// Stream a body into `bucket/key`.
    ///
    /// The body is written to a temp file in the bucket directory while the
    /// hashes consume it in lockstep, then renamed over the final path. With
    /// a declared size, a short or long stream is an error and leaves no
    /// trace; the same goes for a declared `x-amz-content-sha256` the bytes
    /// do not hash to; enforcement happens before the rename, so a failed
    /// put never replaces the previous object.
    pub async fn put<R>(
        &self,
        bucket: &str,
        key: &str,
        reader: &mut R,
        declared_size: Option<u64>,
        expected_sha256: Option<&str>,
    ) -> Result<WriteOutcome, StoreError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let final_path = self.object_path(bucket, key)?;
        let bucket_dir = self.bucket_dir(bucket)?;
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp_path = bucket_dir.join(format!("{TMP_PREFIX}{}", Uuid::new_v4()));
        let write = self
            .write_stream(&tmp_path, reader, declared_size, expected_sha256)
            .await;
        let (size, md5_hex) = match write {
            Ok(result) => result,
            Err(err) => {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(err);
            }
        };

        fs::rename(&tmp_path, &final_path).await?;
        trace!(bucket, key, size, "stored object");

        Ok(WriteOutcome {
            size,
            etag: md5_hex,
            storage_path: format!("{bucket}/{key}"),
            last_modified: Utc::now(),
        })
    }

    /// Open an object for streaming read.
    pub async fn get(&self, bucket: &str, key: &str) -> Result<(File, ObjectInfo), StoreError> {
        let path = self.object_path(bucket, key)?;
        let file = open_existing(&path, bucket, key).await?;
        let info = info_from_file(&file).await?;
        Ok((file, info))
    }

    /// Open an object positioned at `start`, limited to the inclusive range
    /// `start..=end`. Callers must have validated `0 <= start <= end < size`.
    pub async fn get_range(
        &self,
        bucket: &str,
        key: &str,
        start: u64,
        end: u64,
    ) -> Result<(Take<File>, ObjectInfo), StoreError> {
        let path = self.object_path(bucket, key)?;
        let mut file = open_existing(&path, bucket, key).await?;
        let info = info_from_file(&file).await?;
        file.seek(std::io::SeekFrom::Start(start)).await?;
        Ok((file.take(end - start + 1), info))
    }

    /// Object metadata without opening a read stream.
    pub async fn stat(&self, bucket: &str, key: &str) -> Result<ObjectInfo, StoreError> {
        let path = self.object_path(bucket, key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(ObjectInfo {
                size: meta.len(),
                last_modified: modified_time(&meta),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(format!("{bucket}/{key}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Whether the object file exists.
    pub async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError> {
        match self.stat(bucket, key).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Remove an object file. Missing files are success; empty parent
    /// directories left behind by nested keys are pruned.
    pub async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        }

        let bucket_dir = self.bucket_dir(bucket)?;
        let mut parent = path.parent().map(Path::to_path_buf);
        while let Some(dir) = parent {
            if dir == bucket_dir {
                break;
            }
            // Fails on non-empty directories, which ends the pruning walk.
            if fs::remove_dir(&dir).await.is_err() {
                break;
            }
            parent = dir.parent().map(Path::to_path_buf);
        }
        Ok(())
    }

    /// Server-side copy, streaming through the engine and recomputing the
    /// destination ETag.
    pub async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<WriteOutcome, StoreError> {
        let (mut src, info) = self.get(src_bucket, src_key).await?;
        self.put(dst_bucket, dst_key, &mut src, Some(info.size), None)
            .await
    }

    // -----------------------------------------------------------------------
    // Multipart staging
    // -----------------------------------------------------------------------

    /// Reserve the staging directory for an upload.
    pub async fn init_multipart(&self, upload_id: &str) -> Result<(), StoreError> {
        fs::create_dir_all(self.staging_dir(upload_id)?).await?;
        Ok(())
    }

    /// Stage one part. Re-uploading a part number replaces the staged file.
    pub async fn put_part<R>(
        &self,
        upload_id: &str,
        part_number: i32,
        reader: &mut R,
        declared_size: Option<u64>,
        expected_sha256: Option<&str>,
    ) -> Result<WriteOutcome, StoreError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let staging = self.staging_dir(upload_id)?;
        fs::create_dir_all(&staging).await?;

        let final_path = staging.join(part_number.to_string());
        let tmp_path = staging.join(format!("{TMP_PREFIX}{}", Uuid::new_v4()));
        let write = self
            .write_stream(&tmp_path, reader, declared_size, expected_sha256)
            .await;
        let (size, md5_hex) = match write {
            Ok(result) => result,
            Err(err) => {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(err);
            }
        };
        fs::rename(&tmp_path, &final_path).await?;
        trace!(upload_id, part_number, size, "staged part");

        Ok(WriteOutcome {
            size,
            etag: md5_hex,
            storage_path: format!("{UPLOADS_DIR}/{upload_id}/{part_number}"),
            last_modified: Utc::now(),
        })
    }

    /// Concatenate the staged parts, in the given order, into `bucket/key`.
    ///
    /// Each part's MD5 is recomputed while it streams into the assembly
    /// temp file; the composite ETag is derived from those digests. The
    /// assembled file appears atomically via rename, and the staging
    /// directory is removed afterwards.
    pub async fn complete_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[PartInfo],
    ) -> Result<WriteOutcome, StoreError> {
        let staging = self.staging_dir(upload_id)?;
        let final_path = self.object_path(bucket, key)?;
        let bucket_dir = self.bucket_dir(bucket)?;
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp_path = bucket_dir.join(format!("{TMP_PREFIX}{}", Uuid::new_v4()));
        let assembled = self
            .assemble_parts(&staging, &tmp_path, upload_id, parts)
            .await;
        let (total_size, digests) = match assembled {
            Ok(result) => result,
            Err(err) => {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(err);
            }
        };

        fs::rename(&tmp_path, &final_path).await?;
        self.abort_multipart(upload_id).await?;
        debug!(bucket, key, upload_id, parts = parts.len(), total_size, "assembled multipart object");

        Ok(WriteOutcome {
            size: total_size,
            etag: composite_etag(&digests),
            storage_path: format!("{bucket}/{key}"),
            last_modified: Utc::now(),
        })
    }

    /// Remove the staging directory and all staged parts. Idempotent.
    pub async fn abort_multipart(&self, upload_id: &str) -> Result<(), StoreError> {
        match fs::remove_dir_all(self.staging_dir(upload_id)?).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    // -----------------------------------------------------------------------
    // Path resolution
    // -----------------------------------------------------------------------

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StoreError> {
        if bucket.is_empty() || bucket.starts_with('.') || bucket.contains('/') {
            return Err(StoreError::InvalidPath(bucket.to_owned()));
        }
        Ok(self.base.join(bucket))
    }

    /// Map a key to its path inside the bucket directory, rejecting any
    /// component that would resolve outside it.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.bucket_dir(bucket)?;
        if key.is_empty() {
            return Err(StoreError::InvalidPath(key.to_owned()));
        }
        for component in key.split('/') {
            if component.is_empty() || component == "." || component == ".." {
                return Err(StoreError::InvalidPath(key.to_owned()));
            }
            path.push(component);
        }
        Ok(path)
    }

    fn staging_dir(&self, upload_id: &str) -> Result<PathBuf, StoreError> {
        if upload_id.is_empty()
            || upload_id
                .chars()
                .any(|c| !c.is_ascii_alphanumeric() && c != '-')
        {
            return Err(StoreError::InvalidPath(upload_id.to_owned()));
        }
        Ok(self.base.join(UPLOADS_DIR).join(upload_id))
    }

    // -----------------------------------------------------------------------
    // Write plumbing
    // -----------------------------------------------------------------------

    /// Stream `reader` into `tmp_path`, hashing in lockstep and enforcing
    /// the declared size and digest. The caller renames on success and
    /// removes the temp file on failure.
    async fn write_stream<R>(
        &self,
        tmp_path: &Path,
        reader: &mut R,
        declared_size: Option<u64>,
        expected_sha256: Option<&str>,
    ) -> Result<(u64, String), StoreError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(tmp_path)
            .await?;

        let mut hasher = StreamHasher::new(expected_sha256.is_some());
        let mut buf = vec![0u8; IO_BUF_SIZE];
        let mut written: u64 = 0;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            file.write_all(&buf[..n]).await?;
            written += n as u64;
        }

        if let Some(declared) = declared_size {
            if written != declared {
                return Err(StoreError::SizeMismatch {
                    declared,
                    written,
                });
            }
        }

        let (md5_hex, sha256) = hasher.finish();
        if let (Some(declared), Some(computed)) = (expected_sha256, sha256) {
            if !declared.eq_ignore_ascii_case(&computed) {
                return Err(StoreError::DigestMismatch {
                    declared: declared.to_owned(),
                    computed,
                });
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok((written, md5_hex))
    }

    /// Concatenate staged parts into the assembly temp file, returning the
    /// total size and the per-part MD5 digests.
    async fn assemble_parts(
        &self,
        staging: &Path,
        tmp_path: &Path,
        upload_id: &str,
        parts: &[PartInfo],
    ) -> Result<(u64, Vec<[u8; 16]>), StoreError> {
        let mut out = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(tmp_path)
            .await?;

        let mut total: u64 = 0;
        let mut digests = Vec::with_capacity(parts.len());
        let mut buf = vec![0u8; IO_BUF_SIZE];

        for part in parts {
            let part_path = staging.join(part.part_number.to_string());
            let mut src = match File::open(&part_path).await {
                Ok(file) => file,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    return Err(StoreError::NotFound(format!(
                        "{upload_id}/{}",
                        part.part_number
                    )));
                }
                Err(err) => return Err(err.into()),
            };

            let mut hasher = StreamHasher::new(false);
            loop {
                let n = src.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
                out.write_all(&buf[..n]).await?;
                total += n as u64;
            }

            let (md5_hex, _) = hasher.finish();
            match md5_digest_from_hex(&md5_hex) {
                Some(digest) => digests.push(digest),
                None => {
                    warn!(upload_id, part = part.part_number, "unparseable part digest");
                    return Err(StoreError::InvalidPath(md5_hex));
                }
            }
        }

        out.flush().await?;
        out.sync_all().await?;
        Ok((total, digests))
    }
}

fn modified_time(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

async fn open_existing(path: &Path, bucket: &str, key: &str) -> Result<File, StoreError> {
    match File::open(path).await {
        Ok(file) => Ok(file),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(StoreError::NotFound(format!("{bucket}/{key}")))
        }
        Err(err) => Err(err.into()),
    }
}

async fn info_from_file(file: &File) -> Result<ObjectInfo, StoreError> {
    let meta = file.metadata().await?;
    Ok(ObjectInfo {
        size: meta.len(),
        last_modified: modified_time(&meta),
    })
}
