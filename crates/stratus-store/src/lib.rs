//! Filesystem storage engine for Stratus.
//!
//! Object bodies live in a directory hierarchy under a configured base
//! path: buckets are first-level directories and key separators become
//! filesystem separators. Writes stream through a temp file with the MD5
//! (and optionally SHA-256) hash fed in lockstep, then rename into place,
//! so a crash leaves either the previous object or the complete new one,
//! never a torn file.
//!
//! Multipart uploads stage their parts under `<base>/.uploads/<upload_id>/`
//! until [`FsStore::complete_parts`] concatenates them (again via temp +
//! rename) or [`FsStore::abort_multipart`] discards them.

pub mod engine;
pub mod error;
pub mod hash;

pub use engine::{FsStore, ObjectInfo, PartInfo, WriteOutcome};
pub use error::StoreError;
