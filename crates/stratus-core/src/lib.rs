//! The Stratus operation handlers.
//!
//! [`StratusService`] implements the HTTP layer's `S3Handler`: each routed
//! operation is translated into metadata-store and storage-engine calls,
//! following the write discipline of §storage-first; bodies stream to disk
//! before any metadata row is committed, so a cancelled request can orphan
//! a file but never leave a dangling namespace entry.
//!
//! [`auth::MetaAuthenticator`] implements the authentication middleware
//! (SigV4 over stored credentials, plus the anonymous public-read path) and
//! [`auth::MetaAuditSink`] persists one audit record per request from a
//! detached task.

pub mod auth;
pub mod duration;
mod ops;
pub mod service;

pub use auth::{MetaAuditSink, MetaAuthenticator};
pub use service::StratusService;
