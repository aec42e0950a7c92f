//! HTTP service layer for Stratus.
//!
//! Glues hyper to the S3 protocol: the [`router`] turns a request line into
//! an [`stratus_model::S3Operation`], the [`service`] runs health checks,
//! CORS preflight, authentication and dispatch, and [`body`] provides the
//! streaming request/response body types so object bodies never sit fully
//! in memory.

pub mod body;
pub mod dispatch;
pub mod request;
pub mod response;
pub mod router;
pub mod service;

pub use body::{S3RequestBody, S3ResponseBody};
pub use dispatch::{AuthContext, Authenticator, S3Handler};
pub use router::{RoutingContext, route_request};
pub use service::{AuditRecord, AuditSink, NullAuditSink, S3HttpService};
