//! Audit-log persistence.
//!
//! Handlers produce an [`AuditEvent`] per request; a detached task inserts
//! it. Failures here are logged and swallowed; auditing must never fail a
//! request.

use sqlx::PgExecutor;

use crate::error::MetaError;

/// One audited request.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Authenticated user id, absent for anonymous requests.
    pub user_id: Option<i64>,
    pub username: Option<String>,
    /// Operation name, e.g. `PutObject`.
    pub action: String,
    /// Request path, e.g. `/bucket/key`.
    pub resource: String,
    pub method: String,
    pub status_code: i32,
    pub request_id: String,
}

/// Insert one audit record.
pub async fn insert_audit_log(
    exec: impl PgExecutor<'_>,
    event: &AuditEvent,
) -> Result<(), MetaError> {
    sqlx::query(
        r#"INSERT INTO audit_logs
               (user_id, username, action, resource, method, status_code, request_id)
           VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
    )
    .bind(event.user_id)
    .bind(&event.username)
    .bind(&event.action)
    .bind(&event.resource)
    .bind(&event.method)
    .bind(event.status_code)
    .bind(&event.request_id)
    .execute(exec)
    .await?;
    Ok(())
}
