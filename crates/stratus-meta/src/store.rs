//! Connection pool ownership and schema migration.

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::error::MetaError;

/// The embedded schema applied at startup.
const SCHEMA: &str = include_str!("schema.sql");

/// The metadata store: a PostgreSQL pool plus schema management.
///
/// Repository functions live in the sibling modules and accept any
/// [`sqlx::PgExecutor`]; pass [`MetaStore::pool`] for auto-commit queries or
/// `&mut *tx` from [`MetaStore::begin`] inside a transaction.
#[derive(Debug, Clone)]
pub struct MetaStore {
    pool: PgPool,
}

impl MetaStore {
    /// Connect to the database and verify the connection.
    ///
    /// # Errors
    ///
    /// Returns [`MetaError`] if the pool cannot be established.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, MetaError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!(max_connections, "connected to metadata database");
        Ok(Self { pool })
    }

    /// Wrap an existing pool (used by tests).
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema, statement by statement. Every statement is
    /// `IF NOT EXISTS`-guarded, so reapplying is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`MetaError`] if a statement fails.
    pub async fn migrate(&self) -> Result<(), MetaError> {
        for statement in schema_statements(SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("metadata schema is up to date");
        Ok(())
    }

    /// The underlying pool, usable as a query executor.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Open a transaction. Dropping it without commit rolls back.
    ///
    /// # Errors
    ///
    /// Returns [`MetaError`] if a connection cannot be acquired.
    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, MetaError> {
        Ok(self.pool.begin().await?)
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Split an SQL file into executable statements, dropping comment-only and
/// empty fragments.
fn schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|fragment| {
            let trimmed = fragment.trim();
            let has_sql = trimmed
                .lines()
                .any(|line| !line.trim().is_empty() && !line.trim().starts_with("--"));
            has_sql.then_some(trimmed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_split_schema_into_statements() {
        let statements = schema_statements(SCHEMA);
        // Seven core tables, the audit table and one index.
        assert!(statements.len() >= 9, "got {} statements", statements.len());
        assert!(statements[0].contains("CREATE TABLE IF NOT EXISTS users"));
        assert!(
            statements
                .iter()
                .any(|s| s.contains("CREATE TABLE IF NOT EXISTS bucket_policies"))
        );
        assert!(statements.iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn test_should_drop_comment_only_fragments() {
        let statements = schema_statements("-- just a comment\n;\nCREATE TABLE t (id INT);\n");
        assert_eq!(statements.len(), 1);
        assert!(statements[0].starts_with("CREATE TABLE t"));
    }
}
