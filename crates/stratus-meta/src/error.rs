//! Metadata store errors.

/// Error produced by the metadata store.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// A unique constraint was violated (duplicate username, bucket name,
    /// access key, ...).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for MetaError {
    fn from(err: sqlx::Error) -> Self {
        let unique = err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique {
            Self::Conflict(err.to_string())
        } else {
            Self::Database(err)
        }
    }
}

impl MetaError {
    /// Whether this error is a unique-constraint conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
