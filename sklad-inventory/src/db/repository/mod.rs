//! Repository Module
//!
//! CRUD operations against the SQLite tables, one module per table.
//! Repositories are free async functions taking `&SqlitePool`; the service
//! layer owns the pool and composes them.

pub mod product;
pub mod warehouse;
pub mod warehouse_unit;

use thiserror::Error;

/// Repository error types
///
/// The three variants map one-to-one onto the engine's failure contract:
/// `Validation` for malformed or missing required ids/fields, `NotFound` for
/// an absent referenced record, `Database` for underlying persistence I/O
/// failures (surfaced, never retried here).
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl RepoError {
    /// Prefix a store failure with the bucket being processed, so callers
    /// always learn where a partial reconciliation stopped.
    pub fn in_bucket(self, bucket: &shared::models::BucketKey) -> Self {
        match self {
            RepoError::Database(msg) => RepoError::Database(format!("{bucket}: {msg}")),
            other => other,
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
