//! Typed error enum for the storage layer.
//!
//! Callers match on specific failure modes (duplicate key, transient pool
//! failure, rejected identifier) instead of downcasting opaque boxes.

use thiserror::Error;

use crate::schema::Table;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Unique constraint violation (username on `models`).
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// SQL / connection / timeout failure.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Column identifier outside the table's whitelist.
    #[error("unknown column {column} on table {}", .table.name())]
    UnknownColumn { table: Table, column: String },

    /// Column and value lists of different length, or empty.
    #[error("column/value mismatch on {}: {columns} columns, {values} values", .table.name())]
    ArityMismatch { table: Table, columns: usize, values: usize },

    /// `DATABASE_URL` scheme not handled by any compiled backend.
    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),

    /// Schema provisioning failure.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StorageError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Database(
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed
            )
        )
    }

    /// Whether this error is a unique-constraint violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Custom `From<sqlx::Error>`, not blanket `#[from]`:
/// unique violations (PostgreSQL 23505, SQLite 2067/1555) become `Duplicate`.
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Duplicate(db_err.message().to_owned())
            },
            _ => Self::Database(err),
        }
    }
}
