//! Error types for SQLite query operations.
//!
//! Every failure of the query layer is reported through [`SqliteError`].
//! Engine failures keep the underlying [`rusqlite::Error`] as their source,
//! so callers can walk the full cause chain.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::StorageClass;

/// Errors that can occur while opening, preparing or running a query.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// The database file could not be opened.
    #[error("failed to open SQLite database '{}'", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The query text was rejected by the engine.
    #[error("failed to prepare SQLite statement `{sql}`")]
    Prepare {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A positional parameter could not be bound.
    #[error("failed to bind SQLite statement parameter {position}")]
    Bind {
        position: usize,
        #[source]
        source: rusqlite::Error,
    },

    /// Stepping the statement failed for a reason other than busy, row or done.
    #[error("failed to execute SQLite statement")]
    Step {
        #[source]
        source: rusqlite::Error,
    },

    /// The engine reported a different column count than at the first row.
    #[error(
        "column count mismatch while accumulating statement results (expected {expected}, found {found})"
    )]
    ColumnCountMismatch { expected: usize, found: usize },

    /// A column's storage class changed between rows of one execution.
    #[error(
        "column type mismatch while accumulating statement results: column '{column}' is {expected}, found {found}"
    )]
    ColumnTypeMismatch {
        column: String,
        expected: StorageClass,
        found: StorageClass,
    },

    /// A table or column name is not a plain SQL identifier.
    #[error("invalid identifier '{0}': must contain only alphanumeric characters and underscores")]
    InvalidIdentifier(String),
}

impl SqliteError {
    pub(crate) fn step(source: rusqlite::Error) -> Self {
        Self::Step { source }
    }
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
