//! Error types for Pathfinder database operations.
//!
//! Each variant adds one line of context on top of the query-layer error
//! that caused it.

use std::path::PathBuf;

use decemvirate_sqlite::SqliteError;
use thiserror::Error;

use crate::version::DatabaseVersion;

/// Errors that can occur while opening or querying the Pathfinder database.
#[derive(Debug, Error)]
pub enum PathfinderError {
    /// The database file could not be opened.
    #[error("failed to open Pathfinder database '{}'", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: SqliteError,
    },

    /// The version table could not be read.
    #[error("failed to get the database's version")]
    ReadVersion {
        #[source]
        source: VersionError,
    },

    /// The database has a different major version than required.
    #[error("wrong database major version ({found} != {required_major}.{min_minor}.0)")]
    WrongMajorVersion {
        found: DatabaseVersion,
        required_major: i64,
        min_minor: i64,
    },

    /// The database is older than the minimum required minor version.
    #[error("database version too low ({found} < {required_major}.{min_minor}.0)")]
    VersionTooLow {
        found: DatabaseVersion,
        required_major: i64,
        min_minor: i64,
    },

    /// Preparing the lookup statements failed.
    #[error("failed to prepare database lookups")]
    Prepare {
        #[source]
        source: SqliteError,
    },

    /// A lookup failed.
    #[error("failed to find {what}")]
    Lookup {
        what: String,
        #[source]
        source: SqliteError,
    },
}

impl PathfinderError {
    pub(crate) fn lookup(what: impl Into<String>) -> impl FnOnce(SqliteError) -> Self {
        let what = what.into();
        move |source| Self::Lookup { what, source }
    }
}

/// Reasons the version table can't provide a version.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Version table empty")]
    Empty,

    #[error("Version table doesn't contain the version")]
    Missing,

    #[error(transparent)]
    Query(#[from] SqliteError),
}

/// Convenience alias for results with [`PathfinderError`].
pub type Result<T> = std::result::Result<T, PathfinderError>;
