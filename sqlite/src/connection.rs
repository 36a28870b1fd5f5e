//! Connection to a single-file SQLite store.
//!
//! A [`Connection`] is opened once per process and lent to every
//! [`Statement`](crate::Statement) created from it. Statements borrow the
//! connection, so none of them can outlive it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::OpenFlags;

use crate::error::{Result, SqliteError};
use crate::functions;

/// How the database file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Open for reading only.
    #[default]
    ReadOnly,
    /// Open for reading and writing.
    ReadWrite,
    /// Open for reading and writing, creating the file if it doesn't exist.
    ReadWriteCreate,
}

impl OpenMode {
    fn flags(self) -> OpenFlags {
        let mode = match self {
            Self::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY,
            Self::ReadWrite => OpenFlags::SQLITE_OPEN_READ_WRITE,
            Self::ReadWriteCreate => {
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
            }
        };
        mode | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX
    }
}

/// What a statement does when the engine reports the database as busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyPolicy {
    /// Retry immediately, without backoff and without giving up.
    #[default]
    Spin,
    /// Let the engine retry with backoff until the timeout elapses, then fail.
    Timeout(Duration),
}

/// An open SQLite database.
///
/// Every connection has a `REGEXP` implementation registered and the
/// default [`BusyPolicy::Spin`] installed.
///
/// # Examples
///
/// ```no_run
/// use decemvirate_sqlite::{Connection, OpenMode};
///
/// let conn = Connection::open("pathfinder.sqlite", OpenMode::ReadOnly).unwrap();
/// println!("opened {}", conn.path().display());
/// ```
#[derive(Debug)]
pub struct Connection {
    inner: rusqlite::Connection,
    path: PathBuf,
}

impl Connection {
    /// Opens the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Open`] if the file cannot be opened in the
    /// requested mode.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = rusqlite::Connection::open_with_flags(&path, mode.flags()).map_err(
            |source| SqliteError::Open {
                path: path.clone(),
                source,
            },
        )?;
        Self::from_rusqlite(inner, path)
    }

    /// Wraps an already open engine connection.
    ///
    /// `path` is only used for reporting.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Open`] if the connection can't be set up.
    pub fn from_rusqlite(inner: rusqlite::Connection, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conn = Self { inner, path };
        functions::register_regexp(&conn.inner).map_err(|source| conn.open_error(source))?;
        conn.set_busy_policy(BusyPolicy::Spin)?;
        Ok(conn)
    }

    /// Returns the file this connection was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Changes how busy conditions are handled by all statements of this
    /// connection.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Open`] if the engine rejects the handler.
    pub fn set_busy_policy(&self, policy: BusyPolicy) -> Result<()> {
        let result = match policy {
            BusyPolicy::Spin => self.inner.busy_handler(Some(spin)),
            BusyPolicy::Timeout(timeout) => self.inner.busy_timeout(timeout),
        };
        result.map_err(|source| self.open_error(source))
    }

    pub(crate) fn raw(&self) -> &rusqlite::Connection {
        &self.inner
    }

    fn open_error(&self, source: rusqlite::Error) -> SqliteError {
        SqliteError::Open {
            path: self.path.clone(),
            source,
        }
    }
}

/// Busy handler that never gives up.
fn spin(_attempts: i32) -> bool {
    true
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_read_only_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sqlite");
        let err = Connection::open(&path, OpenMode::ReadOnly).unwrap_err();
        match err {
            SqliteError::Open { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_create_then_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.sqlite");
        {
            let conn = Connection::open(&path, OpenMode::ReadWriteCreate).unwrap();
            conn.raw().execute_batch("CREATE TABLE T (x INTEGER);").unwrap();
        }
        let conn = Connection::open(&path, OpenMode::ReadOnly).unwrap();
        assert_eq!(conn.path(), path.as_path());
        assert!(conn.raw().execute_batch("INSERT INTO T VALUES (1);").is_err());
    }

    #[test]
    fn test_busy_policy_can_be_switched() {
        let conn = testing::memory_connection("");
        conn.set_busy_policy(BusyPolicy::Timeout(Duration::from_millis(50)))
            .unwrap();
        conn.set_busy_policy(BusyPolicy::Spin).unwrap();
    }
}
