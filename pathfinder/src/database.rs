//! Opening the Pathfinder database and checking its layout version.
//!
//! A [`Database`] is only handed out once the `Version` table reports a
//! layout this crate reads: the same major version and at least the
//! requested minor version.

use std::path::Path;

use decemvirate_sqlite::{BusyPolicy, Connection, OpenMode};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{PathfinderError, Result};
use crate::version::DatabaseVersion;

/// Major version of the database layout this crate reads.
pub const REQUIRED_MAJOR: i64 = 0;

/// Oldest minor version of [`REQUIRED_MAJOR`] this crate reads.
pub const MIN_MINOR: i64 = 5;

/// An open, version-checked Pathfinder database.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    version: DatabaseVersion,
}

impl Database {
    /// Opens the database read-only and checks its version against
    /// `required_major.min_minor`.
    pub fn open(path: impl AsRef<Path>, required_major: i64, min_minor: i64) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path, OpenMode::ReadOnly).map_err(|source| {
            PathfinderError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let database = Self::from_connection(conn, required_major, min_minor)?;
        info!(
            path = %path.display(),
            version = %database.version,
            "Opened Pathfinder database"
        );
        Ok(database)
    }

    /// Wraps an already open connection after checking its version.
    pub fn from_connection(conn: Connection, required_major: i64, min_minor: i64) -> Result<Self> {
        let version = DatabaseVersion::read(&conn)
            .map_err(|source| PathfinderError::ReadVersion { source })?;
        debug!(%version, required_major, min_minor, "Checking database version");

        if version.major != required_major {
            return Err(PathfinderError::WrongMajorVersion {
                found: version,
                required_major,
                min_minor,
            });
        }
        if version.minor < min_minor {
            return Err(PathfinderError::VersionTooLow {
                found: version,
                required_major,
                min_minor,
            });
        }

        Ok(Self { conn, version })
    }

    pub fn path(&self) -> &Path {
        self.conn.path()
    }

    pub fn version(&self) -> DatabaseVersion {
        self.version
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Replaces how lookups wait for a locked database.
    pub fn set_busy_policy(&self, policy: BusyPolicy) -> Result<()> {
        self.conn
            .set_busy_policy(policy)
            .map_err(|source| PathfinderError::Prepare { source })
    }

    /// Prepares all lookups with the default title limit.
    pub fn catalog(&self) -> Result<Catalog<'_>> {
        Catalog::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(major: i64, minor: i64) -> Connection {
        let raw = rusqlite::Connection::open_in_memory().unwrap();
        raw.execute_batch(&format!(
            "CREATE TABLE Version (Major INTEGER, Minor INTEGER, Patch INTEGER);
             INSERT INTO Version VALUES ({major}, {minor}, 1);"
        ))
        .unwrap();
        Connection::from_rusqlite(raw, ":memory:").unwrap()
    }

    #[test]
    fn test_compatible_version() {
        let database = Database::from_connection(connection(0, 6), 0, 5).unwrap();
        assert_eq!(database.version(), DatabaseVersion::new(0, 6, 1));
    }

    #[test]
    fn test_wrong_major_version() {
        let err = Database::from_connection(connection(1, 6), 0, 5).unwrap_err();
        assert!(matches!(err, PathfinderError::WrongMajorVersion { .. }));
        assert_eq!(
            err.to_string(),
            "wrong database major version (1.6.1 != 0.5.0)"
        );
    }

    #[test]
    fn test_version_too_low() {
        let err = Database::from_connection(connection(0, 4), 0, 5).unwrap_err();
        assert_eq!(err.to_string(), "database version too low (0.4.1 < 0.5.0)");
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Database::open(dir.path().join("missing.sqlite"), 0, 5).unwrap_err();
        assert!(matches!(err, PathfinderError::Open { .. }));
    }
}
