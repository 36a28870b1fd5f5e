//! Version information stored in the database itself.
//!
//! The `Version` table holds a single row with integer `Major`, `Minor` and
//! `Patch` columns. A database is compatible when its major version matches
//! exactly and its minor version is at least the required one.

use std::fmt;

use decemvirate_sqlite::{Cell, Connection, Row, RowAccumulator};

use crate::error::VersionError;

/// Version of a Pathfinder database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatabaseVersion {
    pub major: i64,
    pub minor: i64,
    pub patch: i64,
}

impl DatabaseVersion {
    pub fn new(major: i64, minor: i64, patch: i64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether this version satisfies `required_major.min_minor`.
    ///
    /// # Examples
    ///
    /// ```
    /// use decemvirate_pathfinder::DatabaseVersion;
    ///
    /// let version = DatabaseVersion::new(0, 6, 2);
    /// assert!(version.is_compatible(0, 5));
    /// assert!(!version.is_compatible(0, 7));
    /// assert!(!version.is_compatible(1, 0));
    /// ```
    pub fn is_compatible(&self, required_major: i64, min_minor: i64) -> bool {
        self.major == required_major && self.minor >= min_minor
    }

    /// Reads the version out of the `Version` table.
    pub fn read(conn: &Connection) -> Result<Self, VersionError> {
        let mut query = RowAccumulator::new(conn, "SELECT * FROM Version LIMIT 1")?;
        query.execute()?;
        let row = query.rows().first().ok_or(VersionError::Empty)?;

        Ok(Self {
            major: integer(row, "Major")?,
            minor: integer(row, "Minor")?,
            patch: integer(row, "Patch")?,
        })
    }
}

fn integer(row: &Row, name: &str) -> Result<i64, VersionError> {
    match row.cell(name) {
        Some(Cell::Integer(value)) => Ok(*value),
        _ => Err(VersionError::Missing),
    }
}

impl fmt::Display for DatabaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl serde::Serialize for DatabaseVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
