//! Single-value `COUNT(*)` style queries.

use crate::connection::Connection;
use crate::error::Result;
use crate::statement::{Statement, Step};
use crate::types::{Cell, StorageClass};

/// A statement returning one integer from one row.
///
/// Intended for queries such as `SELECT COUNT(*) FROM ...`. Only the first
/// row is evaluated. A result that isn't a single integer column leaves the
/// count at 0 instead of failing.
///
/// # Examples
///
/// ```no_run
/// use decemvirate_sqlite::{Connection, CountQuery, OpenMode};
///
/// let conn = Connection::open("pathfinder.sqlite", OpenMode::ReadOnly).unwrap();
/// let mut spells = CountQuery::new(&conn, "SELECT COUNT(*) FROM GermanSpells").unwrap();
/// println!("{} spells", spells.count().unwrap());
/// ```
#[derive(Debug)]
pub struct CountQuery<'conn> {
    statement: Statement<'conn>,
}

impl<'conn> CountQuery<'conn> {
    /// Compiles `sql` on the connection.
    pub fn new(conn: &'conn Connection, sql: impl Into<String>) -> Result<Self> {
        Ok(Self {
            statement: Statement::new(conn, sql)?,
        })
    }

    /// Binds a value to the 1-based placeholder `position`.
    pub fn bind(&mut self, position: usize, value: impl Into<Cell>) -> Result<()> {
        self.statement.bind(position, value)
    }

    /// Clears all bindings.
    pub fn reset(&mut self) {
        self.statement.reset();
    }

    /// Runs the query and returns its value.
    ///
    /// Every call executes the query again.
    pub fn count(&mut self) -> Result<usize> {
        let mut count = 0;
        self.statement.execute(|cursor| {
            if cursor.column_count() != 1 || cursor.storage_class(0)? != StorageClass::Integer {
                return Ok(Step::Stop);
            }
            if let Cell::Integer(value) = cursor.cell(0)? {
                count = usize::try_from(value).unwrap_or(0);
            }
            Ok(Step::Stop)
        })?;
        Ok(count)
    }
}
