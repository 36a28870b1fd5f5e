//! Prepared statements and the row-stepping driver.
//!
//! A [`Statement`] owns one compiled query together with its bindings.
//! [`Statement::execute`] steps through the result and hands each row to a
//! visitor, which decides whether stepping continues.

use rusqlite::types::ValueRef;

use crate::connection::Connection;
use crate::error::{Result, SqliteError};
use crate::types::{Cell, StorageClass};

/// Decision returned by a row visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Fetch the next row.
    Continue,
    /// Stop stepping; `execute` returns successfully.
    Stop,
}

/// Read access to the row the cursor currently points at.
pub struct Cursor<'r> {
    row: &'r rusqlite::Row<'r>,
}

impl Cursor<'_> {
    /// Number of columns the engine reports for the current row.
    pub fn column_count(&self) -> usize {
        self.row.as_ref().column_count()
    }

    /// Name of the column at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Step`] if `index` is out of range.
    pub fn column_name(&self, index: usize) -> Result<&str> {
        self.row
            .as_ref()
            .column_name(index)
            .map_err(SqliteError::step)
    }

    /// Borrowed engine value of the cell at `index`.
    pub fn value(&self, index: usize) -> Result<ValueRef<'_>> {
        self.row.get_ref(index).map_err(SqliteError::step)
    }

    /// Storage class of the cell at `index` in this row.
    pub fn storage_class(&self, index: usize) -> Result<StorageClass> {
        self.value(index).map(StorageClass::of)
    }

    /// Owned copy of the cell at `index`.
    pub fn cell(&self, index: usize) -> Result<Cell> {
        self.value(index).map(Cell::from_value_ref)
    }
}

/// A compiled query with positional parameters.
///
/// The statement is finalized when dropped. It cannot be cloned; moving it
/// moves ownership of the compiled query.
///
/// # Examples
///
/// ```no_run
/// use decemvirate_sqlite::{Connection, OpenMode, Statement, Step};
///
/// let conn = Connection::open("pathfinder.sqlite", OpenMode::ReadOnly).unwrap();
/// let mut stmt = Statement::new(&conn, "SELECT Title FROM GermanPublications WHERE Category = ?").unwrap();
/// stmt.bind(1, "Abenteuerpfad").unwrap();
///
/// let mut titles = Vec::new();
/// stmt.execute(|cursor| {
///     titles.push(cursor.cell(0)?);
///     Ok(Step::Continue)
/// })
/// .unwrap();
/// ```
#[derive(Debug)]
pub struct Statement<'conn> {
    inner: rusqlite::Statement<'conn>,
    sql: String,
}

impl<'conn> Statement<'conn> {
    /// Compiles `sql` on the connection.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Prepare`] for malformed SQL or unknown
    /// tables and columns.
    pub fn new(conn: &'conn Connection, sql: impl Into<String>) -> Result<Self> {
        let sql = sql.into();
        match conn.raw().prepare(&sql) {
            Ok(inner) => Ok(Self { inner, sql }),
            Err(source) => Err(SqliteError::Prepare { sql, source }),
        }
    }

    /// The query text this statement was compiled from.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of positional placeholders in the query.
    pub fn parameter_count(&self) -> usize {
        self.inner.parameter_count()
    }

    /// Binds a value to the 1-based placeholder `position`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Bind`] if the engine rejects the binding, for
    /// example when `position` is out of range. Other bindings are kept.
    pub fn bind(&mut self, position: usize, value: impl Into<Cell>) -> Result<()> {
        let value = value.into();
        self.inner
            .raw_bind_parameter(position, &value)
            .map_err(|source| SqliteError::Bind { position, source })
    }

    /// Clears all bindings.
    ///
    /// The cursor is already rewound whenever [`execute`](Self::execute)
    /// returns, so after this the statement is back to its freshly prepared
    /// state.
    pub fn reset(&mut self) {
        self.inner.clear_bindings();
    }

    /// Steps through all result rows, calling `visit` for each.
    ///
    /// Stepping ends when the result is exhausted or `visit` returns
    /// [`Step::Stop`]. Busy conditions are handled by the connection's
    /// [`BusyPolicy`](crate::BusyPolicy).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Step`] if the engine fails to produce a row,
    /// and passes on any error returned by `visit`.
    pub fn execute<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(&Cursor<'_>) -> Result<Step>,
    {
        let mut rows = self.inner.raw_query();
        while let Some(row) = rows.next().map_err(SqliteError::step)? {
            if visit(&Cursor { row })? == Step::Stop {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::memory_connection;

    const FIXTURE: &str = "
        CREATE TABLE T (name TEXT, n INTEGER);
        INSERT INTO T VALUES ('Alpha', 1), ('Alphabet', 2), ('Beta', 3);
    ";

    #[test]
    fn test_prepare_rejects_bad_sql() {
        let conn = memory_connection(FIXTURE);
        let err = Statement::new(&conn, "SELECT * FROM Nope").unwrap_err();
        assert!(matches!(err, SqliteError::Prepare { ref sql, .. } if sql == "SELECT * FROM Nope"));
    }

    #[test]
    fn test_execute_visits_every_row() {
        let conn = memory_connection(FIXTURE);
        let mut stmt = Statement::new(&conn, "SELECT name FROM T ORDER BY n").unwrap();
        let mut names = Vec::new();
        stmt.execute(|cursor| {
            names.push(cursor.cell(0)?);
            Ok(Step::Continue)
        })
        .unwrap();
        assert_eq!(
            names,
            vec![Cell::from("Alpha"), Cell::from("Alphabet"), Cell::from("Beta")]
        );
    }

    #[test]
    fn test_execute_stops_early() {
        let conn = memory_connection(FIXTURE);
        let mut stmt = Statement::new(&conn, "SELECT name FROM T").unwrap();
        let mut visited = 0;
        stmt.execute(|_| {
            visited += 1;
            Ok(Step::Stop)
        })
        .unwrap();
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_bind_out_of_range_keeps_other_bindings() {
        let conn = memory_connection(FIXTURE);
        let mut stmt = Statement::new(&conn, "SELECT n FROM T WHERE name = ?").unwrap();
        assert_eq!(stmt.parameter_count(), 1);

        stmt.bind(1, "Beta").unwrap();
        let err = stmt.bind(2, "Alpha").unwrap_err();
        assert!(matches!(err, SqliteError::Bind { position: 2, .. }));

        let mut found = Vec::new();
        stmt.execute(|cursor| {
            found.push(cursor.cell(0)?);
            Ok(Step::Continue)
        })
        .unwrap();
        assert_eq!(found, vec![Cell::Integer(3)]);
    }

    #[test]
    fn test_reset_clears_bindings() {
        let conn = memory_connection(FIXTURE);
        let mut stmt = Statement::new(&conn, "SELECT COUNT(*) FROM T WHERE name = ?").unwrap();
        stmt.bind(1, "Alpha").unwrap();
        stmt.reset();

        let mut count = Cell::Null;
        stmt.execute(|cursor| {
            count = cursor.cell(0)?;
            Ok(Step::Stop)
        })
        .unwrap();
        assert_eq!(count, Cell::Integer(0));
    }

    #[test]
    fn test_visitor_error_propagates() {
        let conn = memory_connection(FIXTURE);
        let mut stmt = Statement::new(&conn, "SELECT name FROM T").unwrap();
        let err = stmt
            .execute(|_| {
                Err(SqliteError::ColumnCountMismatch {
                    expected: 1,
                    found: 2,
                })
            })
            .unwrap_err();
        assert!(matches!(err, SqliteError::ColumnCountMismatch { .. }));

        // The cursor was rewound, so the statement can run again.
        let mut rows = 0;
        stmt.execute(|_| {
            rows += 1;
            Ok(Step::Continue)
        })
        .unwrap();
        assert_eq!(rows, 3);
    }
}
