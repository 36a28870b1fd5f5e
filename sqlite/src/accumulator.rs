//! Materializing a whole result into typed rows.
//!
//! [`RowAccumulator`] runs its statement and copies every row into a
//! [`Row`], tracking each column's storage class. A column's class is
//! fixed by the first non-null value of an execution; any later non-null
//! value of another class aborts the execution.

use crate::connection::Connection;
use crate::error::{Result, SqliteError};
use crate::statement::{Cursor, Statement, Step};
use crate::types::{Cell, Column, Row, StorageClass};

/// A statement that collects its result rows.
///
/// The rows and columns of the last execution stay available until the
/// next [`reset`](Self::reset) or execution.
///
/// # Examples
///
/// ```no_run
/// use decemvirate_sqlite::{Connection, OpenMode, RowAccumulator};
///
/// let conn = Connection::open("pathfinder.sqlite", OpenMode::ReadOnly).unwrap();
/// let mut version = RowAccumulator::new(&conn, "SELECT * FROM Version LIMIT 1").unwrap();
/// version.execute().unwrap();
///
/// if let Some(row) = version.rows().first() {
///     println!("major version {}", row.get::<i64>("Major"));
/// }
/// ```
#[derive(Debug)]
pub struct RowAccumulator<'conn> {
    statement: Statement<'conn>,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl<'conn> RowAccumulator<'conn> {
    /// Compiles `sql` on the connection.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Prepare`] if the query is rejected.
    pub fn new(conn: &'conn Connection, sql: impl Into<String>) -> Result<Self> {
        Ok(Self {
            statement: Statement::new(conn, sql)?,
            columns: Vec::new(),
            rows: Vec::new(),
        })
    }

    /// Binds a value to the 1-based placeholder `position`.
    pub fn bind(&mut self, position: usize, value: impl Into<Cell>) -> Result<()> {
        self.statement.bind(position, value)
    }

    /// Clears bindings, rows and the column table.
    pub fn reset(&mut self) {
        self.statement.reset();
        self.columns.clear();
        self.rows.clear();
    }

    /// Runs the statement and accumulates every row.
    ///
    /// Rows are appended to those of a previous execution unless
    /// [`reset`](Self::reset) was called in between.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::ColumnTypeMismatch`] or
    /// [`SqliteError::ColumnCountMismatch`] if the result isn't consistent,
    /// and [`SqliteError::Step`] on engine failures.
    pub fn execute(&mut self) -> Result<()> {
        self.accumulate(None)
    }

    /// Runs the statement, keeping at most the first row.
    pub fn execute_first(&mut self) -> Result<()> {
        self.accumulate(Some(1))
    }

    /// Rows of the current result.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Columns of the current result, empty until the first row was seen.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Moves the current rows out, leaving the result empty.
    pub fn take_rows(&mut self) -> Vec<Row> {
        std::mem::take(&mut self.rows)
    }

    pub fn statement(&self) -> &Statement<'conn> {
        &self.statement
    }

    fn accumulate(&mut self, max_rows: Option<usize>) -> Result<()> {
        let columns = &mut self.columns;
        let rows = &mut self.rows;
        let mut seen = 0;
        self.statement.execute(|cursor| {
            accept_row(columns, rows, cursor)?;
            seen += 1;
            match max_rows {
                Some(max) if seen >= max => Ok(Step::Stop),
                _ => Ok(Step::Continue),
            }
        })
    }
}

/// Reads the column table from the first row of an execution.
fn query_columns(columns: &mut Vec<Column>, cursor: &Cursor<'_>) -> Result<()> {
    let count = cursor.column_count();
    columns.reserve(count);
    for index in 0..count {
        columns.push(Column {
            index,
            name: cursor.column_name(index)?.to_owned(),
            class: cursor.storage_class(index)?,
        });
    }
    Ok(())
}

fn accept_row(columns: &mut Vec<Column>, rows: &mut Vec<Row>, cursor: &Cursor<'_>) -> Result<()> {
    if columns.is_empty() {
        query_columns(columns, cursor)?;
    }

    let found = cursor.column_count();
    if found != columns.len() {
        return Err(SqliteError::ColumnCountMismatch {
            expected: columns.len(),
            found,
        });
    }

    let mut row = Row::with_capacity(found);
    for column in columns.iter_mut() {
        let cell = cursor.cell(column.index)?;
        let class = cell.storage_class();
        if column.class != StorageClass::Null && class != StorageClass::Null && column.class != class
        {
            return Err(SqliteError::ColumnTypeMismatch {
                column: column.name.clone(),
                expected: column.class,
                found: class,
            });
        }
        if class != StorageClass::Null {
            column.class = class;
        }
        row.push(column.name.clone(), cell);
    }
    rows.push(row);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::memory_connection;

    #[test]
    fn test_accumulates_rows_and_columns() {
        let conn = memory_connection(
            "CREATE TABLE T (name TEXT, n INTEGER, w REAL, b BLOB);
             INSERT INTO T VALUES ('Alpha', 1, 0.5, x'0102');
             INSERT INTO T VALUES ('Beta', 2, 1.5, NULL);",
        );
        let mut acc = RowAccumulator::new(&conn, "SELECT * FROM T ORDER BY n").unwrap();
        acc.execute().unwrap();

        let names: Vec<&str> = acc.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["name", "n", "w", "b"]);
        let classes: Vec<StorageClass> = acc.columns().iter().map(|c| c.class).collect();
        assert_eq!(
            classes,
            vec![
                StorageClass::Text,
                StorageClass::Integer,
                StorageClass::Real,
                StorageClass::Blob
            ]
        );

        assert_eq!(acc.rows().len(), 2);
        assert_eq!(acc.rows()[0].get::<Vec<u8>>("b"), vec![1, 2]);
        assert_eq!(acc.rows()[1].cell("b"), Some(&Cell::Null));
        assert_eq!(acc.rows()[1].get::<f64>("w"), 1.5);
    }

    #[test]
    fn test_empty_before_execution() {
        let conn = memory_connection("CREATE TABLE T (x INTEGER);");
        let acc = RowAccumulator::new(&conn, "SELECT * FROM T").unwrap();
        assert!(acc.rows().is_empty());
        assert!(acc.columns().is_empty());
    }

    #[test]
    fn test_type_change_across_rows_is_an_error() {
        let conn = memory_connection(
            "CREATE TABLE T (id INTEGER, v);
             INSERT INTO T VALUES (1, 42), (2, 'forty-two');",
        );
        let mut acc = RowAccumulator::new(&conn, "SELECT v FROM T ORDER BY id").unwrap();
        let err = acc.execute().unwrap_err();
        match err {
            SqliteError::ColumnTypeMismatch {
                column,
                expected,
                found,
            } => {
                assert_eq!(column, "v");
                assert_eq!(expected, StorageClass::Integer);
                assert_eq!(found, StorageClass::Text);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The offending row was not appended.
        assert_eq!(acc.rows().len(), 1);
    }

    #[test]
    fn test_null_does_not_fix_or_break_the_class() {
        let conn = memory_connection(
            "CREATE TABLE T (id INTEGER, v);
             INSERT INTO T VALUES (1, NULL), (2, 'text'), (3, NULL), (4, 'more');",
        );
        let mut acc = RowAccumulator::new(&conn, "SELECT v FROM T ORDER BY id").unwrap();
        acc.execute().unwrap();

        assert_eq!(acc.columns()[0].class, StorageClass::Text);
        let cells: Vec<&Cell> = acc.rows().iter().filter_map(|r| r.cell("v")).collect();
        assert_eq!(
            cells,
            vec![
                &Cell::Null,
                &Cell::from("text"),
                &Cell::Null,
                &Cell::from("more")
            ]
        );
    }

    #[test]
    fn test_reset_forces_reinference() {
        let conn = memory_connection(
            "CREATE TABLE T (k TEXT, v);
             INSERT INTO T VALUES ('int', 1), ('text', 'one');",
        );
        let mut acc = RowAccumulator::new(&conn, "SELECT v FROM T WHERE k = ?").unwrap();

        acc.bind(1, "int").unwrap();
        acc.execute().unwrap();
        assert_eq!(acc.columns()[0].class, StorageClass::Integer);

        acc.reset();
        assert!(acc.rows().is_empty());
        acc.bind(1, "text").unwrap();
        acc.execute().unwrap();
        assert_eq!(acc.columns()[0].class, StorageClass::Text);
        assert_eq!(acc.rows().len(), 1);
    }

    #[test]
    fn test_execute_first_keeps_one_row() {
        let conn = memory_connection(
            "CREATE TABLE T (x INTEGER);
             INSERT INTO T VALUES (1), (2), (3);",
        );
        let mut acc = RowAccumulator::new(&conn, "SELECT x FROM T").unwrap();
        acc.execute_first().unwrap();
        assert_eq!(acc.rows().len(), 1);

        let rows = acc.take_rows();
        assert_eq!(rows.len(), 1);
        assert!(acc.rows().is_empty());
    }
}
