//! Single-column lookups over one table.
//!
//! Three query shapes are provided, each bound to a fixed table and column
//! at construction and re-run with a new needle on every call:
//!
//! - [`ExactMatch`]: `column = ? COLLATE NOCASE`, at most one row
//! - [`ContainsMatch`]: `column LIKE '%needle%'`, optionally capped
//! - [`PatternMatch`]: `lower(column) REGEXP lower(pattern)`, optionally capped
//!
//! The capped matchers run a companion `COUNT(*)` over the same predicate,
//! so they report how many rows matched in total even when only some of
//! them were materialized. Their `with_rowid` constructors additionally
//! select each row's `rowid` as [`ROWID_COLUMN`], for rows that other
//! tables reference by rowid.

use crate::accumulator::RowAccumulator;
use crate::connection::Connection;
use crate::count::CountQuery;
use crate::error::{Result, SqliteError};
use crate::types::{Cell, Row};

/// Name under which `with_rowid` matchers return the `rowid` of a row.
pub const ROWID_COLUMN: &str = "RowID";

/// Maximum number of rows a bounded matcher materializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    #[default]
    None,
    Rows(usize),
}

impl Limit {
    fn clause(self) -> String {
        match self {
            Self::None => String::new(),
            Self::Rows(n) => format!(" LIMIT {n}"),
        }
    }
}

impl From<Option<usize>> for Limit {
    fn from(limit: Option<usize>) -> Self {
        limit.map_or(Self::None, Self::Rows)
    }
}

/// Validates that a table or column name contains only alphanumeric
/// characters and underscores.
pub(crate) fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(SqliteError::InvalidIdentifier(identifier.to_string()));
    }
    if !identifier.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(SqliteError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}

/// Finds at most one row whose column equals the needle, ignoring case.
///
/// # Examples
///
/// ```no_run
/// use decemvirate_sqlite::{Connection, ExactMatch, OpenMode};
///
/// let conn = Connection::open("pathfinder.sqlite", OpenMode::ReadOnly).unwrap();
/// let mut by_abbreviation = ExactMatch::new(&conn, "GermanPublications", "Abbreviation").unwrap();
///
/// if let Some(row) = by_abbreviation.run("ABR1").unwrap() {
///     println!("{}", row.get::<String>("Title"));
/// }
/// ```
#[derive(Debug)]
pub struct ExactMatch<'conn> {
    fetch: RowAccumulator<'conn>,
}

impl<'conn> ExactMatch<'conn> {
    /// Prepares `SELECT * FROM table WHERE column = ? COLLATE NOCASE`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InvalidIdentifier`] for names that aren't
    /// plain identifiers, and [`SqliteError::Prepare`] for unknown ones.
    pub fn new(conn: &'conn Connection, table: &str, column: &str) -> Result<Self> {
        validate_identifier(table)?;
        validate_identifier(column)?;
        let sql = format!("SELECT * FROM {table} WHERE {column} = ? COLLATE NOCASE");
        Ok(Self {
            fetch: RowAccumulator::new(conn, sql)?,
        })
    }

    /// Looks up the needle, keeping the first matching row in
    /// [`rows`](Self::rows).
    pub fn execute(&mut self, needle: impl Into<Cell>) -> Result<()> {
        self.fetch.reset();
        self.fetch.bind(1, needle)?;
        self.fetch.execute_first()
    }

    /// Looks up the needle and returns the first matching row.
    pub fn run(&mut self, needle: impl Into<Cell>) -> Result<Option<Row>> {
        let result = self.execute(needle);
        let row = self.fetch.take_rows().into_iter().next();
        self.reset();
        result.map(|()| row)
    }

    pub fn reset(&mut self) {
        self.fetch.reset();
    }

    pub fn rows(&self) -> &[Row] {
        self.fetch.rows()
    }
}

/// Capped fetch plus uncapped count over the same single-parameter predicate.
#[derive(Debug)]
struct BoundedMatch<'conn> {
    fetch: RowAccumulator<'conn>,
    count: CountQuery<'conn>,
    limit: Limit,
}

impl<'conn> BoundedMatch<'conn> {
    fn new(
        conn: &'conn Connection,
        table: &str,
        column: &str,
        predicate: &str,
        limit: Limit,
        rowid: bool,
    ) -> Result<Self> {
        validate_identifier(table)?;
        validate_identifier(column)?;
        let predicate = predicate.replace("{column}", column);
        let select = if rowid {
            format!("rowid AS {ROWID_COLUMN}, *")
        } else {
            "*".to_owned()
        };
        let fetch = format!("SELECT {select} FROM {table} WHERE {predicate}{}", limit.clause());
        let count = format!("SELECT COUNT(*) FROM {table} WHERE {predicate}");
        Ok(Self {
            fetch: RowAccumulator::new(conn, fetch)?,
            count: CountQuery::new(conn, count)?,
            limit,
        })
    }

    fn execute(&mut self, needle: &str) -> Result<usize> {
        self.fetch.reset();
        self.fetch.bind(1, needle)?;
        self.fetch.execute()?;

        self.count.reset();
        self.count.bind(1, needle)?;
        self.count.count()
    }

    fn run(&mut self, needle: &str) -> Result<(Vec<Row>, usize)> {
        let result = self.execute(needle);
        let rows = self.fetch.take_rows();
        self.fetch.reset();
        result.map(|count| (rows, count))
    }
}

const CONTAINS: &str = "{column} LIKE ?";
const PATTERN: &str = "lower({column}) REGEXP lower(?)";

/// Substring search over one column, capped to a number of rows.
///
/// The needle is wrapped as `%needle%`, so `LIKE` wildcards inside it keep
/// their meaning. Matching follows SQLite's `LIKE`, which ignores ASCII case.
///
/// # Examples
///
/// ```no_run
/// use decemvirate_sqlite::{Connection, ContainsMatch, Limit, OpenMode};
///
/// let conn = Connection::open("pathfinder.sqlite", OpenMode::ReadOnly).unwrap();
/// let mut by_title = ContainsMatch::new(&conn, "EnglishPublications", "Title", Limit::Rows(12)).unwrap();
///
/// let (rows, total) = by_title.run("Bestiary").unwrap();
/// println!("showing {} of {total}", rows.len());
/// ```
#[derive(Debug)]
pub struct ContainsMatch<'conn> {
    inner: BoundedMatch<'conn>,
}

impl<'conn> ContainsMatch<'conn> {
    /// Prepares `SELECT * FROM table WHERE column LIKE ? [LIMIT n]` and its
    /// count.
    pub fn new(conn: &'conn Connection, table: &str, column: &str, limit: Limit) -> Result<Self> {
        Ok(Self {
            inner: BoundedMatch::new(conn, table, column, CONTAINS, limit, false)?,
        })
    }

    /// Like [`new`](Self::new), with each row's `rowid` in [`ROWID_COLUMN`].
    pub fn with_rowid(
        conn: &'conn Connection,
        table: &str,
        column: &str,
        limit: Limit,
    ) -> Result<Self> {
        Ok(Self {
            inner: BoundedMatch::new(conn, table, column, CONTAINS, limit, true)?,
        })
    }

    /// Searches for the needle and returns the total number of matches.
    ///
    /// At most the configured limit of rows is kept in [`rows`](Self::rows).
    pub fn execute(&mut self, needle: &str) -> Result<usize> {
        self.inner.execute(&wildcard(needle))
    }

    /// Searches for the needle and returns the kept rows and the total
    /// number of matches.
    pub fn run(&mut self, needle: &str) -> Result<(Vec<Row>, usize)> {
        self.inner.run(&wildcard(needle))
    }

    pub fn reset(&mut self) {
        self.inner.fetch.reset();
        self.inner.count.reset();
    }

    pub fn rows(&self) -> &[Row] {
        self.inner.fetch.rows()
    }

    pub fn limit(&self) -> Limit {
        self.inner.limit
    }
}

fn wildcard(needle: &str) -> String {
    format!("%{needle}%")
}

/// Case-insensitive regular expression search over one column, capped to a
/// number of rows.
///
/// Both the column and the pattern are lower-cased before matching. The
/// pattern is used as given; it is searched for anywhere in the column.
#[derive(Debug)]
pub struct PatternMatch<'conn> {
    inner: BoundedMatch<'conn>,
}

impl<'conn> PatternMatch<'conn> {
    /// Prepares `SELECT * FROM table WHERE lower(column) REGEXP lower(?)
    /// [LIMIT n]` and its count.
    pub fn new(conn: &'conn Connection, table: &str, column: &str, limit: Limit) -> Result<Self> {
        Ok(Self {
            inner: BoundedMatch::new(conn, table, column, PATTERN, limit, false)?,
        })
    }

    /// Like [`new`](Self::new), with each row's `rowid` in [`ROWID_COLUMN`].
    pub fn with_rowid(
        conn: &'conn Connection,
        table: &str,
        column: &str,
        limit: Limit,
    ) -> Result<Self> {
        Ok(Self {
            inner: BoundedMatch::new(conn, table, column, PATTERN, limit, true)?,
        })
    }

    /// Searches for the pattern and returns the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Step`] if the pattern is not a valid regular
    /// expression.
    pub fn execute(&mut self, pattern: &str) -> Result<usize> {
        self.inner.execute(pattern)
    }

    /// Searches for the pattern and returns the kept rows and the total
    /// number of matches.
    pub fn run(&mut self, pattern: &str) -> Result<(Vec<Row>, usize)> {
        self.inner.run(pattern)
    }

    pub fn reset(&mut self) {
        self.inner.fetch.reset();
        self.inner.count.reset();
    }

    pub fn rows(&self) -> &[Row] {
        self.inner.fetch.rows()
    }

    pub fn limit(&self) -> Limit {
        self.inner.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::memory_connection;

    const FIXTURE: &str = "
        CREATE TABLE T (name TEXT, classes TEXT);
        INSERT INTO T VALUES ('Alpha', 'Wizard 1,Cleric 2');
        INSERT INTO T VALUES ('Alphabet', 'Wizard 3');
        INSERT INTO T VALUES ('Beta', 'Druid 1');
    ";

    fn names(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|r| r.get::<String>("name")).collect()
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("GermanSpells").is_ok());
        assert!(validate_identifier("col_2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("T; DROP TABLE T").is_err());
        assert!(validate_identifier("a-b").is_err());
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let conn = memory_connection(FIXTURE);
        let mut exact = ExactMatch::new(&conn, "T", "name").unwrap();

        let upper = exact.run("ALPHA").unwrap();
        let lower = exact.run("alpha").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.unwrap().get::<String>("name"), "Alpha");
    }

    #[test]
    fn test_exact_match_no_row() {
        let conn = memory_connection(FIXTURE);
        let mut exact = ExactMatch::new(&conn, "T", "name").unwrap();
        assert_eq!(exact.run("zzz").unwrap(), None);
        assert!(exact.rows().is_empty());
    }

    #[test]
    fn test_exact_match_keeps_one_row_of_many() {
        let conn = memory_connection(
            "CREATE TABLE D (code TEXT);
             INSERT INTO D VALUES ('X'), ('x'), ('X');",
        );
        let mut exact = ExactMatch::new(&conn, "D", "code").unwrap();
        exact.execute("x").unwrap();
        assert_eq!(exact.rows().len(), 1);
    }

    #[test]
    fn test_exact_match_rejects_bad_identifiers() {
        let conn = memory_connection(FIXTURE);
        let err = ExactMatch::new(&conn, "T", "name = name OR 1").unwrap_err();
        assert!(matches!(err, SqliteError::InvalidIdentifier(_)));

        let err = ExactMatch::new(&conn, "Nope", "name").unwrap_err();
        assert!(matches!(err, SqliteError::Prepare { .. }));
    }

    #[test]
    fn test_contains_match_reports_true_count() {
        let conn = memory_connection(FIXTURE);
        let mut contains = ContainsMatch::new(&conn, "T", "name", Limit::Rows(1)).unwrap();

        let count = contains.execute("Alpha").unwrap();
        assert_eq!(count, 2);
        assert_eq!(contains.rows().len(), 1);
        let name = contains.rows()[0].get::<String>("name");
        assert!(name == "Alpha" || name == "Alphabet");
    }

    #[test]
    fn test_contains_match_without_limit() {
        let conn = memory_connection(FIXTURE);
        let mut contains = ContainsMatch::new(&conn, "T", "name", Limit::None).unwrap();

        let (rows, count) = contains.run("a").unwrap();
        assert_eq!(count, 3);
        assert_eq!(rows.len(), 3);
        assert!(contains.rows().is_empty());
    }

    #[test]
    fn test_contains_match_is_repeatable() {
        let conn = memory_connection(FIXTURE);
        let mut contains = ContainsMatch::new(&conn, "T", "name", Limit::Rows(5)).unwrap();

        let first = contains.execute("pha").unwrap();
        let first_rows = names(contains.rows());
        contains.reset();
        let second = contains.execute("pha").unwrap();
        assert_eq!(first, second);
        assert_eq!(first_rows, names(contains.rows()));
    }

    #[test]
    fn test_pattern_match_uses_word_boundaries() {
        let conn = memory_connection(FIXTURE);
        let mut pattern = PatternMatch::new(&conn, "T", "classes", Limit::None).unwrap();

        let (rows, count) = pattern.run(r".*\bWIZARD\b.*").unwrap();
        assert_eq!(count, 2);
        assert_eq!(names(&rows), vec!["Alpha", "Alphabet"]);

        let (rows, count) = pattern.run(r".*\bwizard 3\b.*").unwrap();
        assert_eq!(count, 1);
        assert_eq!(names(&rows), vec!["Alphabet"]);

        let (rows, count) = pattern.run(r"\bwiz\b").unwrap();
        assert_eq!(count, 0);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_pattern_match_capped() {
        let conn = memory_connection(FIXTURE);
        let mut pattern = PatternMatch::new(&conn, "T", "classes", Limit::Rows(1)).unwrap();
        assert_eq!(pattern.limit(), Limit::Rows(1));

        let count = pattern.execute("1").unwrap();
        assert_eq!(count, 2);
        assert_eq!(pattern.rows().len(), 1);
    }

    #[test]
    fn test_with_rowid_selects_rowid() {
        let conn = memory_connection(FIXTURE);
        let mut contains = ContainsMatch::with_rowid(&conn, "T", "name", Limit::None).unwrap();

        let (rows, count) = contains.run("Beta").unwrap();
        assert_eq!(count, 1);
        assert_eq!(rows[0].get::<i64>(ROWID_COLUMN), 3);
        assert_eq!(rows[0].get::<String>("name"), "Beta");

        let mut pattern = PatternMatch::with_rowid(&conn, "T", "classes", Limit::None).unwrap();
        let (rows, _) = pattern.run(r"\bwizard 3\b").unwrap();
        assert_eq!(rows[0].get::<i64>(ROWID_COLUMN), 2);

        let mut plain = ContainsMatch::new(&conn, "T", "name", Limit::None).unwrap();
        let (rows, _) = plain.run("Beta").unwrap();
        assert_eq!(rows[0].cell(ROWID_COLUMN), None);
    }

    #[test]
    fn test_pattern_match_invalid_regex_fails() {
        let conn = memory_connection(FIXTURE);
        let mut pattern = PatternMatch::new(&conn, "T", "classes", Limit::None).unwrap();
        let err = pattern.execute("(").unwrap_err();
        assert!(matches!(err, SqliteError::Step { .. }));
    }
}
