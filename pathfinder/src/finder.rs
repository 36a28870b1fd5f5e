//! Typed wrappers turning matcher rows into records.

use std::marker::PhantomData;

use decemvirate_sqlite::{
    Cell, Connection, ContainsMatch, CountQuery, ExactMatch, Limit, PatternMatch, Result, Row,
    RowAccumulator,
};
use tracing::debug;

/// A record stored as one row of a fixed table.
pub trait Record: Sized {
    /// Table the record is read from.
    const TABLE: &'static str;

    /// Whether rows are fetched together with their `rowid`.
    const WITH_ROWID: bool = false;

    /// Builds the record from a result row. Missing or mistyped columns
    /// become empty values.
    fn from_row(row: &Row) -> Self;
}

/// Looks up a single record by an exact, case-insensitive column match.
#[derive(Debug)]
pub struct FindOne<'conn, T> {
    matcher: ExactMatch<'conn>,
    record: PhantomData<T>,
}

impl<'conn, T: Record> FindOne<'conn, T> {
    pub fn new(conn: &'conn Connection, column: &str) -> Result<Self> {
        Ok(Self {
            matcher: ExactMatch::new(conn, T::TABLE, column)?,
            record: PhantomData,
        })
    }

    pub fn run(&mut self, needle: impl Into<Cell>) -> Result<Option<T>> {
        Ok(self.matcher.run(needle)?.as_ref().map(T::from_row))
    }
}

/// Looks up records whose column contains a substring.
#[derive(Debug)]
pub struct FindContaining<'conn, T> {
    matcher: ContainsMatch<'conn>,
    record: PhantomData<T>,
}

impl<'conn, T: Record> FindContaining<'conn, T> {
    pub fn new(conn: &'conn Connection, column: &str, limit: Limit) -> Result<Self> {
        Ok(Self {
            matcher: if T::WITH_ROWID {
                ContainsMatch::with_rowid(conn, T::TABLE, column, limit)?
            } else {
                ContainsMatch::new(conn, T::TABLE, column, limit)?
            },
            record: PhantomData,
        })
    }

    /// Returns the found records and the total number of matches.
    pub fn run(&mut self, needle: &str) -> Result<(Vec<T>, usize)> {
        let (rows, count) = self.matcher.run(needle)?;
        Ok((rows.iter().map(T::from_row).collect(), count))
    }
}

/// Looks up records whose column matches a regular expression.
#[derive(Debug)]
pub struct FindMatching<'conn, T> {
    matcher: PatternMatch<'conn>,
    record: PhantomData<T>,
}

impl<'conn, T: Record> FindMatching<'conn, T> {
    pub fn new(conn: &'conn Connection, column: &str, limit: Limit) -> Result<Self> {
        Ok(Self {
            matcher: if T::WITH_ROWID {
                PatternMatch::with_rowid(conn, T::TABLE, column, limit)?
            } else {
                PatternMatch::new(conn, T::TABLE, column, limit)?
            },
            record: PhantomData,
        })
    }

    /// Returns the found records and the total number of matches.
    pub fn run(&mut self, pattern: &str) -> Result<(Vec<T>, usize)> {
        let (rows, count) = self.matcher.run(pattern)?;
        Ok((rows.iter().map(T::from_row).collect(), count))
    }
}

/// A record with web links kept in a side table keyed by its `rowid`.
pub trait Linked: Record {
    /// Table holding the links, with one `URL` per row.
    const URL_TABLE: &'static str;
    /// Column of [`URL_TABLE`](Self::URL_TABLE) referring to the record.
    const URL_KEY: &'static str;

    fn id(&self) -> i64;
    fn set_urls(&mut self, urls: Vec<String>);
}

const TABLE_EXISTS: &str = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?";

/// Fills in the links of [`Linked`] records.
///
/// Databases predating the link tables have no links, which is not an
/// error: every record then keeps an empty list.
#[derive(Debug)]
pub struct FindUrls<'conn, T> {
    query: Option<RowAccumulator<'conn>>,
    record: PhantomData<T>,
}

impl<'conn, T: Linked> FindUrls<'conn, T> {
    pub fn new(conn: &'conn Connection) -> Result<Self> {
        let mut exists = CountQuery::new(conn, TABLE_EXISTS)?;
        exists.bind(1, T::URL_TABLE)?;
        if exists.count()? == 0 {
            debug!(table = T::URL_TABLE, "No link table, records stay without URLs");
            return Ok(Self {
                query: None,
                record: PhantomData,
            });
        }

        let sql = format!(
            "SELECT URL FROM {} WHERE {} = ? ORDER BY rowid",
            T::URL_TABLE,
            T::URL_KEY
        );
        Ok(Self {
            query: Some(RowAccumulator::new(conn, sql)?),
            record: PhantomData,
        })
    }

    /// Replaces the links of every record with the stored ones.
    pub fn fill(&mut self, records: &mut [T]) -> Result<()> {
        let Some(query) = self.query.as_mut() else {
            return Ok(());
        };
        for record in records {
            query.reset();
            query.bind(1, record.id())?;
            query.execute()?;
            let urls = query
                .take_rows()
                .iter()
                .map(|row| row.get::<String>("URL"))
                .filter(|url| !url.is_empty())
                .collect();
            record.set_urls(urls);
        }
        query.reset();
        Ok(())
    }
}
