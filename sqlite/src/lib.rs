//! Typed query layer over read-only SQLite lookups.
//!
//! This crate sits between raw SQL execution and the record types built
//! from query results. It owns prepared statements, binds positional
//! parameters, materializes rows into typed [`Cell`]s and offers the lookup
//! shapes the record layer needs.
//!
//! # Architecture
//!
//! - **`connection`**: opening the database, `REGEXP` support, busy policy
//! - **`statement`**: prepared statements and the row-stepping driver
//! - **`accumulator`**: materializing rows with per-column type checks
//! - **`count`**: single-integer aggregate queries
//! - **`matcher`**: exact, substring and pattern lookups on one column
//!
//! # Quick start
//!
//! ```no_run
//! use decemvirate_sqlite::{Connection, ContainsMatch, ExactMatch, Limit, OpenMode};
//!
//! let conn = Connection::open("pathfinder.sqlite", OpenMode::ReadOnly).unwrap();
//!
//! let mut by_code = ExactMatch::new(&conn, "EnglishPublications", "ProductCode").unwrap();
//! if let Some(row) = by_code.run("PZO1118").unwrap() {
//!     println!("{}", row.get::<String>("Title"));
//! }
//!
//! let mut by_title = ContainsMatch::new(&conn, "EnglishPublications", "Title", Limit::Rows(12)).unwrap();
//! let (rows, total) = by_title.run("Bestiary").unwrap();
//! println!("showing {} of {total} results", rows.len());
//! ```
//!
//! # Busy handling
//!
//! By default a busy database is retried immediately and indefinitely.
//! [`Connection::set_busy_policy`] switches to a bounded timeout instead.

mod accumulator;
mod connection;
mod count;
mod error;
mod functions;
mod matcher;
mod statement;
mod types;

pub use accumulator::RowAccumulator;
pub use connection::{BusyPolicy, Connection, OpenMode};
pub use count::CountQuery;
pub use error::{Result, SqliteError};
pub use matcher::{ContainsMatch, ExactMatch, Limit, PatternMatch, ROWID_COLUMN};
pub use statement::{Cursor, Statement, Step};
pub use types::{Cell, Column, FromCell, Row, StorageClass};
