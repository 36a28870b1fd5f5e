//! German translations of Pathfinder publications, spells and feats.
//!
//! Opens the Decemvirate SQLite database read-only, checks its version and
//! serves lookups through a [`Catalog`] of prepared statements:
//!
//! ```no_run
//! use decemvirate_pathfinder::{Database, MIN_MINOR, REQUIRED_MAJOR};
//!
//! let database = Database::open("pathfinder.sqlite", REQUIRED_MAJOR, MIN_MINOR)?;
//! let mut catalog = database.catalog()?;
//! let (spells, total) = catalog.spells_by_english_name("Fireball")?;
//! println!("{} of {total} spells", spells.len());
//! # Ok::<(), decemvirate_pathfinder::PathfinderError>(())
//! ```

pub mod catalog;
pub mod collection;
pub mod database;
pub mod error;
pub mod feat;
pub mod finder;
pub mod publication;
pub mod spell;
pub mod version;

pub use catalog::{Catalog, DEFAULT_TITLE_LIMIT};
pub use database::{Database, MIN_MINOR, REQUIRED_MAJOR};
pub use error::{PathfinderError, Result, VersionError};
pub use feat::GermanFeat;
pub use finder::{Linked, Record};
pub use publication::{EnglishPublication, GermanPublication};
pub use spell::{ClassLevel, GermanSpell};
pub use version::DatabaseVersion;
