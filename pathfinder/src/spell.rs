//! German spell translations.

use decemvirate_sqlite::{ROWID_COLUMN, Row};
use serde::Serialize;

use crate::finder::{Linked, Record};

/// A class able to cast a spell, and the spell level for that class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassLevel {
    pub name: String,
    /// `None` when the stored entry carries no parseable level.
    pub level: Option<i64>,
}

impl ClassLevel {
    /// Parses one `"Name Level"` entry of the `Classes` column.
    ///
    /// Class names may contain spaces, so only the last word is taken as
    /// the level.
    pub fn parse(entry: &str) -> Self {
        let entry = entry.trim();
        match entry.rsplit_once(' ') {
            Some((name, level)) => match level.parse() {
                Ok(level) => Self {
                    name: name.trim_end().to_owned(),
                    level: Some(level),
                },
                Err(_) => Self {
                    name: entry.to_owned(),
                    level: None,
                },
            },
            None => Self {
                name: entry.to_owned(),
                level: None,
            },
        }
    }
}

/// A spell from a German publication with its English name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GermanSpell {
    /// `rowid` of the spell, referenced by its links.
    #[serde(skip)]
    pub id: i64,
    pub german_name: String,
    pub english_name: String,
    /// Abbreviation of the German publication.
    pub book: String,
    /// Page as printed, e.g. `"283"`.
    pub page: String,
    pub classes: Vec<ClassLevel>,
    pub school: String,
    pub race: String,
    pub meta: String,
    pub description: String,
    pub urls: Vec<String>,
}

impl GermanSpell {
    /// Spell level for the given class, compared case-insensitively.
    pub fn class_level(&self, class: &str) -> Option<i64> {
        let class = class.to_lowercase();
        self.classes
            .iter()
            .find(|c| c.name.to_lowercase() == class)
            .and_then(|c| c.level)
    }
}

impl Record for GermanSpell {
    const TABLE: &'static str = "GermanSpells";
    const WITH_ROWID: bool = true;

    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get(ROWID_COLUMN),
            german_name: row.get("GermanName"),
            english_name: row.get("EnglishName"),
            book: row.get("Book"),
            page: row.get("Page"),
            classes: row
                .get_array("Classes")
                .iter()
                .filter(|entry| !entry.trim().is_empty())
                .map(|entry| ClassLevel::parse(entry))
                .collect(),
            school: row.get("School"),
            race: row.get("Race"),
            meta: row.get("Meta"),
            description: row.get("Description"),
            urls: Vec::new(),
        }
    }
}

impl Linked for GermanSpell {
    const URL_TABLE: &'static str = "GermanSpellURLs";
    const URL_KEY: &'static str = "GermanSpellID";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_urls(&mut self, urls: Vec<String>) {
        self.urls = urls;
    }
}
