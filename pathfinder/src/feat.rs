//! German feat translations.

use decemvirate_sqlite::{ROWID_COLUMN, Row};
use serde::Serialize;

use crate::finder::{Linked, Record};

/// A feat from a German publication with its English name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GermanFeat {
    #[serde(skip)]
    pub id: i64,
    pub german_name: String,
    pub english_name: String,
    pub book: String,
    pub page: String,
    pub description: String,
    /// Feat types such as `Kampf` or `Metamagie`.
    pub types: Vec<String>,
    pub urls: Vec<String>,
}

impl Record for GermanFeat {
    const TABLE: &'static str = "GermanFeats";
    const WITH_ROWID: bool = true;

    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get(ROWID_COLUMN),
            german_name: row.get("GermanName"),
            english_name: row.get("EnglishName"),
            book: row.get("Book"),
            page: row.get("Page"),
            description: row.get("Description"),
            types: row.get_array("Type"),
            urls: Vec::new(),
        }
    }
}

impl Linked for GermanFeat {
    const URL_TABLE: &'static str = "GermanFeatURLs";
    const URL_KEY: &'static str = "GermanFeatID";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_urls(&mut self, urls: Vec<String>) {
        self.urls = urls;
    }
}

#[cfg(test)]
mod tests {
    use decemvirate_sqlite::Cell;

    use super::*;

    #[test]
    fn test_feat_from_row() {
        let mut row = Row::new();
        row.push("GermanName", Cell::from("Heftiger Angriff"));
        row.push("EnglishName", Cell::from("Power Attack"));
        row.push("Page", Cell::from("119"));
        row.push("Type", Cell::from("Kampf"));

        let feat = GermanFeat::from_row(&row);
        assert_eq!(feat.english_name, "Power Attack");
        assert_eq!(feat.types, vec!["Kampf"]);
        assert_eq!(feat.page, "119");
    }
}
