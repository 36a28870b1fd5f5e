//! German and English Pathfinder publications.
//!
//! English publications are Paizo's originals, identified by a unique
//! product code. German publications are Ulisses Spiele's translations.
//! Most translate exactly one original, some combine several; the Paizo
//! product codes of the translated originals are stored with each German
//! publication.
//!
//! Not every German publication has a product code, and a few share one
//! with another publication. The abbreviation is what identifies them.

use decemvirate_sqlite::Row;
use serde::Serialize;

use crate::finder::Record;

/// A German Pathfinder publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GermanPublication {
    /// Ulisses Spiele product code, possibly empty.
    pub product_code: String,
    pub title: String,
    /// Unique abbreviation used when referencing the publication.
    pub abbreviation: String,
    /// Abbreviation used in creature stat blocks.
    pub stat_block: String,
    /// Product line the publication was released in.
    pub category: String,
    /// First publication date as `YYYY-MM`.
    pub date: String,
    /// Ebook store product page.
    pub url: String,
    pub commentary: String,
    /// Product codes of the English originals this publication translates.
    pub paizo_product_codes: Vec<String>,
    /// ISBNs of the physical editions; empty for ebook-only releases.
    pub isbns: Vec<String>,
}

impl GermanPublication {
    /// Whether this publication contains a translation of the given original.
    pub fn has_paizo_product_code(&self, code: &str) -> bool {
        self.paizo_product_codes.iter().any(|c| c == code)
    }
}

impl Record for GermanPublication {
    const TABLE: &'static str = "GermanPublications";

    fn from_row(row: &Row) -> Self {
        Self {
            product_code: row.get("ProductCode"),
            title: row.get("Title"),
            abbreviation: row.get("Abbreviation"),
            stat_block: row.get("StatBlock"),
            category: row.get("Category"),
            date: row.get("Date"),
            url: row.get("URL"),
            commentary: row.get("Commentary"),
            paizo_product_codes: row.get_array("PaizoProductCodes"),
            isbns: row.get_array("ISBN"),
        }
    }
}

/// An English Pathfinder publication by Paizo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnglishPublication {
    /// Paizo product code, unique per publication.
    pub product_code: String,
    pub date: String,
    pub title: String,
    pub category: String,
    pub abbreviation: String,
    /// Paizo store product page.
    pub url: String,
    pub isbns: Vec<String>,
}

impl Record for EnglishPublication {
    const TABLE: &'static str = "EnglishPublications";

    fn from_row(row: &Row) -> Self {
        Self {
            product_code: row.get("ProductCode"),
            date: row.get("Date"),
            title: row.get("Title"),
            category: row.get("Category"),
            abbreviation: row.get("Abbreviation"),
            url: row.get("URL"),
            isbns: row.get_array("ISBN"),
        }
    }
}
