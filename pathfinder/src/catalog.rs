//! Prepared lookups over an open [`Database`].
//!
//! A [`Catalog`] prepares every statement once and reuses it for each
//! lookup. It borrows the database, so it can't outlive it.

use decemvirate_sqlite::Limit;
use tracing::debug;

use crate::database::Database;
use crate::error::{PathfinderError, Result};
use crate::feat::GermanFeat;
use crate::finder::{FindContaining, FindMatching, FindOne, FindUrls, Linked};
use crate::publication::{EnglishPublication, GermanPublication};
use crate::spell::GermanSpell;

/// Number of publications a title search returns at most.
pub const DEFAULT_TITLE_LIMIT: usize = 12;

/// All lookups of the Pathfinder database.
#[derive(Debug)]
pub struct Catalog<'db> {
    german_by_abbreviation: FindOne<'db, GermanPublication>,
    german_by_title: FindContaining<'db, GermanPublication>,
    german_by_paizo_code: FindContaining<'db, GermanPublication>,
    english_by_product_code: FindOne<'db, EnglishPublication>,
    english_by_abbreviation: FindOne<'db, EnglishPublication>,
    english_by_title: FindContaining<'db, EnglishPublication>,
    spells_by_german_name: FindContaining<'db, GermanSpell>,
    spells_by_english_name: FindContaining<'db, GermanSpell>,
    spells_by_class: FindMatching<'db, GermanSpell>,
    feats_by_german_name: FindContaining<'db, GermanFeat>,
    feats_by_english_name: FindContaining<'db, GermanFeat>,
    spell_urls: FindUrls<'db, GermanSpell>,
    feat_urls: FindUrls<'db, GermanFeat>,
}

impl<'db> Catalog<'db> {
    pub fn new(database: &'db Database) -> Result<Self> {
        Self::with_title_limit(database, DEFAULT_TITLE_LIMIT)
    }

    pub fn with_title_limit(database: &'db Database, title_limit: usize) -> Result<Self> {
        let conn = database.connection();
        let titles = Limit::Rows(title_limit);
        let prepare = |source| PathfinderError::Prepare { source };

        Ok(Self {
            german_by_abbreviation: FindOne::new(conn, "Abbreviation").map_err(prepare)?,
            german_by_title: FindContaining::new(conn, "Title", titles).map_err(prepare)?,
            german_by_paizo_code: FindContaining::new(conn, "PaizoProductCodes", Limit::None)
                .map_err(prepare)?,
            english_by_product_code: FindOne::new(conn, "ProductCode").map_err(prepare)?,
            english_by_abbreviation: FindOne::new(conn, "Abbreviation").map_err(prepare)?,
            english_by_title: FindContaining::new(conn, "Title", titles).map_err(prepare)?,
            spells_by_german_name: FindContaining::new(conn, "GermanName", Limit::None)
                .map_err(prepare)?,
            spells_by_english_name: FindContaining::new(conn, "EnglishName", Limit::None)
                .map_err(prepare)?,
            spells_by_class: FindMatching::new(conn, "Classes", Limit::None).map_err(prepare)?,
            feats_by_german_name: FindContaining::new(conn, "GermanName", Limit::None)
                .map_err(prepare)?,
            feats_by_english_name: FindContaining::new(conn, "EnglishName", Limit::None)
                .map_err(prepare)?,
            spell_urls: FindUrls::new(conn).map_err(prepare)?,
            feat_urls: FindUrls::new(conn).map_err(prepare)?,
        })
    }

    pub fn german_publication(&mut self, abbreviation: &str) -> Result<Option<GermanPublication>> {
        debug!(abbreviation, "Looking up German publication");
        self.german_by_abbreviation
            .run(abbreviation)
            .map_err(PathfinderError::lookup(format!(
                "German publication '{abbreviation}'"
            )))
    }

    pub fn english_publication(&mut self, product_code: &str) -> Result<Option<EnglishPublication>> {
        debug!(product_code, "Looking up English publication");
        self.english_by_product_code
            .run(product_code)
            .map_err(PathfinderError::lookup(format!(
                "English publication '{product_code}'"
            )))
    }

    pub fn english_publication_by_abbreviation(
        &mut self,
        abbreviation: &str,
    ) -> Result<Option<EnglishPublication>> {
        debug!(abbreviation, "Looking up English publication by abbreviation");
        self.english_by_abbreviation
            .run(abbreviation)
            .map_err(PathfinderError::lookup(format!(
                "English publication '{abbreviation}'"
            )))
    }

    /// German publications whose title contains `title`, with the total
    /// number of matches.
    pub fn german_publications_by_title(
        &mut self,
        title: &str,
    ) -> Result<(Vec<GermanPublication>, usize)> {
        debug!(title, "Searching German publications by title");
        self.german_by_title
            .run(title)
            .map_err(PathfinderError::lookup(format!(
                "German publications titled '{title}'"
            )))
    }

    pub fn english_publications_by_title(
        &mut self,
        title: &str,
    ) -> Result<(Vec<EnglishPublication>, usize)> {
        debug!(title, "Searching English publications by title");
        self.english_by_title
            .run(title)
            .map_err(PathfinderError::lookup(format!(
                "English publications titled '{title}'"
            )))
    }

    /// German publications translating the English original with
    /// `product_code`.
    pub fn german_publications_by_paizo_code(
        &mut self,
        product_code: &str,
    ) -> Result<Vec<GermanPublication>> {
        if product_code.is_empty() {
            return Ok(Vec::new());
        }
        debug!(product_code, "Searching translations");
        let (candidates, _) = self
            .german_by_paizo_code
            .run(product_code)
            .map_err(PathfinderError::lookup(format!(
                "translations of '{product_code}'"
            )))?;
        // Substring matches also hit longer codes sharing the prefix.
        Ok(candidates
            .into_iter()
            .filter(|publication| publication.has_paizo_product_code(product_code))
            .collect())
    }

    /// Finds German publications by abbreviation, falling back to a title
    /// search when no abbreviation matches.
    pub fn find_german_publications(
        &mut self,
        query: &str,
    ) -> Result<(Vec<GermanPublication>, usize)> {
        if let Some(publication) = self.german_publication(query)? {
            return Ok((vec![publication], 1));
        }
        self.german_publications_by_title(query)
    }

    /// Finds English publications by product code, then abbreviation, then
    /// title.
    pub fn find_english_publications(
        &mut self,
        query: &str,
    ) -> Result<(Vec<EnglishPublication>, usize)> {
        if let Some(publication) = self.english_publication(query)? {
            return Ok((vec![publication], 1));
        }
        if let Some(publication) = self.english_publication_by_abbreviation(query)? {
            return Ok((vec![publication], 1));
        }
        self.english_publications_by_title(query)
    }

    /// English originals translated by a German publication. Codes without
    /// a known original are skipped.
    pub fn originals(&mut self, german: &GermanPublication) -> Result<Vec<EnglishPublication>> {
        let mut originals = Vec::with_capacity(german.paizo_product_codes.len());
        for code in &german.paizo_product_codes {
            if let Some(original) = self.english_publication(code)? {
                originals.push(original);
            }
        }
        Ok(originals)
    }

    pub fn translations(&mut self, english: &EnglishPublication) -> Result<Vec<GermanPublication>> {
        self.german_publications_by_paizo_code(&english.product_code)
    }

    pub fn spells_by_german_name(&mut self, name: &str) -> Result<(Vec<GermanSpell>, usize)> {
        debug!(name, "Searching spells by German name");
        let found = self.spells_by_german_name.run(name);
        with_urls(found, &mut self.spell_urls, format!("spells named '{name}'"))
    }

    pub fn spells_by_english_name(&mut self, name: &str) -> Result<(Vec<GermanSpell>, usize)> {
        debug!(name, "Searching spells by English name");
        let found = self.spells_by_english_name.run(name);
        with_urls(found, &mut self.spell_urls, format!("spells named '{name}'"))
    }

    /// Spells available to `class`, optionally only those of `level`.
    pub fn spells_by_class(
        &mut self,
        class: &str,
        level: Option<i64>,
    ) -> Result<(Vec<GermanSpell>, usize)> {
        let pattern = class_pattern(class, level);
        debug!(class, ?level, %pattern, "Searching spells by class");
        let found = self.spells_by_class.run(&pattern);
        with_urls(found, &mut self.spell_urls, format!("spells of class '{class}'"))
    }

    pub fn feats_by_german_name(&mut self, name: &str) -> Result<(Vec<GermanFeat>, usize)> {
        debug!(name, "Searching feats by German name");
        let found = self.feats_by_german_name.run(name);
        with_urls(found, &mut self.feat_urls, format!("feats named '{name}'"))
    }

    pub fn feats_by_english_name(&mut self, name: &str) -> Result<(Vec<GermanFeat>, usize)> {
        debug!(name, "Searching feats by English name");
        let found = self.feats_by_english_name.run(name);
        with_urls(found, &mut self.feat_urls, format!("feats named '{name}'"))
    }
}

/// Completes found records with their links.
fn with_urls<T: Linked>(
    found: decemvirate_sqlite::Result<(Vec<T>, usize)>,
    urls: &mut FindUrls<'_, T>,
    what: String,
) -> Result<(Vec<T>, usize)> {
    let (mut records, count) = found.map_err(PathfinderError::lookup(what.as_str()))?;
    urls.fill(&mut records)
        .map_err(PathfinderError::lookup(format!("links of {what}")))?;
    Ok((records, count))
}

/// Builds the `Classes` pattern for a class and optional level. The class
/// name is matched literally.
fn class_pattern(class: &str, level: Option<i64>) -> String {
    let class = regex::escape(class);
    match level {
        Some(level) => format!(r".*\b{class} {level}\b.*"),
        None => format!(r".*\b{class}\b.*"),
    }
}
