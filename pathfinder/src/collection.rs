//! Presentation ordering for lookup results.
//!
//! All sorts are stable and compare case-insensitively.

use crate::feat::GermanFeat;
use crate::publication::{EnglishPublication, GermanPublication};
use crate::spell::GermanSpell;

/// Records with a title.
pub trait Titled {
    fn title(&self) -> &str;
}

/// Records carrying both a German and an English name.
pub trait Named {
    fn german_name(&self) -> &str;
    fn english_name(&self) -> &str;
}

impl Titled for GermanPublication {
    fn title(&self) -> &str {
        &self.title
    }
}

impl Titled for EnglishPublication {
    fn title(&self) -> &str {
        &self.title
    }
}

impl Named for GermanSpell {
    fn german_name(&self) -> &str {
        &self.german_name
    }

    fn english_name(&self) -> &str {
        &self.english_name
    }
}

impl Named for GermanFeat {
    fn german_name(&self) -> &str {
        &self.german_name
    }

    fn english_name(&self) -> &str {
        &self.english_name
    }
}

pub fn sort_by_title<T: Titled>(items: &mut [T]) {
    items.sort_by_key(|item| item.title().to_lowercase());
}

pub fn sort_by_german_name<T: Named>(items: &mut [T]) {
    items.sort_by_key(|item| item.german_name().to_lowercase());
}

pub fn sort_by_english_name<T: Named>(items: &mut [T]) {
    items.sort_by_key(|item| item.english_name().to_lowercase());
}

/// Orders spells by their level for `class`, then by German name.
/// Spells without a level for the class come last.
pub fn sort_by_class_level(spells: &mut [GermanSpell], class: &str) {
    spells.sort_by_key(|spell| {
        (
            spell.class_level(class).unwrap_or(i64::MAX),
            spell.german_name.to_lowercase(),
        )
    });
}
