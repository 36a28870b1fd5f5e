//! Result envelopes and their text and JSON renderings.

use std::io::{self, Write};

use decemvirate_pathfinder::{
    Database, DatabaseVersion, EnglishPublication, GermanFeat, GermanPublication, GermanSpell,
};
use serde::Serialize;

use crate::error::{CliError, Status};

/// Which database answered a lookup.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseInfo {
    pub path: String,
    pub version: DatabaseVersion,
}

impl DatabaseInfo {
    pub fn of(database: &Database) -> Self {
        Self {
            path: database.path().display().to_string(),
            version: database.version(),
        }
    }
}

/// A German publication with the originals it translates.
#[derive(Debug, Clone, Serialize)]
pub struct GermanPublicationEntry {
    #[serde(flatten)]
    pub publication: GermanPublication,
    pub originals: Vec<EnglishPublication>,
}

/// An English publication with its German translations.
#[derive(Debug, Clone, Serialize)]
pub struct EnglishPublicationEntry {
    #[serde(flatten)]
    pub publication: EnglishPublication,
    pub translations: Vec<GermanPublication>,
}

const BINARY_NAME: &str = "decemvirate";

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub name_version: String,
    pub authors: Vec<&'static str>,
    pub license: &'static str,
    /// Project home page, empty when the package names none.
    #[serde(skip_serializing_if = "str::is_empty")]
    pub url: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseInfo>,
}

impl VersionInfo {
    pub fn current(database: Option<DatabaseInfo>) -> Self {
        let name = BINARY_NAME;
        let version = env!("CARGO_PKG_VERSION");
        Self {
            name,
            description: env!("CARGO_PKG_DESCRIPTION"),
            version,
            name_version: format!("{name} {version}"),
            authors: env!("CARGO_PKG_AUTHORS")
                .split(':')
                .filter(|author| !author.is_empty())
                .collect(),
            license: env!("CARGO_PKG_LICENSE"),
            url: env!("CARGO_PKG_REPOSITORY"),
            database,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: Status,
    pub text: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stack: Vec<String>,
}

/// Everything an invocation prints, tagged with its `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    GermanPublication {
        count: usize,
        data: Vec<GermanPublicationEntry>,
        database: DatabaseInfo,
    },
    EnglishPublication {
        count: usize,
        data: Vec<EnglishPublicationEntry>,
        database: DatabaseInfo,
    },
    Spell {
        count: usize,
        data: Vec<GermanSpell>,
        database: DatabaseInfo,
    },
    Feat {
        count: usize,
        data: Vec<GermanFeat>,
        database: DatabaseInfo,
    },
    Version {
        data: VersionInfo,
    },
    Error {
        data: ErrorInfo,
    },
}

impl Report {
    pub fn error(status: Status, stack: Vec<String>) -> Self {
        Self::Error {
            data: ErrorInfo {
                code: status,
                text: status.text(),
                stack,
            },
        }
    }

    pub fn from_error(err: &CliError) -> Self {
        Self::error(err.status(), err.stack())
    }

    pub fn status(&self) -> Status {
        let shown = match self {
            Self::Error { data } => return data.code,
            Self::Version { .. } => return Status::Success,
            Self::GermanPublication { data, .. } => data.len(),
            Self::EnglishPublication { data, .. } => data.len(),
            Self::Spell { data, .. } => data.len(),
            Self::Feat { data, .. } => data.len(),
        };
        if shown == 0 {
            Status::NotFound
        } else {
            Status::Success
        }
    }

    fn shown_and_count(&self) -> Option<(usize, usize)> {
        match self {
            Self::GermanPublication { count, data, .. } => Some((data.len(), *count)),
            Self::EnglishPublication { count, data, .. } => Some((data.len(), *count)),
            Self::Spell { count, data, .. } => Some((data.len(), *count)),
            Self::Feat { count, data, .. } => Some((data.len(), *count)),
            Self::Version { .. } | Self::Error { .. } => None,
        }
    }
}

/// Prints the report to stdout, or for errors in text mode to stderr.
pub fn print(report: &Report, json: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    if json {
        write_json(report, &mut stdout.lock())
    } else {
        write_text(report, &mut stdout.lock(), &mut stderr.lock())
    }
}

pub fn write_json(report: &Report, out: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer(&mut *out, report)?;
    writeln!(out)
}

pub fn write_text(report: &Report, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
    match report {
        Report::Error { data } => return write_error(data, err),
        Report::Version { data } => write_version(data, out)?,
        Report::GermanPublication { data, .. } => {
            for entry in data {
                write_german_publication(&entry.publication, out)?;
            }
            if let [entry] = data.as_slice() {
                if !entry.originals.is_empty() {
                    writeln!(out, "This publication translates the following originals:\n")?;
                    for original in &entry.originals {
                        write_english_publication(original, out)?;
                    }
                }
            }
        }
        Report::EnglishPublication { data, .. } => {
            for entry in data {
                write_english_publication(&entry.publication, out)?;
            }
            if let [entry] = data.as_slice() {
                if !entry.translations.is_empty() {
                    writeln!(
                        out,
                        "This publication is translated in the following publications:\n"
                    )?;
                    for translation in &entry.translations {
                        write_german_publication(translation, out)?;
                    }
                }
            }
        }
        Report::Spell { data, .. } => {
            for spell in data {
                write_spell(spell, out)?;
            }
        }
        Report::Feat { data, .. } => {
            for feat in data {
                write_feat(feat, out)?;
            }
        }
    }

    if let Some((shown, count)) = report.shown_and_count() {
        if shown != count {
            writeln!(out, "Showing {shown} of {count} results")?;
        }
    }
    Ok(())
}

fn write_error(error: &ErrorInfo, err: &mut impl Write) -> io::Result<()> {
    writeln!(err, "{}", error.text)?;
    for (i, message) in error.stack.iter().enumerate() {
        if i == 0 {
            writeln!(err, "\nERROR: {message}")?;
        } else {
            writeln!(err, "    Because: {message}")?;
        }
    }
    Ok(())
}

fn write_version(version: &VersionInfo, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", version.name_version)?;
    writeln!(out, "{}", version.description)?;
    writeln!(out)?;
    writeln!(out, "Copyright (c) by {}.", version.authors.join(", "))?;
    writeln!(out, "License: {}", version.license)?;
    if !version.url.is_empty() {
        writeln!(out, "URL: {}", version.url)?;
    }
    if let Some(database) = &version.database {
        writeln!(out)?;
        writeln!(
            out,
            "Pathfinder database \"{}\": Version {}",
            database.path, database.version
        )?;
    }
    Ok(())
}

fn write_german_publication(publication: &GermanPublication, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Title: {}", publication.title)?;
    writeln!(out, "Product Code: {}", publication.product_code)?;
    writeln!(out, "Abbreviation: {}", publication.abbreviation)?;
    writeln!(out, "StatBlock: {}", publication.stat_block)?;
    writeln!(out, "Category: {}", publication.category)?;
    writeln!(out, "Date: {}", publication.date)?;
    writeln!(out, "Commentary: {}", publication.commentary)?;
    writeln!(out, "URL: {}", publication.url)?;
    writeln!(out, "ISBNs: {}", publication.isbns.join(", "))?;
    writeln!(out)
}

fn write_english_publication(
    publication: &EnglishPublication,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "Title: {}", publication.title)?;
    writeln!(out, "Product Code: {}", publication.product_code)?;
    writeln!(out, "Abbreviation: {}", publication.abbreviation)?;
    writeln!(out, "Category: {}", publication.category)?;
    writeln!(out, "Date: {}", publication.date)?;
    writeln!(out, "URL: {}", publication.url)?;
    writeln!(out, "ISBNs: {}", publication.isbns.join(", "))?;
    writeln!(out)
}

fn write_spell(spell: &GermanSpell, out: &mut impl Write) -> io::Result<()> {
    let classes: Vec<String> = spell
        .classes
        .iter()
        .map(|class| match class.level {
            Some(level) => format!("{} {level}", class.name),
            None => class.name.clone(),
        })
        .collect();

    writeln!(out, "German Name: {}", spell.german_name)?;
    writeln!(out, "English Name: {}", spell.english_name)?;
    writeln!(out, "Book: {}, Page: {}", spell.book, spell.page)?;
    writeln!(out, "Class: {}", classes.join(", "))?;
    if spell.race.is_empty() {
        writeln!(out, "School: {}", spell.school)?;
    } else {
        writeln!(out, "School: {}, Race: {}", spell.school, spell.race)?;
    }
    writeln!(out, "Meta: {}", spell.meta)?;
    writeln!(out, "Description: {}", spell.description)?;
    write_urls(&spell.urls, out)?;
    writeln!(out)
}

fn write_urls(urls: &[String], out: &mut impl Write) -> io::Result<()> {
    if !urls.is_empty() {
        writeln!(out, "URLs: {}", urls.join(", "))?;
    }
    Ok(())
}

fn write_feat(feat: &GermanFeat, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "German Name: {}", feat.german_name)?;
    writeln!(out, "English Name: {}", feat.english_name)?;
    writeln!(out, "Book: {}, Page: {}", feat.book, feat.page)?;
    writeln!(out, "Description: {}", feat.description)?;
    writeln!(out, "Types: {}", feat.types.join(", "))?;
    write_urls(&feat.urls, out)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> DatabaseInfo {
        DatabaseInfo {
            path: "pathfinder.sqlite".into(),
            version: DatabaseVersion::new(0, 5, 1),
        }
    }

    fn feat(name: &str) -> GermanFeat {
        GermanFeat {
            id: 2,
            german_name: name.into(),
            english_name: String::new(),
            book: "GRW".into(),
            page: "119".into(),
            description: String::new(),
            types: vec!["Kampf".into(), "Metamagie".into()],
            urls: vec!["https://example.org/talente/ausweichen".into()],
        }
    }

    fn text(report: &Report) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        write_text(report, &mut out, &mut err).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn test_json_envelope() {
        let report = Report::Feat {
            count: 1,
            data: vec![feat("Ausweichen")],
            database: database(),
        };
        let mut out = Vec::new();
        write_json(&report, &mut out).unwrap();

        let line = String::from_utf8(out).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.lines().count(), 1);

        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["type"], "feat");
        assert_eq!(json["count"], 1);
        assert_eq!(json["data"][0]["german_name"], "Ausweichen");
        assert_eq!(json["data"][0]["page"], "119");
        assert_eq!(json["data"][0]["urls"][0], "https://example.org/talente/ausweichen");
        assert!(json["data"][0].get("id").is_none());
        assert_eq!(json["database"]["version"], "0.5.1");
    }

    #[test]
    fn test_text_shows_partial_results() {
        let report = Report::Feat {
            count: 3,
            data: vec![feat("Ausweichen")],
            database: database(),
        };
        let (out, err) = text(&report);
        assert!(out.contains("Book: GRW, Page: 119\n"));
        assert!(out.contains("Types: Kampf, Metamagie\n"));
        assert!(out.contains("URLs: https://example.org/talente/ausweichen\n"));
        assert!(out.ends_with("Showing 1 of 3 results\n"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_error_goes_to_stderr() {
        let report = Report::error(
            Status::Error,
            vec!["failed to open".into(), "unable to open database file".into()],
        );
        let (out, err) = text(&report);
        assert!(out.is_empty());
        assert_eq!(
            err,
            "Fatal error\n\nERROR: failed to open\n    Because: unable to open database file\n"
        );
        assert_eq!(report.status(), Status::Error);
    }

    #[test]
    fn test_error_json_code_is_numeric() {
        let report = Report::error(Status::InvalidParameterCount, Vec::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["data"]["code"], 6);
        assert!(json["data"].get("stack").is_none());
    }

    #[test]
    fn test_version_names_authors_and_license() {
        let version = VersionInfo::current(Some(database()));
        assert_eq!(version.authors, ["Sven Hesse"]);
        assert_eq!(version.license, "AGPL-3.0-or-later");

        let (out, _) = text(&Report::Version { data: version });
        assert!(out.starts_with(&format!("decemvirate {}\n", env!("CARGO_PKG_VERSION"))));
        assert!(out.contains("Copyright (c) by Sven Hesse.\n"));
        assert!(out.contains("License: AGPL-3.0-or-later\n"));
        assert!(out.contains("Pathfinder database \"pathfinder.sqlite\": Version 0.5.1\n"));
    }

    #[test]
    fn test_empty_results_are_not_found() {
        let report = Report::Spell {
            count: 0,
            data: Vec::new(),
            database: database(),
        };
        assert_eq!(report.status(), Status::NotFound);
        assert_eq!(
            Report::Version {
                data: VersionInfo::current(None)
            }
            .status(),
            Status::Success
        );
    }
}
