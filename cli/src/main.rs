mod config;
mod error;
mod output;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use decemvirate_pathfinder::collection::{
    sort_by_class_level, sort_by_english_name, sort_by_german_name,
};
use decemvirate_pathfinder::{Catalog, DEFAULT_TITLE_LIMIT, Database, MIN_MINOR, REQUIRED_MAJOR};
use decemvirate_sqlite::BusyPolicy;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{CliError, Status};
use crate::output::{
    DatabaseInfo, EnglishPublicationEntry, GermanPublicationEntry, Report, VersionInfo,
};

#[derive(Debug, Parser)]
#[command(name = "decemvirate")]
#[command(about = "Look up German translations of Pathfinder publications, spells and feats")]
struct Cli {
    /// SQLite database to use.
    #[arg(short, long, env = "DECEMVIRATE_DATABASE", global = true)]
    database: Option<PathBuf>,
    /// Output information in JSON format instead of plain text.
    #[arg(short, long, global = true)]
    json: bool,
    /// YAML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log more; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search German publication by abbreviation or title.
    #[command(name = "finddepub")]
    FindGermanPublication(QueryArgs),
    /// Search English publication by product code, abbreviation or title.
    #[command(name = "findenpub")]
    FindEnglishPublication(QueryArgs),
    /// Search German spells by German name.
    #[command(name = "finddespell")]
    FindGermanSpell(QueryArgs),
    /// Search German spells by English name.
    #[command(name = "findenspell")]
    FindEnglishSpell(QueryArgs),
    /// Search spells by class (and level).
    #[command(name = "findspellbyclass")]
    FindSpellByClass(SpellByClassArgs),
    /// Search German feats by German name.
    #[command(name = "finddefeat")]
    FindGermanFeat(QueryArgs),
    /// Search German feats by English name.
    #[command(name = "findenfeat")]
    FindEnglishFeat(QueryArgs),
    /// Display version and, if given, the database version.
    Version,
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Abbreviation, product code, title or name to search for.
    query: String,
}

#[derive(Debug, Args)]
struct SpellByClassArgs {
    /// Class name, e.g. "Magier".
    class: String,
    /// Only spells of this level.
    level: Option<i64>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(canonical_command(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => return usage_error(err),
    };

    let config = match cli.config.as_deref().map(Config::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => return finish(&Report::from_error(&err), cli.json),
    };
    let json = cli.json || config.json;
    init_logging(cli.verbose, config.log_level.as_deref());

    let report = run(&cli, &config).unwrap_or_else(|err| Report::from_error(&err));
    finish(&report, json)
}

fn finish(report: &Report, json: bool) -> ExitCode {
    if let Err(err) = output::print(report, json) {
        // Nothing sensible left to report to when stdout is gone.
        debug!(%err, "Failed to write output");
        return ExitCode::from(Status::Error.code());
    }
    ExitCode::from(report.status().code())
}

/// Reports a command line parsing failure with its exit status.
fn usage_error(err: clap::Error) -> ExitCode {
    let status = Status::of_usage_error(err.kind());
    if status == Status::Success {
        print_usage(&err);
        return ExitCode::SUCCESS;
    }

    // Parsing failed, so look for the JSON flag by hand.
    let json = std::env::args().skip(1).any(|arg| arg == "-j" || arg == "--json");
    if json {
        let message = err.kind().as_str().unwrap_or("invalid command line").to_owned();
        return finish(&Report::error(status, vec![message]), true);
    }
    print_usage(&err);
    ExitCode::from(status.code())
}

fn print_usage(err: &clap::Error) {
    if let Err(err) = err.print() {
        debug!(%err, "Failed to write usage");
    }
}

/// Lower-cases the command name when it names a command in any case, so
/// `FindDePub` runs `finddepub`.
fn canonical_command(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut args: Vec<OsString> = args.into_iter().collect();
    let Some(index) = command_position(&args) else {
        return args;
    };
    let Some(given) = args[index].to_str() else {
        return args;
    };

    let command = Cli::command();
    let known = command
        .get_subcommands()
        .map(|subcommand| subcommand.get_name())
        .find(|name| name.eq_ignore_ascii_case(given));
    if let Some(name) = known {
        args[index] = OsString::from(name);
    }
    args
}

/// Index of the first positional argument, skipping global options and
/// their values.
fn command_position(args: &[OsString]) -> Option<usize> {
    let mut index = 1;
    while index < args.len() {
        let arg = args[index].to_string_lossy();
        if arg == "--" {
            return (index + 1 < args.len()).then_some(index + 1);
        }
        if let Some(long) = arg.strip_prefix("--") {
            // `--database path` takes the next argument, `--database=path` doesn't.
            if long == "database" || long == "config" {
                index += 1;
            }
        } else if let Some(short) = arg.strip_prefix('-').filter(|short| !short.is_empty()) {
            // In `-vd path` the value follows; in `-dpath` it is attached.
            if let Some(at) = short.find(['d', 'c']) {
                if at + 1 == short.len() {
                    index += 1;
                }
            }
        } else {
            return Some(index);
        }
        index += 1;
    }
    None
}

/// Logs to stderr. `RUST_LOG` wins over `-v`, which wins over the
/// configured level.
fn init_logging(verbose: u8, configured: Option<&str>) {
    let level = match verbose {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli, config: &Config) -> Result<Report, CliError> {
    let path = cli.database.as_deref().or(config.database.as_deref());

    match &cli.command {
        Command::Version => Ok(run_version(path)),
        Command::FindGermanPublication(args) => {
            lookup(path, config, |catalog, db| run_find_german_publications(catalog, &args.query, db))
        }
        Command::FindEnglishPublication(args) => {
            lookup(path, config, |catalog, db| run_find_english_publications(catalog, &args.query, db))
        }
        Command::FindGermanSpell(args) => {
            lookup(path, config, |catalog, db| run_find_german_spells(catalog, &args.query, db))
        }
        Command::FindEnglishSpell(args) => {
            lookup(path, config, |catalog, db| run_find_english_spells(catalog, &args.query, db))
        }
        Command::FindSpellByClass(args) => lookup(path, config, |catalog, db| {
            run_find_spells_by_class(catalog, &args.class, args.level, db)
        }),
        Command::FindGermanFeat(args) => {
            lookup(path, config, |catalog, db| run_find_german_feats(catalog, &args.query, db))
        }
        Command::FindEnglishFeat(args) => {
            lookup(path, config, |catalog, db| run_find_english_feats(catalog, &args.query, db))
        }
    }
}

/// Opens the database and runs one lookup against it.
fn lookup<F>(path: Option<&Path>, config: &Config, find: F) -> Result<Report, CliError>
where
    F: FnOnce(&mut Catalog<'_>, DatabaseInfo) -> Result<Report, CliError>,
{
    let path = path.ok_or(CliError::MissingDatabase)?;
    let database = Database::open(path, REQUIRED_MAJOR, MIN_MINOR)?;
    if let Some(ms) = config.busy_timeout_ms {
        database.set_busy_policy(BusyPolicy::Timeout(Duration::from_millis(ms)))?;
    }

    let title_limit = config.title_limit.unwrap_or(DEFAULT_TITLE_LIMIT);
    let mut catalog = Catalog::with_title_limit(&database, title_limit)?;
    find(&mut catalog, DatabaseInfo::of(&database))
}

fn run_version(path: Option<&Path>) -> Report {
    // The version is informational, so any database that opens will do.
    let database = path.and_then(|path| match Database::open(path, 0, 0) {
        Ok(database) => Some(DatabaseInfo::of(&database)),
        Err(err) => {
            debug!(%err, "No database version available");
            None
        }
    });
    Report::Version {
        data: VersionInfo::current(database),
    }
}

fn run_find_german_publications(
    catalog: &mut Catalog<'_>,
    query: &str,
    database: DatabaseInfo,
) -> Result<Report, CliError> {
    let (publications, count) = catalog.find_german_publications(query)?;
    let mut data = Vec::with_capacity(publications.len());
    for publication in publications {
        let originals = catalog.originals(&publication)?;
        data.push(GermanPublicationEntry {
            publication,
            originals,
        });
    }
    Ok(Report::GermanPublication {
        count,
        data,
        database,
    })
}

fn run_find_english_publications(
    catalog: &mut Catalog<'_>,
    query: &str,
    database: DatabaseInfo,
) -> Result<Report, CliError> {
    let (publications, count) = catalog.find_english_publications(query)?;
    let mut data = Vec::with_capacity(publications.len());
    for publication in publications {
        let translations = catalog.translations(&publication)?;
        data.push(EnglishPublicationEntry {
            publication,
            translations,
        });
    }
    Ok(Report::EnglishPublication {
        count,
        data,
        database,
    })
}

fn run_find_german_spells(
    catalog: &mut Catalog<'_>,
    name: &str,
    database: DatabaseInfo,
) -> Result<Report, CliError> {
    let (mut spells, count) = catalog.spells_by_german_name(name)?;
    sort_by_german_name(&mut spells);
    Ok(Report::Spell {
        count,
        data: spells,
        database,
    })
}

fn run_find_english_spells(
    catalog: &mut Catalog<'_>,
    name: &str,
    database: DatabaseInfo,
) -> Result<Report, CliError> {
    let (mut spells, count) = catalog.spells_by_english_name(name)?;
    sort_by_english_name(&mut spells);
    Ok(Report::Spell {
        count,
        data: spells,
        database,
    })
}

fn run_find_spells_by_class(
    catalog: &mut Catalog<'_>,
    class: &str,
    level: Option<i64>,
    database: DatabaseInfo,
) -> Result<Report, CliError> {
    let (mut spells, count) = catalog.spells_by_class(class, level)?;
    sort_by_class_level(&mut spells, class);
    Ok(Report::Spell {
        count,
        data: spells,
        database,
    })
}

fn run_find_german_feats(
    catalog: &mut Catalog<'_>,
    name: &str,
    database: DatabaseInfo,
) -> Result<Report, CliError> {
    let (mut feats, count) = catalog.feats_by_german_name(name)?;
    sort_by_german_name(&mut feats);
    Ok(Report::Feat {
        count,
        data: feats,
        database,
    })
}

fn run_find_english_feats(
    catalog: &mut Catalog<'_>,
    name: &str,
    database: DatabaseInfo,
) -> Result<Report, CliError> {
    let (mut feats, count) = catalog.feats_by_english_name(name)?;
    sort_by_english_name(&mut feats);
    Ok(Report::Feat {
        count,
        data: feats,
        database,
    })
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_spell_by_class_with_level() {
        let cli = Cli::try_parse_from(["decemvirate", "-d", "pf.sqlite", "findspellbyclass", "Magier", "3"])
            .unwrap();
        match cli.command {
            Command::FindSpellByClass(args) => {
                assert_eq!(args.class, "Magier");
                assert_eq!(args.level, Some(3));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.database.as_deref(), Some(Path::new("pf.sqlite")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["decemvirate", "finddefeat", "Angriff", "-j", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    fn canonical(args: &[&str]) -> Vec<String> {
        canonical_command(args.iter().map(OsString::from))
            .into_iter()
            .map(|arg| arg.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_command_names_ignore_case() {
        assert_eq!(
            canonical(&["decemvirate", "FINDDEPUB", "GRW"]),
            ["decemvirate", "finddepub", "GRW"]
        );
        assert_eq!(
            canonical(&["decemvirate", "-d", "FindEnPub", "-j", "FindEnPub", "CRB"]),
            ["decemvirate", "-d", "FindEnPub", "-j", "findenpub", "CRB"]
        );
        assert_eq!(
            canonical(&["decemvirate", "-vd", "pf.sqlite", "Version"]),
            ["decemvirate", "-vd", "pf.sqlite", "version"]
        );
        assert_eq!(
            canonical(&["decemvirate", "--config=c.yaml", "FindSpellByClass", "Magier"]),
            ["decemvirate", "--config=c.yaml", "findspellbyclass", "Magier"]
        );
        // Arguments after the command keep their case.
        assert_eq!(
            canonical(&["decemvirate", "finddespell", "VERSION"]),
            ["decemvirate", "finddespell", "VERSION"]
        );
        assert_eq!(canonical(&["decemvirate", "FindAll"]), ["decemvirate", "FindAll"]);

        let cli =
            Cli::try_parse_from(canonical(&["decemvirate", "FindDeFeat", "Angriff"])).unwrap();
        assert!(matches!(cli.command, Command::FindGermanFeat(_)));
    }

    #[test]
    fn test_usage_error_kinds() {
        let kind = |args: &[&str]| Cli::try_parse_from(args).unwrap_err().kind();

        assert_eq!(kind(&["decemvirate", "findall", "x"]), ErrorKind::InvalidSubcommand);
        assert_eq!(
            kind(&["decemvirate", "findspellbyclass", "Magier", "drei"]),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            kind(&["decemvirate", "finddespell", "a", "b"]),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            kind(&["decemvirate", "finddespell"]),
            ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_lookup_without_database() {
        let cli = Cli::try_parse_from(["decemvirate", "finddespell", "Feuer"]).unwrap();
        let err = run(&cli, &Config::default()).unwrap_err();
        assert_eq!(err.status(), Status::MissingParameter);
    }
}
