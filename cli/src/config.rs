//! Optional YAML configuration file.
//!
//! Every setting can be overridden on the command line; the environment
//! sits between the two for the database path.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CliError;

/// Settings read from `--config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Pathfinder database to open.
    pub database: Option<PathBuf>,
    /// Maximum number of publications a title search shows.
    pub title_limit: Option<usize>,
    /// Print JSON instead of text.
    pub json: bool,
    /// Log filter used when neither `RUST_LOG` nor `-v` is given.
    pub log_level: Option<String>,
    /// Give up on a locked database after this many milliseconds instead
    /// of waiting indefinitely.
    pub busy_timeout_ms: Option<u64>,
}

impl Config {
    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let config_error = |source| CliError::Config {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(|err| config_error(err.into()))?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|err| config_error(err.into()))
    }
}
