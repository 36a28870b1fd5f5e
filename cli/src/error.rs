use std::path::PathBuf;

use decemvirate_pathfinder::PathfinderError;
use serde::Serialize;
use thiserror::Error;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to load configuration '{}'", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("no Pathfinder database given (use --database or DECEMVIRATE_DATABASE)")]
    MissingDatabase,

    #[error(transparent)]
    Pathfinder(#[from] PathfinderError),
}

impl CliError {
    pub fn status(&self) -> Status {
        match self {
            Self::MissingDatabase => Status::MissingParameter,
            Self::Config { .. } | Self::Pathfinder(_) => Status::Error,
        }
    }

    /// Messages of this error and all its causes, outermost first.
    pub fn stack(&self) -> Vec<String> {
        let mut stack = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            stack.push(cause.to_string());
            source = cause.source();
        }
        stack
    }
}

/// Outcome of an invocation, used as the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success = 0,
    NotFound = 1,
    Error = 2,
    MissingParameter = 3,
    InvalidCommand = 4,
    InvalidParameters = 5,
    InvalidParameterCount = 6,
}

impl Status {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::NotFound => "No results found",
            Self::Error => "Fatal error",
            Self::MissingParameter => "Mandatory parameter missing",
            Self::InvalidCommand => "Invalid command",
            Self::InvalidParameters => "Wrong parameters for command",
            Self::InvalidParameterCount => "Wrong number of parameters for command",
        }
    }

    /// Maps a command line parsing failure to its exit status.
    pub fn of_usage_error(kind: clap::error::ErrorKind) -> Self {
        use clap::error::ErrorKind;

        match kind {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Self::Success,
            ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Self::MissingParameter
            }
            ErrorKind::InvalidSubcommand => Self::InvalidCommand,
            ErrorKind::MissingRequiredArgument
            | ErrorKind::UnknownArgument
            | ErrorKind::TooManyValues
            | ErrorKind::TooFewValues
            | ErrorKind::WrongNumberOfValues => Self::InvalidParameterCount,
            ErrorKind::InvalidValue
            | ErrorKind::ValueValidation
            | ErrorKind::ArgumentConflict
            | ErrorKind::NoEquals
            | ErrorKind::InvalidUtf8 => Self::InvalidParameters,
            _ => Self::Error,
        }
    }
}

impl Serialize for Status {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}
