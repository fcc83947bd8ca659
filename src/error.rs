use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Where an option assignment came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    CommandLine,
    /// A config file directive. `line` is 1-based, 0 when it could not be located.
    File { path: PathBuf, line: usize },
    /// A direct call to the setter.
    Api,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::CommandLine => f.write_str("on the command line"),
            Origin::File { path, line } => write!(f, "in {} (line {line})", path.display()),
            Origin::Api => f.write_str("in a programmatic assignment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("'{key}' is not a valid configuration option ({origin})")]
    UnknownOption { key: String, origin: Origin },

    #[error("'{value}' is not a valid value for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Can't open '{}' in argument {key}: {source}", path.display())]
    FileOpenError {
        key: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Need {key} ({flag})")]
    MissingRequiredValue { key: String, flag: String },

    #[error("Failed to parse {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },

    #[error("Unsupported directive '{key}' in {} (line {line}): {reason}", path.display())]
    UnsupportedDirective {
        key: String,
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Cli(#[from] clap::Error),
}
