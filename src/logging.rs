//! Log dispatchers for the binary.
//!
//! Two dispatchers are built over a run. [`bootstrap`] covers argument
//! parsing and config resolution, before `loglevel` and `logfile` are known.
//! [`master`] is built from the resolved store and covers everything after.
//! Library code never installs either; it only emits through `tracing`.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDateTime;
use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::ConfigError;
use crate::schema::{OptionKey, SCHEMA};
use crate::store::ConfigStore;
use crate::types::{Command, Value};

/// Stderr dispatcher honouring `RUST_LOG`, `warn` when unset.
pub fn bootstrap() -> Dispatch {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter);
    Dispatch::new(subscriber)
}

/// Where the run-time log goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stderr,
    Stdout,
    File(PathBuf),
    Disabled,
}

/// The dispatcher built from the resolved store, with what it was built from.
#[derive(Debug)]
pub struct MasterLog {
    pub dispatch: Dispatch,
    pub destination: LogDestination,
    pub level: LevelFilter,
}

/// Map `loglevel` to a filter. A nulled level turns logging off.
pub fn level_filter(store: &ConfigStore) -> LevelFilter {
    let raw = match store.get(OptionKey::LogLevel) {
        Some(Value::Null) => return LevelFilter::OFF,
        Some(value) => value.as_str(),
        None => SCHEMA.descriptor(OptionKey::LogLevel).default,
    };
    match raw.map(str::to_ascii_uppercase).as_deref() {
        Some("OFF") => LevelFilter::OFF,
        Some("DEBUG") => LevelFilter::DEBUG,
        Some("WARN") => LevelFilter::WARN,
        Some("ERROR") => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// Map `logfile` to a destination.
///
/// `DEFAULT` names a file after the first input (or the command when there
/// are no inputs) stamped with `now`.
pub fn destination(
    store: &ConfigStore,
    command: Command,
    rest: &[String],
    now: NaiveDateTime,
) -> LogDestination {
    let raw = match store.get(OptionKey::LogFile) {
        Some(Value::Null) => return LogDestination::Disabled,
        Some(value) => value.as_str(),
        None => SCHEMA.descriptor(OptionKey::LogFile).default,
    };
    let Some(raw) = raw else {
        return LogDestination::Disabled;
    };
    match raw.to_ascii_uppercase().as_str() {
        "STDERR" => LogDestination::Stderr,
        "STDOUT" => LogDestination::Stdout,
        "NONE" => LogDestination::Disabled,
        "DEFAULT" => {
            let first = rest.first().map(String::as_str);
            LogDestination::File(default_log_file_name(first, command, now).into())
        }
        _ => LogDestination::File(PathBuf::from(raw)),
    }
}

/// `catalog.mrc.gz` run at 2026-10-14 09:05:03 gives
/// `catalog-20261014-090503.log`.
pub fn default_log_file_name(first: Option<&str>, command: Command, now: NaiveDateTime) -> String {
    let stem = match first {
        Some(input) => {
            let base = Path::new(input)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.to_string());
            match base.find('.') {
                Some(dot) => base[..dot].to_string(),
                None => base,
            }
        }
        None => command.as_str().to_string(),
    };
    format!("{stem}-{}.log", now.format("%Y%m%d-%H%M%S"))
}

/// Build the run-time dispatcher from the resolved `loglevel` and `logfile`.
pub fn master(
    store: &ConfigStore,
    command: Command,
    rest: &[String],
    now: NaiveDateTime,
) -> Result<MasterLog, ConfigError> {
    let level = level_filter(store);
    let destination = destination(store, command, rest, now);

    let writer = match &destination {
        LogDestination::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogDestination::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogDestination::File(path) => BoxMakeWriter::new(Mutex::new(open_log(path)?)),
        LogDestination::Disabled => BoxMakeWriter::new(std::io::sink),
    };
    let level = match destination {
        LogDestination::Disabled => LevelFilter::OFF,
        _ => level,
    };

    let subscriber = fmt()
        .with_max_level(level)
        .with_ansi(destination == LogDestination::Stderr)
        .with_writer(writer)
        .finish();

    Ok(MasterLog {
        dispatch: Dispatch::new(subscriber),
        destination,
        level,
    })
}

fn open_log(path: &Path) -> Result<File, ConfigError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ConfigError::FileOpenError {
            key: OptionKey::LogFile.name().to_string(),
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 14)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap()
    }

    fn store_with(pairs: &[(&str, &str)]) -> ConfigStore {
        let mut store = ConfigStore::new();
        for (name, value) in pairs {
            store.set(name, *value).unwrap();
        }
        store
    }

    #[test]
    fn default_name_from_first_input() {
        assert_eq!(
            default_log_file_name(Some("/data/catalog.mrc.gz"), Command::Index, now()),
            "catalog-20261014-090503.log"
        );
    }

    #[test]
    fn default_name_from_command_without_inputs() {
        assert_eq!(
            default_log_file_name(None, Command::Commit, now()),
            "commit-20261014-090503.log"
        );
    }

    #[test]
    fn levels() {
        assert_eq!(level_filter(&ConfigStore::new()), LevelFilter::INFO);
        assert_eq!(level_filter(&store_with(&[("loglevel", "DEBUG")])), LevelFilter::DEBUG);
        assert_eq!(level_filter(&store_with(&[("loglevel", "OFF")])), LevelFilter::OFF);
        assert_eq!(level_filter(&store_with(&[("loglevel", "none")])), LevelFilter::OFF);
    }

    #[test]
    fn destinations() {
        let rest = vec!["records.xml".to_string()];
        let dest = |store: &ConfigStore| destination(store, Command::Index, &rest, now());

        assert_eq!(
            dest(&ConfigStore::new()),
            LogDestination::File("records-20261014-090503.log".into())
        );
        assert_eq!(dest(&store_with(&[("logfile", "STDERR")])), LogDestination::Stderr);
        assert_eq!(dest(&store_with(&[("logfile", "STDOUT")])), LogDestination::Stdout);
        assert_eq!(dest(&store_with(&[("logfile", "NONE")])), LogDestination::Disabled);
        assert_eq!(
            dest(&store_with(&[("logfile", "/var/log/marcsolr.log")])),
            LogDestination::File("/var/log/marcsolr.log".into())
        );
    }

    #[test]
    fn master_writes_to_named_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let store = store_with(&[
            ("logfile", path.to_str().unwrap()),
            ("loglevel", "WARN"),
        ]);
        let log = master(&store, Command::Index, &[], now()).unwrap();
        assert_eq!(log.level, LevelFilter::WARN);

        tracing::dispatcher::with_default(&log.dispatch, || {
            tracing::info!("below threshold");
            tracing::warn!("needs attention");
        });

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("needs attention"));
        assert!(!written.contains("below threshold"));
    }

    #[test]
    fn disabled_destination_turns_level_off() {
        let store = store_with(&[("logfile", "NONE"), ("loglevel", "DEBUG")]);
        let log = master(&store, Command::Index, &[], now()).unwrap();
        assert_eq!(log.destination, LogDestination::Disabled);
        assert_eq!(log.level, LevelFilter::OFF);
    }

    #[test]
    fn unopenable_log_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("run.log");
        let store = store_with(&[("logfile", path.to_str().unwrap())]);
        let err = master(&store, Command::Index, &[], now()).unwrap_err();
        assert!(matches!(err, ConfigError::FileOpenError { ref key, .. } if key == "logfile"));
    }
}
