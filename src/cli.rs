//! Clap adapter: the command line, derived from the option catalog.
//!
//! Each sub-command gets its own [`clap::Command`], built at runtime from
//! the descriptors that apply to it. Long flags use the option name
//! verbatim (`--NOdryrun` included), short aliases come from the catalog,
//! and string defaults are registered with clap so that every parsed value
//! carries a [`ValueSource`]. That source is what tells the resolver whether
//! a value was typed by the user or filled in as a default.
//!
//! Validity sets are *not* registered as clap possible values: the setter
//! checks them, which keeps the `none` sentinel usable from the command line.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, value_parser};

use crate::error::{ConfigError, Origin};
use crate::schema::{Descriptor, OptionKey, SCHEMA, ValueType};
use crate::types::{Command, Value};

const INPUTS: &str = "inputs";

const PRECEDENCE_NOTE: &str = "\
You may specify multiple configuration files and they will be loaded in
the order given.

Command line arguments always override configuration file settings.";

/// One option value produced by the command-line parser.
#[derive(Debug, Clone, PartialEq)]
pub struct CliEntry {
    pub key: OptionKey,
    pub value: Value,
    /// `true` if the user supplied it, `false` if it is a parser default.
    pub given: bool,
}

/// Everything the command line contributes to a resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CliValues {
    pub command: Command,
    /// Option values in catalog order. `--config` is not among them.
    pub entries: Vec<CliEntry>,
    pub config_paths: Vec<PathBuf>,
    pub rest: Vec<String>,
}

/// What the raw argument vector asks for, before any flag is parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Run { command: Command, args: Vec<String> },
    CommandHelp(Command),
    /// No command, an unknown one, or `help` without a valid topic.
    Usage { unknown: Option<String> },
}

/// Classify the arguments that follow the program name.
pub fn invocation<I: IntoIterator<Item = String>>(args: I) -> Invocation {
    let mut args = args.into_iter();
    let Some(first) = args.next() else {
        return Invocation::Usage { unknown: None };
    };
    match first.parse::<Command>() {
        Err(unknown) => Invocation::Usage {
            unknown: Some(unknown),
        },
        Ok(Command::Help) => match args.next().and_then(|topic| topic.parse().ok()) {
            Some(Command::Help) | None => Invocation::Usage { unknown: None },
            Some(command) => Invocation::CommandHelp(command),
        },
        Ok(command) => Invocation::Run {
            command,
            args: args.collect(),
        },
    }
}

pub fn basic_usage() -> &'static str {
    "
  marcsolr: get MARC data into Solr

  USAGE
    marcsolr index (index MARC records into Solr)
    marcsolr delete (delete by ID from Solr)
    marcsolr commit (send a 'commit' to a solr install)

  Use \"marcsolr help <cmd>\" for more help

"
}

/// Long-form help for `command`: summary, precedence note, option list.
pub fn command_help(command: Command) -> String {
    let mut cmd = clap_command(command)
        .before_long_help(format!("{}\n\n{PRECEDENCE_NOTE}", command.summary()));
    cmd.render_long_help().to_string()
}

/// Build the clap command for one sub-command from the catalog.
pub fn clap_command(command: Command) -> clap::Command {
    let inputs = Arg::new(INPUTS)
        .num_args(0..)
        .action(ArgAction::Append)
        .value_name("FILE")
        .help("Input files (use STDIN to read standard input)");

    SCHEMA
        .all_keys_for(command)
        .fold(
            clap::Command::new("marcsolr")
                .bin_name(format!("marcsolr {command}"))
                .about(command.summary())
                .after_long_help(PRECEDENCE_NOTE)
                .arg(inputs),
            |cmd, descriptor| cmd.arg(arg_for(descriptor)),
        )
}

fn arg_for(descriptor: &'static Descriptor) -> Arg {
    let mut arg = Arg::new(descriptor.name)
        .long(descriptor.name)
        .help(descriptor.description);
    if let Some(c) = descriptor.short_flag {
        arg = arg.short(c);
    }
    if let Some(set) = descriptor.valid_set {
        arg = arg.long_help(format!(
            "{} [possible values: {}]",
            descriptor.description,
            set.join(", ")
        ));
    }
    arg = match descriptor.value_type {
        ValueType::Flag => return arg.action(ArgAction::SetTrue),
        ValueType::Int => arg
            .action(ArgAction::Set)
            .value_parser(value_parser!(i64))
            .value_name("N"),
        ValueType::Str | ValueType::OutFile => arg.action(ArgAction::Set).value_name("VALUE"),
        ValueType::List => arg.action(ArgAction::Append).value_name("VALUE"),
    };
    match descriptor.default {
        Some(default) => arg.default_value(default),
        None => arg,
    }
}

/// Parse the arguments that follow the command token.
///
/// Flags not applicable to `command` fail with
/// [`UnknownOption`](ConfigError::UnknownOption).
pub fn parse<I, T>(command: Command, args: I) -> Result<CliValues, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv = std::iter::once(OsString::from("marcsolr")).chain(args.into_iter().map(Into::into));
    let matches = clap_command(command)
        .try_get_matches_from(argv)
        .map_err(map_clap_error)?;

    let entries = SCHEMA
        .all_keys_for(command)
        .filter(|d| d.key != OptionKey::Config)
        .filter_map(|d| {
            let value = extract(&matches, d)?;
            Some(CliEntry {
                key: d.key,
                value,
                given: matches.value_source(d.name) == Some(ValueSource::CommandLine),
            })
        })
        .collect();

    let config_paths = strings(&matches, OptionKey::Config.name())
        .into_iter()
        .map(PathBuf::from)
        .collect();

    Ok(CliValues {
        command,
        entries,
        config_paths,
        rest: strings(&matches, INPUTS),
    })
}

fn extract(matches: &ArgMatches, descriptor: &Descriptor) -> Option<Value> {
    let id = descriptor.name;
    match descriptor.value_type {
        ValueType::Flag => Some(Value::Bool(matches.get_flag(id))),
        ValueType::Int => matches.get_one::<i64>(id).copied().map(Value::Int),
        ValueType::Str | ValueType::OutFile => {
            matches.get_one::<String>(id).cloned().map(Value::Str)
        }
        ValueType::List => matches
            .get_many::<String>(id)
            .map(|values| Value::List(values.cloned().map(Value::Str).collect())),
    }
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn map_clap_error(err: clap::Error) -> ConfigError {
    if err.kind() == ErrorKind::UnknownArgument
        && let Some(ContextValue::String(arg)) = err.get(ContextKind::InvalidArg)
    {
        let key = arg.trim_start_matches('-');
        let key = key.split_once('=').map_or(key, |(k, _)| k);
        return ConfigError::UnknownOption {
            key: key.to_string(),
            origin: Origin::CommandLine,
        };
    }
    ConfigError::Cli(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn entry<'a>(values: &'a CliValues, key: OptionKey) -> Option<&'a CliEntry> {
        values.entries.iter().find(|e| e.key == key)
    }

    // --- invocation ---

    #[test]
    fn invocation_selects_command() {
        assert_eq!(
            invocation(args(&["index", "-t", "marcxml", "a.xml"])),
            Invocation::Run {
                command: Command::Index,
                args: args(&["-t", "marcxml", "a.xml"]),
            }
        );
    }

    #[test]
    fn invocation_without_command_is_usage() {
        assert_eq!(invocation(args(&[])), Invocation::Usage { unknown: None });
    }

    #[test]
    fn invocation_unknown_command_is_usage() {
        assert_eq!(
            invocation(args(&["reindex"])),
            Invocation::Usage {
                unknown: Some("reindex".into())
            }
        );
    }

    #[test]
    fn invocation_help_topic() {
        assert_eq!(
            invocation(args(&["help", "delete"])),
            Invocation::CommandHelp(Command::Delete)
        );
        assert_eq!(
            invocation(args(&["help"])),
            Invocation::Usage { unknown: None }
        );
        assert_eq!(
            invocation(args(&["help", "bogus"])),
            Invocation::Usage { unknown: None }
        );
    }

    // --- parse ---

    #[test]
    fn defaults_are_marked_not_given() {
        let values = parse(Command::Index, args(&[])).unwrap();
        let threads = entry(&values, OptionKey::Threads).unwrap();
        assert_eq!(threads.value, Value::Int(1));
        assert!(!threads.given);
        let dryrun = entry(&values, OptionKey::DryRun).unwrap();
        assert_eq!(dryrun.value, Value::Bool(false));
        assert!(!dryrun.given);
    }

    #[test]
    fn options_without_default_are_absent() {
        let values = parse(Command::Index, args(&[])).unwrap();
        assert!(entry(&values, OptionKey::Machine).is_none());
        assert!(entry(&values, OptionKey::CustomDir).is_none());
    }

    #[test]
    fn explicit_values_are_marked_given() {
        let values = parse(
            Command::Index,
            args(&["--threads", "4", "-m", "solr.example.org", "--NOdryrun"]),
        )
        .unwrap();
        let threads = entry(&values, OptionKey::Threads).unwrap();
        assert_eq!(threads.value, Value::Int(4));
        assert!(threads.given);
        let machine = entry(&values, OptionKey::Machine).unwrap();
        assert_eq!(machine.value, Value::from("solr.example.org"));
        assert!(machine.given);
        assert!(entry(&values, OptionKey::NoDryRun).unwrap().given);
    }

    #[test]
    fn explicit_value_equal_to_default_is_still_given() {
        let values = parse(Command::Index, args(&["--threads", "1"])).unwrap();
        assert!(entry(&values, OptionKey::Threads).unwrap().given);
    }

    #[test]
    fn repeatable_options_collect_in_order() {
        let values = parse(
            Command::Index,
            args(&[
                "--config",
                "a.toml",
                "--customdir",
                "x",
                "--config",
                "b.toml",
                "--customdir",
                "y",
            ]),
        )
        .unwrap();
        assert_eq!(
            values.config_paths,
            vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]
        );
        assert_eq!(
            entry(&values, OptionKey::CustomDir).unwrap().value,
            Value::from(vec!["x", "y"])
        );
        assert!(entry(&values, OptionKey::Config).is_none());
    }

    #[test]
    fn positionals_become_rest() {
        let values = parse(Command::Index, args(&["-d", "one.mrc", "two.xml.gz"])).unwrap();
        assert_eq!(values.rest, args(&["one.mrc", "two.xml.gz"]));
        assert!(entry(&values, OptionKey::PrintDoc).unwrap().given);
    }

    #[test]
    fn unknown_flag_is_unknown_option() {
        let err = parse(Command::Index, args(&["--threadz", "4"])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption { ref key, .. } if key == "threadz"));
    }

    #[test]
    fn flag_for_other_command_is_unknown_option() {
        let err = parse(Command::Commit, args(&["--marctype", "marcxml"])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption { ref key, .. } if key == "marctype"));
    }

    #[test]
    fn non_numeric_integer_is_a_cli_error() {
        let err = parse(Command::Index, args(&["--threads", "many"])).unwrap_err();
        assert!(matches!(err, ConfigError::Cli(_)));
    }

    #[test]
    fn invalid_choice_passes_parser_for_the_setter_to_judge() {
        let values = parse(Command::Index, args(&["-L", "none"])).unwrap();
        let level = entry(&values, OptionKey::LogLevel).unwrap();
        assert_eq!(level.value, Value::from("none"));
    }

    #[test]
    fn help_flag_surfaces_as_display_help() {
        let err = parse(Command::Index, args(&["--help"])).unwrap_err();
        match err {
            ConfigError::Cli(e) => assert_eq!(e.kind(), ErrorKind::DisplayHelp),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn command_help_lists_applicable_options() {
        let help = command_help(Command::Commit);
        assert!(help.contains("Send a commit"));
        assert!(help.contains("always override"));
        assert!(help.contains("--machine"));
        assert!(help.contains("--NOjavabin"));
        assert!(!help.contains("--marctype"));
    }

    #[test]
    fn clap_command_is_well_formed() {
        for command in Command::ALL {
            clap_command(command).debug_assert();
        }
    }
}
