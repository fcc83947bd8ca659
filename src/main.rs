use std::process::ExitCode;

use chrono::Local;
use serde::Serialize;
use tracing::{error, info};

use marcsolr::cli::{self, Invocation};
use marcsolr::sniff::Sniffer;
use marcsolr::{
    Command, ConfigError, ConfigStore, InputSourceDescriptor, OptionKey, Resolved, Resolver,
    SubmissionSettings, logging,
};

/// What a run would hand to the reader and the Solr sender.
#[derive(Serialize)]
struct Plan<'a> {
    command: &'static str,
    settings: &'a ConfigStore,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    inputs: Vec<InputSourceDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    submission: Option<SubmissionSettings>,
}

impl<'a> Plan<'a> {
    fn build(resolved: &'a Resolved) -> Result<Self, ConfigError> {
        let store = &resolved.store;
        let inputs = match resolved.command {
            Command::Index | Command::Delete => {
                let sniffer = Sniffer::from_store(store)?;
                resolved.rest.iter().map(|input| sniffer.sniff(input)).collect()
            }
            Command::Commit | Command::Help => Vec::new(),
        };
        let submission = if store.flag(OptionKey::DryRun) {
            info!("dry run, not contacting solr");
            None
        } else {
            Some(SubmissionSettings::from_store(store)?)
        };
        Ok(Self {
            command: resolved.command.as_str(),
            settings: store,
            inputs,
            submission,
        })
    }
}

fn main() -> ExitCode {
    let args = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned());

    match cli::invocation(args) {
        Invocation::Usage { unknown } => {
            if let Some(unknown) = unknown {
                eprintln!("marcsolr: unknown command '{unknown}'");
            }
            print!("{}", cli::basic_usage());
            ExitCode::from(2)
        }
        Invocation::CommandHelp(command) => {
            println!("{}", cli::command_help(command));
            ExitCode::SUCCESS
        }
        Invocation::Run { command, args } => match run(command, args) {
            Ok(code) => code,
            Err(ConfigError::Cli(err)) => {
                let _ = err.print();
                ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
            }
            Err(err) => {
                eprintln!("marcsolr: {err}");
                ExitCode::from(1)
            }
        },
    }
}

fn run(command: Command, args: Vec<String>) -> Result<ExitCode, ConfigError> {
    let resolved = Resolver::new()
        .dispatch(logging::bootstrap())
        .resolve(command, &[], args)?;
    let log = logging::master(
        &resolved.store,
        command,
        &resolved.rest,
        Local::now().naive_local(),
    )?;

    tracing::dispatcher::with_default(&log.dispatch, || {
        info!(%command, inputs = resolved.rest.len(), "configuration resolved");
        let plan = Plan::build(&resolved)?;
        match serde_json::to_string_pretty(&plan) {
            Ok(json) => {
                println!("{json}");
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                error!(%err, "failed to render plan");
                eprintln!("marcsolr: failed to render plan: {err}");
                Ok(ExitCode::from(1))
            }
        }
    })
}
