use std::ffi::OsString;
use std::path::PathBuf;

use tracing::Dispatch;

use crate::cli;
use crate::error::ConfigError;
use crate::file;
use crate::resolve::{self, ResolveInput, Resolved};
use crate::types::Command;

/// Entry point for resolving a marcsolr configuration.
///
/// Does the I/O around the pure pipeline in [`resolve`](crate::resolve):
/// parses the command line, reads config files, and runs the merge. The
/// logging capability is injected with [`dispatch`](Self::dispatch); every
/// event emitted during resolution goes to that dispatcher and nowhere else.
#[derive(Default)]
pub struct Resolver {
    dispatch: Option<Dispatch>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route resolution-time log events to `dispatch`.
    ///
    /// Without one, events go to whatever dispatcher is current for the
    /// calling thread.
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Resolve the configuration for `command`.
    ///
    /// `config_paths` are evaluated first, followed by every `--config` given
    /// in `args`, each in listed order. `args` are the tokens after the
    /// command itself.
    pub fn resolve<I, T>(
        &self,
        command: Command,
        config_paths: &[PathBuf],
        args: I,
    ) -> Result<Resolved, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.in_context(|| {
            let cli = cli::parse(command, args)?;
            let paths: Vec<PathBuf> = config_paths
                .iter()
                .chain(&cli.config_paths)
                .cloned()
                .collect();
            let files = file::load_config_files(&paths)?;
            resolve::resolve(ResolveInput { files, cli })
        })
    }

    fn in_context<R>(&self, f: impl FnOnce() -> R) -> R {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}
