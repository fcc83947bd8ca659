//! Core resolution pipeline: the setter and the three-tier merge.
//!
//! Operates on pre-loaded data (`ResolveInput`): config file bodies and the
//! already-parsed command line. Steps:
//!
//! 1. Evaluate each file's directives through the setter, files in listed
//!    order, directives in document order (later assignments win).
//! 2. Reconcile the command line: explicitly given values always go through
//!    the setter; parser defaults only when no file set the key.
//!
//! Files are fully merged before any command-line value is looked at.
//! Changing that order changes which source wins.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliValues;
use crate::error::{ConfigError, Origin};
use crate::file;
use crate::schema::{Descriptor, Multiplicity, SCHEMA};
use crate::store::ConfigStore;
use crate::types::{Command, OutputStream, Value};
use crate::validate;

/// All pre-loaded data needed to resolve a configuration.
pub struct ResolveInput {
    /// Config file contents in listed order: first = lowest priority.
    pub files: Vec<(PathBuf, String)>,
    pub cli: CliValues,
}

/// Outcome of a resolution: the populated store and the positional arguments.
#[derive(Debug)]
pub struct Resolved {
    pub command: Command,
    pub store: ConfigStore,
    /// Positional arguments left after flag parsing (the input files).
    pub rest: Vec<String>,
}

pub fn resolve(input: ResolveInput) -> Result<Resolved, ConfigError> {
    let mut store = ConfigStore::new();

    for (path, content) in &input.files {
        info!(path = %path.display(), "Reading config-file");
        for directive in file::parse_directives(path, content)? {
            let origin = Origin::File {
                path: path.clone(),
                line: directive.line,
            };
            apply(&mut store, &directive.key, directive.value, &origin)?;
        }
    }

    let CliValues {
        command,
        entries,
        rest,
        ..
    } = input.cli;

    for entry in entries {
        let descriptor = SCHEMA.descriptor(entry.key);
        if entry.given {
            debug!(option = descriptor.name, value = %entry.value, "command-line override");
            assign(&mut store, descriptor, entry.value)?;
        } else if !store.has(entry.key) {
            debug!(option = descriptor.name, value = %entry.value, "command-line default");
            assign(&mut store, descriptor, entry.value)?;
        }
    }

    Ok(Resolved {
        command,
        store,
        rest,
    })
}

/// The setter, addressed by option name.
///
/// Returns the value now stored for the (possibly negated) key, or `None`
/// when the assignment was a no-op.
pub(crate) fn apply<'s>(
    store: &'s mut ConfigStore,
    name: &str,
    value: Value,
    origin: &Origin,
) -> Result<Option<&'s Value>, ConfigError> {
    let descriptor = SCHEMA
        .lookup(name)
        .ok_or_else(|| ConfigError::UnknownOption {
            key: name.to_string(),
            origin: origin.clone(),
        })?;
    assign(store, descriptor, value)
}

pub(crate) fn assign<'s>(
    store: &'s mut ConfigStore,
    descriptor: &'static Descriptor,
    value: Value,
) -> Result<Option<&'s Value>, ConfigError> {
    let (descriptor, value) = match descriptor.negates {
        Some(base) => {
            if validate::coerce(descriptor, value)? != Value::Bool(true) {
                debug!(option = descriptor.name, "ignoring false-valued negation");
                return Ok(None);
            }
            (SCHEMA.descriptor(base), Value::Bool(false))
        }
        None => (descriptor, value),
    };

    if descriptor.takes_none && value.tokens().iter().any(|t| t == "none") {
        debug!(option = descriptor.name, "cleared by none sentinel");
        return Ok(Some(store.put(descriptor.key, Value::Null)));
    }

    let value = validate::coerce(descriptor, value)?;
    validate::check_valid(descriptor, &value)?;

    let value = if descriptor.is_output_stream() {
        Value::Stream(open_stream(descriptor, value)?)
    } else {
        value
    };

    let stored = match descriptor.multiplicity() {
        Multiplicity::Single => value,
        Multiplicity::Accumulating => {
            let mut items = match store.take(descriptor.key) {
                Some(Value::List(existing)) => existing,
                _ => Vec::new(),
            };
            match value {
                Value::List(incoming) => items.extend(incoming),
                other => items.push(other),
            }
            Value::List(items)
        }
    };

    debug!(option = descriptor.name, value = %stored, "set option");
    Ok(Some(store.put(descriptor.key, stored)))
}

fn open_stream(descriptor: &Descriptor, value: Value) -> Result<OutputStream, ConfigError> {
    let target = match value {
        Value::Stream(stream) => return Ok(stream),
        Value::Str(target) => target,
        other => other.to_string(),
    };
    if let Some(stream) = OutputStream::from_token(&target) {
        return Ok(stream);
    }
    let path = PathBuf::from(target);
    let file = File::create(&path).map_err(|source| ConfigError::FileOpenError {
        key: descriptor.name.to_string(),
        path: path.clone(),
        source,
    })?;
    Ok(OutputStream::File {
        path,
        file: Arc::new(file),
    })
}
