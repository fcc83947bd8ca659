//! Config file loading and directive extraction.
//!
//! A config file is a TOML document whose top-level `key = value` pairs are
//! read as an ordered list of assignment directives. Nothing in the file is
//! executed: there are no includes, conditionals or loops, and every
//! directive is handed to the setter exactly as written, in document order
//! (`toml_edit` preserves it).
//!
//! ```toml
//! machine = "solr.example.org"
//! port = 8983
//! customdir = ["lib", "vendor/lib"]
//! NOjavabin = true
//! debugfile = "NONE"
//! ```
//!
//! Only strings, integers, booleans and arrays of those map to directive
//! values. Tables, floats and datetimes are rejected.

use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item};

use crate::error::ConfigError;
use crate::types::Value;

/// One `key = value` assignment read from a config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub key: String,
    pub value: Value,
    /// 1-based line of the assignment, 0 if it could not be located.
    pub line: usize,
}

/// Read every config file, in the order given.
///
/// Each file is opened, read to the end and closed before the next one is
/// touched. A file that cannot be read is fatal.
pub fn load_config_files(paths: &[PathBuf]) -> Result<Vec<(PathBuf, String)>, ConfigError> {
    paths
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .map(|content| (path.clone(), content))
                .map_err(|source| ConfigError::FileOpenError {
                    key: "config".into(),
                    path: path.clone(),
                    source,
                })
        })
        .collect()
}

/// Parse a config file body into its directives, in document order.
pub fn parse_directives(path: &Path, content: &str) -> Result<Vec<Directive>, ConfigError> {
    let doc: DocumentMut = content.parse().map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut directives = Vec::new();
    for (key, item) in doc.iter() {
        let line = find_key_line(content, key);
        let unsupported = |reason: &str| ConfigError::UnsupportedDirective {
            key: key.to_string(),
            path: path.to_path_buf(),
            line,
            reason: reason.to_string(),
        };
        let value = match item {
            Item::Value(v) => convert(v).map_err(unsupported)?,
            Item::Table(_) | Item::ArrayOfTables(_) => {
                return Err(unsupported("tables are not assignment directives"));
            }
            Item::None => continue,
        };
        directives.push(Directive {
            key: key.to_string(),
            value,
            line,
        });
    }
    Ok(directives)
}

fn convert(value: &toml_edit::Value) -> Result<Value, &'static str> {
    match value {
        toml_edit::Value::String(s) => Ok(Value::Str(s.value().clone())),
        toml_edit::Value::Integer(i) => Ok(Value::Int(*i.value())),
        toml_edit::Value::Boolean(b) => Ok(Value::Bool(*b.value())),
        toml_edit::Value::Array(items) => items
            .iter()
            .map(convert)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        toml_edit::Value::Float(_) => Err("floating-point values are not supported"),
        toml_edit::Value::Datetime(_) => Err("datetime values are not supported"),
        toml_edit::Value::InlineTable(_) => Err("inline tables are not supported"),
    }
}

/// Find the 1-indexed line of a top-level `key = ...` assignment.
///
/// Best-effort: bare keys only. Returns 0 if the key cannot be located.
fn find_key_line(content: &str, key: &str) -> usize {
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            break;
        }
        if let Some(after_key) = trimmed.strip_prefix(key)
            && after_key.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}
