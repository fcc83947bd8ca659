//! Value types shared by the schema, the store, and the resolver.
//!
//! [`Command`] selects which part of the option catalog is active.
//! [`Value`] is what flows through the setter: raw values from the command
//! line and config files go in, coerced values come out and land in the
//! [`ConfigStore`](crate::ConfigStore). [`OutputStream`] is the writable
//! handle that stream-valued options (`debugfile`) resolve to.

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::{Serialize, Serializer};

/// The sub-command given as the first positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Index,
    Delete,
    Commit,
    Help,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Index,
        Command::Delete,
        Command::Commit,
        Command::Help,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Index => "index",
            Command::Delete => "delete",
            Command::Commit => "commit",
            Command::Help => "help",
        }
    }

    /// Summary line and usage shown at the top of the command's help.
    pub fn summary(self) -> &'static str {
        match self {
            Command::Index => {
                "Index the given MARC file\nmarcsolr index --config <file> [options] <marcfile> <marcfile2...>"
            }
            Command::Delete => {
                "Delete based on ID\nmarcsolr delete --config <file> [options] <file_of_ids_to_delete> <another_file...>"
            }
            Command::Commit => {
                "Send a commit to the specified Solr\nmarcsolr commit --config <file> [options]"
            }
            Command::Help => {
                "Get help on a command\nmarcsolr help <cmd> where <cmd> is index, delete, or commit"
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A configuration value, either raw (on its way into the setter) or
/// resolved (as held by the store).
///
/// `Null` is the state the `none` sentinel produces. It is distinct from a
/// key being absent from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    Stream(OutputStream),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&OutputStream> {
        match self {
            Value::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Lower-cased string tokens carried by this value.
    ///
    /// A string yields itself, a list yields each of its string elements.
    /// Anything else yields nothing.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Value::Str(s) => vec![s.to_lowercase()],
            Value::List(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_lowercase)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("none"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Stream(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<OutputStream> for Value {
    fn from(s: OutputStream) -> Self {
        Value::Stream(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// A writable destination bound to a stream-valued option.
///
/// Handles are opened once during resolution and shared by cloning; the
/// underlying file closes when the last clone is dropped.
#[derive(Debug, Clone)]
pub enum OutputStream {
    Stdin,
    Stdout,
    Stderr,
    File { path: PathBuf, file: Arc<File> },
    /// An in-process buffer, for callers that hand the setter a ready-made sink.
    Memory(Arc<Mutex<Vec<u8>>>),
}

impl OutputStream {
    /// Bind one of the standard stream tokens (case-insensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "stdin" => Some(OutputStream::Stdin),
            "stdout" => Some(OutputStream::Stdout),
            "stderr" => Some(OutputStream::Stderr),
            _ => None,
        }
    }

    pub fn memory() -> Self {
        OutputStream::Memory(Arc::new(Mutex::new(Vec::new())))
    }

    /// Bytes written so far to a [`Memory`](OutputStream::Memory) stream.
    pub fn contents(&self) -> Option<Vec<u8>> {
        match self {
            OutputStream::Memory(buf) => buf.lock().ok().map(|b| b.clone()),
            _ => None,
        }
    }
}

impl PartialEq for OutputStream {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OutputStream::Stdin, OutputStream::Stdin)
            | (OutputStream::Stdout, OutputStream::Stdout)
            | (OutputStream::Stderr, OutputStream::Stderr) => true,
            (OutputStream::File { path: a, .. }, OutputStream::File { path: b, .. }) => a == b,
            (OutputStream::Memory(a), OutputStream::Memory(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdin => f.write_str("STDIN"),
            OutputStream::Stdout => f.write_str("STDOUT"),
            OutputStream::Stderr => f.write_str("STDERR"),
            OutputStream::File { path, .. } => write!(f, "{}", path.display()),
            OutputStream::Memory(_) => f.write_str("<memory>"),
        }
    }
}

impl Serialize for OutputStream {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputStream::Stdin => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "STDIN is not writable",
            )),
            OutputStream::Stdout => io::stdout().write(buf),
            OutputStream::Stderr => io::stderr().write(buf),
            OutputStream::File { file, .. } => {
                let mut handle: &File = &**file;
                handle.write(buf)
            }
            OutputStream::Memory(mem) => {
                let mut guard = mem
                    .lock()
                    .map_err(|_| io::Error::other("memory stream lock poisoned"))?;
                guard.extend_from_slice(buf);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputStream::Stdin | OutputStream::Memory(_) => Ok(()),
            OutputStream::Stdout => io::stdout().flush(),
            OutputStream::Stderr => io::stderr().flush(),
            OutputStream::File { file, .. } => {
                let mut handle: &File = &**file;
                handle.flush()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_round_trips_through_str() {
        for cmd in Command::ALL {
            assert_eq!(cmd.as_str().parse::<Command>().unwrap(), cmd);
        }
        assert!("reindex".parse::<Command>().is_err());
        assert!("INDEX".parse::<Command>().is_err());
    }

    #[test]
    fn tokens_lowercase_strings_and_lists() {
        assert_eq!(Value::from("NONE").tokens(), vec!["none"]);
        assert_eq!(
            Value::from(vec!["a", "None"]).tokens(),
            vec!["a".to_string(), "none".to_string()]
        );
        assert!(Value::Int(3).tokens().is_empty());
    }

    #[test]
    fn stream_tokens_are_case_insensitive() {
        assert_eq!(OutputStream::from_token("StdErr"), Some(OutputStream::Stderr));
        assert_eq!(OutputStream::from_token("STDOUT"), Some(OutputStream::Stdout));
        assert_eq!(OutputStream::from_token("stdin"), Some(OutputStream::Stdin));
        assert_eq!(OutputStream::from_token("out.txt"), None);
    }

    #[test]
    fn memory_stream_collects_writes() {
        let stream = OutputStream::memory();
        let mut writer = stream.clone();
        writer.write_all(b"hello").unwrap();
        assert_eq!(stream.contents().unwrap(), b"hello");
    }

    #[test]
    fn stdin_is_not_writable() {
        let mut stream = OutputStream::Stdin;
        let err = stream.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "[a, b]");
        assert_eq!(Value::Null.to_string(), "none");
        assert_eq!(Value::Stream(OutputStream::Stdout).to_string(), "STDOUT");
    }

    #[test]
    fn value_serializes_untagged() {
        let json = serde_json::to_string(&Value::from(vec!["x"])).unwrap();
        assert_eq!(json, r#"["x"]"#);
        let json = serde_json::to_string(&Value::Stream(OutputStream::Stderr)).unwrap();
        assert_eq!(json, r#""STDERR""#);
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
    }
}
