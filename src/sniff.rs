//! Input format detection from a file name.
//!
//! When `marctype` is `bestguess`, the format of each input is guessed from
//! its extension. A trailing `.gz` marks the input as compressed and the
//! extension before it decides the format. The sniffer only reports the
//! compression flag; unwrapping the stream is the reader's job.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use crate::error::ConfigError;
use crate::schema::{OptionKey, SCHEMA};
use crate::store::ConfigStore;

/// Path token that names the process's standard input.
pub const STDIN_TOKEN: &str = "STDIN";

/// A concrete record format handed to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    MarcXml,
    StrictMarc,
    AlephSequential,
    /// Binary MARC read leniently. The fallback for unrecognized extensions.
    PermissiveMarc,
}

impl InputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            InputFormat::MarcXml => "marcxml",
            InputFormat::StrictMarc => "strictmarc",
            InputFormat::AlephSequential => "alephsequential",
            InputFormat::PermissiveMarc => "permissivemarc",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The configured `marctype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarcType {
    BestGuess,
    Fixed(InputFormat),
}

impl FromStr for MarcType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bestguess" => Ok(MarcType::BestGuess),
            "marcxml" => Ok(MarcType::Fixed(InputFormat::MarcXml)),
            "strictmarc" => Ok(MarcType::Fixed(InputFormat::StrictMarc)),
            "alephsequential" => Ok(MarcType::Fixed(InputFormat::AlephSequential)),
            "permissivemarc" => Ok(MarcType::Fixed(InputFormat::PermissiveMarc)),
            _ => Err(format!("unknown marc type '{s}'")),
        }
    }
}

/// The configured character encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    BestGuess,
    Utf8,
    Marc8,
    Iso,
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bestguess" => Ok(Encoding::BestGuess),
            "utf8" => Ok(Encoding::Utf8),
            "marc8" => Ok(Encoding::Marc8),
            "iso" => Ok(Encoding::Iso),
            _ => Err(format!("unknown encoding '{s}'")),
        }
    }
}

/// Where the records come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    Stdin,
    Path(PathBuf),
}

/// Everything the reader needs to open one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSourceDescriptor {
    pub source: InputSource,
    pub format: InputFormat,
    /// `None` leaves detection to the reader.
    pub encoding: Option<Encoding>,
    pub gzipped: bool,
}

/// Describe how to read `path`.
///
/// A fixed `format` is used as-is together with the configured `gzipped`
/// flag. Under [`MarcType::BestGuess`] the base name's extension decides.
pub fn sniff(
    path: &Path,
    format: MarcType,
    encoding: Encoding,
    gzipped: bool,
) -> InputSourceDescriptor {
    let source = if path.as_os_str() == STDIN_TOKEN {
        InputSource::Stdin
    } else {
        InputSource::Path(path.to_path_buf())
    };
    let encoding = match encoding {
        Encoding::BestGuess => None,
        other => Some(other),
    };

    let (format, gzipped) = match format {
        MarcType::Fixed(format) => (format, gzipped),
        MarcType::BestGuess => guess(path, gzipped),
    };

    InputSourceDescriptor {
        source,
        format,
        encoding,
        gzipped,
    }
}

fn guess(path: &Path, gzipped: bool) -> (InputFormat, bool) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut pieces: Vec<&str> = name.split('.').collect();
    while pieces.len() > 1 && pieces.last().is_some_and(|p| p.is_empty()) {
        pieces.pop();
    }
    if pieces.len() < 2 {
        return (InputFormat::PermissiveMarc, gzipped);
    }

    let mut ext = pieces[pieces.len() - 1].to_ascii_lowercase();
    let mut gzipped = gzipped;
    if ext == "gz" {
        ext = pieces[pieces.len() - 2].to_ascii_lowercase();
        gzipped = true;
    }

    info!(path = %path.display(), extension = %ext, "sniffed marc file type");
    let format = if ext.contains("xml") {
        InputFormat::MarcXml
    } else if ext.contains("seq") || ext.contains("aleph") {
        InputFormat::AlephSequential
    } else {
        InputFormat::PermissiveMarc
    };
    (format, gzipped)
}

/// The configured format, encoding and compression flag, read once from a
/// resolved store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffer {
    pub format: MarcType,
    pub encoding: Encoding,
    pub gzipped: bool,
}

impl Sniffer {
    pub fn from_store(store: &ConfigStore) -> Result<Self, ConfigError> {
        Ok(Self {
            format: parsed(store, OptionKey::MarcType)?,
            encoding: parsed(store, OptionKey::Encoding)?,
            gzipped: store.flag(OptionKey::Gzipped),
        })
    }

    pub fn sniff(&self, path: impl AsRef<Path>) -> InputSourceDescriptor {
        sniff(path.as_ref(), self.format, self.encoding, self.gzipped)
    }
}

/// Parse a string option, falling back to its schema default when absent or
/// nulled.
fn parsed<T: FromStr<Err = String>>(store: &ConfigStore, key: OptionKey) -> Result<T, ConfigError> {
    let descriptor = SCHEMA.descriptor(key);
    let raw = store
        .str(key)
        .or(descriptor.default)
        .unwrap_or("bestguess");
    raw.parse().map_err(|reason| ConfigError::InvalidValue {
        key: descriptor.name.to_string(),
        value: raw.to_string(),
        reason,
    })
}
