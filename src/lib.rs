//! Option resolution for marcsolr, a batch tool that indexes MARC records
//! into Solr.
//!
//! Every run resolves one configuration store from three layers: a static
//! option catalog, any number of config files, and the command line. The
//! store then feeds the derived values the rest of the tool needs: the Solr
//! update URL, the debug output stream, the log destination, and a format
//! guess for each input file.
//!
//! ```ignore
//! let resolved = Resolver::new().resolve(
//!     Command::Index,
//!     &[],
//!     ["--config", "site.toml", "--port", "8983", "records.mrc.gz"],
//! )?;
//! let url = solr_url(&resolved.store)?;
//! ```
//!
//! # The option catalog
//!
//! [`SCHEMA`] holds one [`Descriptor`](schema::Descriptor) per option. A
//! descriptor carries the option's name, type, default, optional validity
//! set, the commands it applies to, and whether it negates another flag.
//! Everything else derives from it: the clap command for each sub-command,
//! the `help <cmd>` text, the setter's coercion and validation, and the
//! defaults.
//!
//! # Layer precedence
//!
//! ```text
//! Catalog defaults      registered as clap defaults
//!        ↑ overridden by
//! Config files          in listed order, later files win
//!        ↑ overridden by
//! Command line          only flags the user actually typed
//! ```
//!
//! Resolution runs in two phases. Every config file is evaluated first,
//! each directive going through the same setter as
//! [`ConfigStore::set`]. Then the command line is reconciled: a value the
//! user typed always overrides, and a value clap filled in from the
//! catalog default is written only where no file set the key.
//!
//! # Setter semantics
//!
//! - **Negation.** `NOdryrun = true` stores `dryrun = false`. A negation
//!   given `false` does nothing at all.
//! - **None sentinel.** Options that accept it take `none` (any case) and
//!   store an explicit null, which is distinct from never being set.
//!   `--debugfile NONE` suppresses debug output rather than falling back
//!   to stdout.
//! - **Accumulation.** List options such as `customdir` append across files
//!   and the command line, in arrival order.
//! - **Output streams.** `debugfile` binds `STDOUT`/`STDERR`/`STDIN` to the
//!   standard streams and opens anything else as a file, once, during
//!   resolution.
//!
//! A key not in the catalog, a value that fails coercion or its validity
//! set, and a file that cannot be opened are all fatal. There is no partial
//! result.
//!
//! # Config files
//!
//! Config files are TOML documents read as an ordered list of top-level
//! `key = value` assignments:
//!
//! ```toml
//! machine = "solr.example.org"
//! port = 8983
//! solrpath = "/solr/biblio"
//! customdir = ["lib", "vendor/lib"]
//! NOjavabin = true
//! ```
//!
//! Nothing in a file is executed. See the `file` module for what is
//! accepted.
//!
//! # Logging
//!
//! The library logs through [`tracing`] and never installs a subscriber.
//! Hand a dispatcher to [`Resolver::dispatch`] to capture resolution-time
//! events; [`logging`] builds the two dispatchers the binary uses.

pub mod error;
pub mod types;

mod builder;
pub mod cli;
mod file;
pub mod logging;
mod resolve;
pub mod schema;
pub mod sniff;
pub mod solr;
mod store;
mod validate;

#[cfg(test)]
mod fixtures;

pub use builder::Resolver;
pub use error::{ConfigError, Origin};
pub use resolve::Resolved;
pub use schema::{OptionKey, SCHEMA};
pub use sniff::{InputSource, InputSourceDescriptor, Sniffer};
pub use solr::{SubmissionSettings, solr_url};
pub use store::ConfigStore;
pub use types::{Command, OutputStream, Value};
