//! The option catalog: every key marcsolr understands, with its metadata.
//!
//! The catalog is a `const` table. One [`Descriptor`] per [`OptionKey`],
//! stored at the index of the key's discriminant, so key-to-descriptor
//! lookup is a plain index. The layout (and with it key and name
//! uniqueness) is checked at compile time.
//!
//! Negation options (`NObenchmark`, `NOdryrun`, ...) are ordinary entries
//! whose [`negates`](Descriptor::negates) points at the boolean they clear.

use crate::types::Command;

/// Closed set of recognized option keys, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionKey {
    Config,
    Benchmark,
    NoBenchmark,
    DryRun,
    NoDryRun,
    PrintMarc,
    NoPrintMarc,
    PrintDoc,
    NoPrintDoc,
    DebugFile,
    ClearSolr,
    SkipCommit,
    Threads,
    SussThreads,
    SussSize,
    Machine,
    Port,
    SolrPath,
    Javabin,
    NoJavabin,
    LogFile,
    LogLevel,
    LogBatchSize,
    IndexFile,
    TmapDir,
    CustomDir,
    MarcType,
    Encoding,
    Gzipped,
}

impl OptionKey {
    /// The option's name as written in config files and long flags.
    pub fn name(self) -> &'static str {
        SCHEMA.descriptor(self).name
    }
}

/// How values for an option are typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Boolean switch taking no argument on the command line.
    Flag,
    Int,
    Str,
    /// A string resolved to an [`OutputStream`](crate::OutputStream).
    OutFile,
    /// Repeatable string option; values accumulate in arrival order.
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    Single,
    Accumulating,
}

#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub key: OptionKey,
    pub name: &'static str,
    pub description: &'static str,
    pub value_type: ValueType,
    /// Default in command-line form; applied by the CLI parser.
    pub default: Option<&'static str>,
    pub valid_set: Option<&'static [&'static str]>,
    /// `None` means the option applies to every command.
    pub commands: Option<&'static [Command]>,
    /// For `NO`-prefixed options, the boolean key this one clears.
    pub negates: Option<OptionKey>,
    pub takes_none: bool,
    pub short_flag: Option<char>,
}

impl Descriptor {
    const fn new(
        key: OptionKey,
        name: &'static str,
        value_type: ValueType,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            name,
            description,
            value_type,
            default: None,
            valid_set: None,
            commands: None,
            negates: None,
            takes_none: false,
            short_flag: None,
        }
    }

    const fn short(self, c: char) -> Self {
        Self {
            short_flag: Some(c),
            ..self
        }
    }

    const fn only(self, commands: &'static [Command]) -> Self {
        Self {
            commands: Some(commands),
            ..self
        }
    }

    const fn default_value(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    const fn valid(self, set: &'static [&'static str]) -> Self {
        Self {
            valid_set: Some(set),
            ..self
        }
    }

    const fn none_sentinel(self) -> Self {
        Self {
            takes_none: true,
            ..self
        }
    }

    const fn negation_of(self, base: OptionKey) -> Self {
        Self {
            negates: Some(base),
            ..self
        }
    }

    pub fn multiplicity(&self) -> Multiplicity {
        match self.value_type {
            ValueType::List => Multiplicity::Accumulating,
            _ => Multiplicity::Single,
        }
    }

    pub fn is_output_stream(&self) -> bool {
        self.value_type == ValueType::OutFile
    }

    pub fn applies_to(&self, command: Command) -> bool {
        self.commands.is_none_or(|commands| commands.contains(&command))
    }
}

const INDEX: &[Command] = &[Command::Index];
const INDEX_DELETE: &[Command] = &[Command::Delete, Command::Index];

use OptionKey as K;
use ValueType as T;

const CATALOG: [Descriptor; 29] = [
    Descriptor::new(
        K::Config,
        "config",
        T::List,
        "Configuration file specifying options. Repeatable. Command-line arguments always override the config file(s)",
    ),
    Descriptor::new(
        K::Benchmark,
        "benchmark",
        T::Flag,
        "Benchmark production of each solr field",
    )
    .only(INDEX)
    .short('B'),
    Descriptor::new(
        K::NoBenchmark,
        "NObenchmark",
        T::Flag,
        "Turn off a previous 'benchmark' directive",
    )
    .only(INDEX)
    .negation_of(K::Benchmark),
    Descriptor::new(K::DryRun, "dryrun", T::Flag, "Don't send anything to solr"),
    Descriptor::new(
        K::NoDryRun,
        "NOdryrun",
        T::Flag,
        "Disable a previous 'dryrun' directive",
    )
    .negation_of(K::DryRun),
    Descriptor::new(
        K::PrintMarc,
        "printmarc",
        T::Flag,
        "Print MARC Record (as text) to --debugfile",
    )
    .only(INDEX)
    .short('r'),
    Descriptor::new(
        K::NoPrintMarc,
        "NOprintmarc",
        T::Flag,
        "Turn off printing MARC Record (as text) to --debugfile",
    )
    .only(INDEX)
    .negation_of(K::PrintMarc),
    Descriptor::new(
        K::PrintDoc,
        "printdoc",
        T::Flag,
        "Print each completed document to --debugfile",
    )
    .only(INDEX)
    .short('d'),
    Descriptor::new(
        K::NoPrintDoc,
        "NOprintdoc",
        T::Flag,
        "Turn off printing each completed document to --debugfile",
    )
    .only(INDEX)
    .negation_of(K::PrintDoc),
    Descriptor::new(
        K::DebugFile,
        "debugfile",
        T::OutFile,
        "Where to send output from --printmarc and --printdoc (takes filename, 'STDERR', 'STDOUT', or 'NONE')",
    )
    .only(INDEX_DELETE)
    .default_value("STDOUT")
    .none_sentinel(),
    Descriptor::new(
        K::ClearSolr,
        "clearsolr",
        T::Flag,
        "Clean out Solr by deleting everything in it (DANGEROUS)",
    )
    .only(INDEX),
    Descriptor::new(
        K::SkipCommit,
        "skipcommit",
        T::Flag,
        "DON'T send solr a 'commit' afterwards",
    )
    .only(INDEX_DELETE)
    .short('C'),
    Descriptor::new(
        K::Threads,
        "threads",
        T::Int,
        "Number of threads to use to process MARC records",
    )
    .only(INDEX)
    .default_value("1"),
    Descriptor::new(
        K::SussThreads,
        "sussthreads",
        T::Int,
        "Number of threads to send completed docs to Solr",
    )
    .default_value("1"),
    Descriptor::new(
        K::SussSize,
        "susssize",
        T::Int,
        "Size of the document queue for sending to Solr",
    )
    .short('S')
    .default_value("128"),
    Descriptor::new(
        K::Machine,
        "machine",
        T::Str,
        "Name of solr machine (e.g., solr.myplace.org)",
    )
    .short('m'),
    Descriptor::new(
        K::Port,
        "port",
        T::Int,
        "Port of solr machine (e.g., '8088')",
    )
    .short('p'),
    Descriptor::new(K::SolrPath, "solrpath", T::Str, "URL path to solr").short('P'),
    Descriptor::new(
        K::Javabin,
        "javabin",
        T::Flag,
        "Use javabin (presumes /update/bin is configured in schema.xml)",
    ),
    Descriptor::new(K::NoJavabin, "NOjavabin", T::Flag, "Don't use javabin")
        .negation_of(K::Javabin),
    Descriptor::new(
        K::LogFile,
        "logfile",
        T::Str,
        "Name of the logfile (filename, 'STDERR', 'DEFAULT', or 'NONE'). 'DEFAULT' is a file based on input file name",
    )
    .default_value("DEFAULT")
    .none_sentinel(),
    Descriptor::new(
        K::LogLevel,
        "loglevel",
        T::Str,
        "Level at which to log (DEBUG, INFO, WARN, ERROR, OFF)",
    )
    .short('L')
    .none_sentinel()
    .valid(&["OFF", "DEBUG", "INFO", "WARN", "ERROR"])
    .default_value("INFO"),
    Descriptor::new(
        K::LogBatchSize,
        "logbatchsize",
        T::Int,
        "Write progress information to logfile after every N records",
    )
    .only(INDEX_DELETE)
    .short('b')
    .default_value("25000"),
    Descriptor::new(
        K::IndexFile,
        "indexfile",
        T::Str,
        "The index file describing your specset (usually index.toml)",
    )
    .only(INDEX),
    Descriptor::new(
        K::TmapDir,
        "tmapdir",
        T::Str,
        "Directory that contains any translation maps",
    )
    .only(INDEX),
    Descriptor::new(
        K::CustomDir,
        "customdir",
        T::List,
        "The directory containing custom routine libraries. Repeatable",
    )
    .only(INDEX),
    Descriptor::new(
        K::MarcType,
        "marctype",
        T::Str,
        "Type of marc file ('bestguess', 'strictmarc', 'marcxml', 'alephsequential', 'permissivemarc')",
    )
    .only(INDEX)
    .short('t')
    .valid(&[
        "bestguess",
        "strictmarc",
        "permissivemarc",
        "marcxml",
        "alephsequential",
    ])
    .default_value("bestguess"),
    Descriptor::new(
        K::Encoding,
        "encoding",
        T::Str,
        "Encoding of the MARC file ('bestguess', 'utf8', 'marc8', 'iso')",
    )
    .only(INDEX)
    .valid(&["bestguess", "utf8", "marc8", "iso"])
    .default_value("bestguess"),
    Descriptor::new(
        K::Gzipped,
        "gzipped",
        T::Flag,
        "Is the input gzipped? An extension of .gz will always force this to true",
    )
    .only(INDEX_DELETE)
    .default_value("false"),
];

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn catalog_is_well_formed(catalog: &[Descriptor]) -> bool {
    let mut i = 0;
    while i < catalog.len() {
        if catalog[i].key as usize != i {
            return false;
        }
        let mut j = i + 1;
        while j < catalog.len() {
            if str_eq(catalog[i].name, catalog[j].name) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    catalog_is_well_formed(&CATALOG),
    "option catalog must list each key once, in OptionKey order, with unique names"
);

/// Read-only view over the option catalog.
pub struct Schema {
    descriptors: &'static [Descriptor],
}

/// The process-wide option catalog.
pub static SCHEMA: Schema = Schema {
    descriptors: &CATALOG,
};

impl Schema {
    /// Find a descriptor by its option name (case-sensitive).
    pub fn lookup(&self, name: &str) -> Option<&'static Descriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn descriptor(&self, key: OptionKey) -> &'static Descriptor {
        &self.descriptors[key as usize]
    }

    pub fn is_applicable(&self, key: OptionKey, command: Command) -> bool {
        self.descriptor(key).applies_to(command)
    }

    pub fn short_flag_for(&self, key: OptionKey) -> Option<char> {
        self.descriptor(key).short_flag
    }

    /// Descriptors active for `command`, in catalog order.
    pub fn all_keys_for(&self, command: Command) -> impl Iterator<Item = &'static Descriptor> {
        self.descriptors
            .iter()
            .filter(move |d| d.applies_to(command))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Descriptor> {
        self.descriptors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn lookup_finds_every_key_by_name() {
        for d in SCHEMA.iter() {
            assert_eq!(SCHEMA.lookup(d.name).unwrap().key, d.key);
            assert_eq!(d.key.name(), d.name);
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(SCHEMA.lookup("NOdryrun").is_some());
        assert!(SCHEMA.lookup("nodryrun").is_none());
        assert!(SCHEMA.lookup("DryRun").is_none());
        assert!(SCHEMA.lookup("bogus").is_none());
    }

    #[test]
    fn short_flags_are_unique() {
        let mut seen = HashSet::new();
        for c in SCHEMA.iter().filter_map(|d| d.short_flag) {
            assert!(seen.insert(c), "duplicate short flag -{c}");
        }
        assert_eq!(SCHEMA.short_flag_for(OptionKey::Machine), Some('m'));
        assert_eq!(SCHEMA.short_flag_for(OptionKey::DryRun), None);
    }

    #[test]
    fn negations_point_at_flags() {
        for d in SCHEMA.iter() {
            if let Some(base) = d.negates {
                assert!(d.name.starts_with("NO"));
                assert_eq!(&d.name[2..], base.name());
                assert_eq!(d.value_type, ValueType::Flag);
                assert_eq!(SCHEMA.descriptor(base).value_type, ValueType::Flag);
            }
        }
    }

    #[test]
    fn defaults_are_members_of_their_valid_sets() {
        for d in SCHEMA.iter() {
            if let (Some(set), Some(default)) = (d.valid_set, d.default) {
                assert!(set.contains(&default), "{} default not valid", d.name);
            }
        }
    }

    #[test]
    fn applicability_respects_command_restrictions() {
        assert!(SCHEMA.is_applicable(OptionKey::Threads, Command::Index));
        assert!(!SCHEMA.is_applicable(OptionKey::Threads, Command::Delete));
        assert!(SCHEMA.is_applicable(OptionKey::DebugFile, Command::Delete));
        assert!(!SCHEMA.is_applicable(OptionKey::DebugFile, Command::Commit));
        assert!(SCHEMA.is_applicable(OptionKey::Machine, Command::Commit));
        assert!(SCHEMA.is_applicable(OptionKey::DryRun, Command::Help));
    }

    #[test]
    fn commit_has_only_unrestricted_options() {
        let names: Vec<_> = SCHEMA.all_keys_for(Command::Commit).map(|d| d.name).collect();
        assert!(names.contains(&"machine"));
        assert!(names.contains(&"NOjavabin"));
        assert!(!names.contains(&"marctype"));
        assert!(!names.contains(&"gzipped"));
        assert!(SCHEMA.all_keys_for(Command::Commit).all(|d| d.commands.is_none()));
    }

    #[test]
    fn multiplicity_and_stream_flags() {
        let custom = SCHEMA.descriptor(OptionKey::CustomDir);
        assert_eq!(custom.multiplicity(), Multiplicity::Accumulating);
        let debug = SCHEMA.descriptor(OptionKey::DebugFile);
        assert_eq!(debug.multiplicity(), Multiplicity::Single);
        assert!(debug.is_output_stream());
        assert!(debug.takes_none);
        assert!(!SCHEMA.descriptor(OptionKey::LogFile).is_output_stream());
    }
}
