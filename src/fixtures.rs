#[cfg(test)]
pub mod test {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use crate::cli::{CliEntry, CliValues};
    use crate::schema::OptionKey;
    use crate::types::{Command, Value};

    /// Command-line values with no config paths and no positionals.
    pub fn cli_values(command: Command, entries: Vec<CliEntry>) -> CliValues {
        CliValues {
            command,
            entries,
            config_paths: vec![],
            rest: vec![],
        }
    }

    pub fn entry(key: OptionKey, value: impl Into<Value>, given: bool) -> CliEntry {
        CliEntry {
            key,
            value: value.into(),
            given,
        }
    }

    /// Write `files` as `(name, body)` pairs into a fresh temp dir.
    ///
    /// Returns the dir (keep it alive) and the file paths in the given order.
    pub fn config_dir(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
        let dir = TempDir::new().unwrap();
        let paths = files
            .iter()
            .map(|(name, body)| {
                let path = dir.path().join(name);
                fs::write(&path, body).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    #[test]
    fn config_dir_writes_files_in_order() {
        let (_dir, paths) = config_dir(&[("b.toml", "port = 2\n"), ("a.toml", "port = 1\n")]);
        assert!(paths[0].ends_with("b.toml"));
        assert_eq!(fs::read_to_string(&paths[1]).unwrap(), "port = 1\n");
    }
}
