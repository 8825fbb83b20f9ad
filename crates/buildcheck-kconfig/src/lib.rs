//! Permissive reader for kernel `.config` files.
//!
//! Turns the line-oriented configuration format into a [`Kconfig`] symbol
//! table keyed by symbol name (without the `CONFIG_` prefix). The reader
//! never validates the file: unrecognized lines are skipped, and a later
//! definition of the same symbol replaces an earlier one.

mod parser;
mod value;

pub use parser::{parse_line, Line};
pub use value::KconfigValue;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Error reading a `.config` file from disk
#[derive(Debug, thiserror::Error)]
pub enum KconfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A configuration symbol and its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KconfigEntry {
    pub name: String,
    pub value: KconfigValue,
}

/// Symbol table parsed from a `.config`.
///
/// Symbols marked `# CONFIG_X is not set` are treated exactly like symbols
/// that never appeared: they are not members of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kconfig {
    entries: BTreeMap<String, KconfigEntry>,
}

impl Kconfig {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an iterator of lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for line in lines {
            table.apply_line(line.as_ref());
        }
        table
    }

    /// Parse a whole file's contents
    pub fn parse(contents: &str) -> Self {
        Self::from_lines(contents.lines())
    }

    /// Read from any buffered reader
    pub fn read<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut table = Self::new();
        for line in reader.lines() {
            table.apply_line(&line?);
        }
        Ok(table)
    }

    /// Read a `.config` file from disk
    pub fn from_file(path: &Path) -> Result<Self, KconfigError> {
        let io_err = |source| KconfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        Self::read(BufReader::new(file)).map_err(io_err)
    }

    fn apply_line(&mut self, line: &str) {
        match parse_line(line) {
            Some(Line::Set(name, value)) => {
                self.entries.insert(
                    name.to_string(),
                    KconfigEntry {
                        name: name.to_string(),
                        value,
                    },
                );
            }
            Some(Line::NotSet(name)) => {
                self.entries.remove(name);
            }
            None => {}
        }
    }

    /// Look up a symbol by name (without the `CONFIG_` prefix)
    pub fn get(&self, name: &str) -> Option<&KconfigEntry> {
        self.entries.get(name)
    }

    /// Look up just the value of a symbol
    pub fn value(&self, name: &str) -> Option<&KconfigValue> {
        self.get(name).map(|entry| &entry.value)
    }

    /// Whether a symbol is present with any value
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of symbols present
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no symbols
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in name order
    pub fn iter(&self) -> impl Iterator<Item = &KconfigEntry> {
        self.entries.values()
    }
}
