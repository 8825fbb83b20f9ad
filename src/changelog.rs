//! Debian changelog header reader
//!
//! Only the most recent entry's header line is needed:
//!
//! ```text
//! linux (6.1.76-1) bookworm-security; urgency=high
//! ```

use regex_lite::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Default changelog location relative to the source tree
pub const DEFAULT_CHANGELOG: &str = "debian/changelog";

const HEADER_PATTERN: &str = r"^(\S+) \(([^()\s]+)\) ([^;]+);(.*)$";

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(HEADER_PATTERN).unwrap())
}

/// Changelog errors
#[derive(Debug, thiserror::Error)]
pub enum ChangelogError {
    #[error("failed to read changelog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("changelog {path} has no entries")]
    Empty { path: PathBuf },

    #[error("malformed changelog header in {path}: {line}")]
    MalformedHeader { path: PathBuf, line: String },
}

/// Header of one changelog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// Source package name
    pub source: String,

    /// Version string
    pub version: String,

    /// Target distribution(s), space separated as written
    pub distribution: String,

    /// Urgency (empty when the header carries none)
    pub urgency: String,
}

impl ChangelogEntry {
    /// Read the most recent entry from a changelog file
    pub fn read_top(path: &Path) -> Result<Self, ChangelogError> {
        let contents = fs::read_to_string(path).map_err(|source| ChangelogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_top(path, &contents)
    }

    /// Parse the most recent entry from changelog text.
    ///
    /// `path` is only used for error messages.
    pub fn parse_top(path: &Path, contents: &str) -> Result<Self, ChangelogError> {
        let line = contents
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| ChangelogError::Empty {
                path: path.to_path_buf(),
            })?;

        let malformed = || ChangelogError::MalformedHeader {
            path: path.to_path_buf(),
            line: line.to_string(),
        };

        let caps = header_regex().captures(line).ok_or_else(malformed)?;

        let urgency = caps[4]
            .split(',')
            .filter_map(|kv| kv.trim().split_once('='))
            .find(|(key, _)| key.eq_ignore_ascii_case("urgency"))
            .map(|(_, value)| value.trim().to_string())
            .unwrap_or_default();

        Ok(Self {
            source: caps[1].to_string(),
            version: caps[2].to_string(),
            distribution: caps[3].trim().to_string(),
            urgency,
        })
    }
}
