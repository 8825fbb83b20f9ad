//! On-disk configuration fragments (`defines.toml`)
//!
//! A fragment mirrors the four-level hierarchy as nested arrays of tables.
//! Fragments are read one file at a time and folded into a
//! [`ConfigTree`](super::ConfigTree).

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::settings::BuildSettings;
use super::ConfigError;

/// File name of a configuration fragment
pub const FRAGMENT_FILE_NAME: &str = "defines.toml";

/// Top level of a fragment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub kernelarch: Vec<KernelArchFragment>,
}

/// `[[kernelarch]]`
#[derive(Debug, Clone, Deserialize)]
pub struct KernelArchFragment {
    pub name: String,

    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub debianarch: Vec<DebianArchFragment>,
}

/// `[[kernelarch.debianarch]]`
#[derive(Debug, Clone, Deserialize)]
pub struct DebianArchFragment {
    pub name: String,

    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub featureset: Vec<FeaturesetFragment>,
}

/// `[[kernelarch.debianarch.featureset]]`
#[derive(Debug, Clone, Deserialize)]
pub struct FeaturesetFragment {
    pub name: String,

    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub flavour: Vec<FlavourFragment>,
}

/// `[[kernelarch.debianarch.featureset.flavour]]`
#[derive(Debug, Clone, Deserialize)]
pub struct FlavourFragment {
    pub name: String,

    #[serde(default)]
    pub build: BuildSettings,
}

impl Fragment {
    /// Parse a fragment from TOML text
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let fragment: Fragment = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fragment.validate().map_err(|message| ConfigError::Validation {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(fragment)
    }

    /// Load a fragment, returning it with the SHA-256 digest of its raw bytes
    pub fn load(path: &Path) -> Result<(Self, String), ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes).map_err(|e| ConfigError::Validation {
            path: path.to_path_buf(),
            message: format!("invalid UTF-8: {}", e),
        })?;

        Ok((Self::parse(path, &contents)?, digest))
    }

    fn validate(&self) -> Result<(), String> {
        let at = |level: &str, name: &str, msg: String| format!("{} '{}': {}", level, name, msg);

        self.build.validate()?;
        for ka in &self.kernelarch {
            ka.build.validate().map_err(|m| at("kernelarch", ka.name.as_str(), m))?;
            for da in &ka.debianarch {
                da.build.validate().map_err(|m| at("debianarch", da.name.as_str(), m))?;
                for feat in &da.featureset {
                    feat.build.validate().map_err(|m| at("featureset", feat.name.as_str(), m))?;
                    for fl in &feat.flavour {
                        fl.build.validate().map_err(|m| at("flavour", fl.name.as_str(), m))?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// List the fragment files in one configuration directory.
///
/// The root `defines.toml` comes first, then one per subdirectory in file
/// name order. A missing directory yields no fragments. Symlinked
/// fragments and subdirectories are followed; a dangling link is an error.
pub fn fragment_paths(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).min_depth(1).max_depth(2) {
        let entry = entry.map_err(|source| ConfigError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && entry.file_name() == FRAGMENT_FILE_NAME {
            found.push((entry.depth(), entry.into_path()));
        }
    }
    found.sort();

    Ok(found.into_iter().map(|(_, path)| path).collect())
}
