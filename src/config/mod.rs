//! Build policy configuration
//!
//! Fragments from an ordered list of directories (base tree, then local
//! overrides) are merged into one hierarchy:
//! 1. Top-level defaults
//! 2. Kernel architecture
//! 3. Debian architecture
//! 4. Feature-set
//! 5. Flavour
//!
//! Each level may override any policy field of its ancestors.

mod effective;
mod fragment;
mod merge;
mod settings;

pub use effective::{
    EffectivePolicy, NodeLevel, ResolvedArch, ResolvedConfig, ResolvedFeatureset, Variant,
};
pub use fragment::{fragment_paths, Fragment, FRAGMENT_FILE_NAME};
pub use merge::{
    ConfigSource, ConfigTree, DebianArchNode, FeaturesetNode, FlavourNode, KernelArchNode,
};
pub use settings::BuildSettings;

use std::io;
use std::path::PathBuf;

/// Default configuration directories, lowest precedence first
pub const DEFAULT_CONFIG_DIRS: &[&str] = &["debian/config", "debian/config.local"];

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to scan {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration in {path}: {message}")]
    Validation { path: PathBuf, message: String },

    #[error(
        "architecture '{name}' is defined under both kernel architectures \
         '{first}' and '{second}'"
    )]
    DuplicateArch {
        name: String,
        first: String,
        second: String,
    },

    #[error("{level} '{name}' not found in configuration")]
    NotFound { level: NodeLevel, name: String },
}
