//! Effective policy resolution and variant selection
//!
//! [`ConfigTree::resolve`] flattens the inheritance chain
//! top → kernelarch → debianarch → featureset → flavour once, so each
//! flavour carries a fully determined [`EffectivePolicy`]. Selection is then
//! three keyed lookups.

use std::collections::BTreeMap;
use std::fmt;

use super::merge::ConfigTree;
use super::settings::BuildSettings;
use super::ConfigError;

/// Hierarchy level named in a lookup failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLevel {
    Architecture,
    Featureset,
    Flavour,
}

impl fmt::Display for NodeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeLevel::Architecture => "architecture",
            NodeLevel::Featureset => "featureset",
            NodeLevel::Flavour => "flavour",
        })
    }
}

/// One build variant: (architecture, featureset, flavour)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub arch: String,
    pub featureset: String,
    pub flavour: String,
}

impl Variant {
    pub fn new(
        arch: impl Into<String>,
        featureset: impl Into<String>,
        flavour: impl Into<String>,
    ) -> Self {
        Self {
            arch: arch.into(),
            featureset: featureset.into(),
            flavour: flavour.into(),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.arch, self.featureset, self.flavour)
    }
}

/// Fully resolved policy for one flavour
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePolicy {
    /// Image path relative to the build directory
    pub kernel_file: Option<String>,

    /// Size budget in bytes; `None` disables the size check
    pub kernel_file_max_size: Option<u64>,

    /// Secure Boot signing enabled (false if never set)
    pub enable_signed: bool,
}

impl From<BuildSettings> for EffectivePolicy {
    fn from(settings: BuildSettings) -> Self {
        Self {
            kernel_file: settings.kernel_file,
            kernel_file_max_size: settings.kernel_file_max_size,
            enable_signed: settings.enable_signed.unwrap_or(false),
        }
    }
}

/// Resolved debian architecture
#[derive(Debug, Clone)]
pub struct ResolvedArch {
    /// Kernel architecture this debian architecture belongs to
    pub kernelarch: String,

    pub featuresets: BTreeMap<String, ResolvedFeatureset>,
}

/// Resolved featureset
#[derive(Debug, Clone, Default)]
pub struct ResolvedFeatureset {
    pub flavours: BTreeMap<String, EffectivePolicy>,
}

/// Every flavour's effective policy, indexed by debian architecture
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub archs: BTreeMap<String, ResolvedArch>,
}

impl ConfigTree {
    /// Flatten inheritance for every flavour in the tree.
    ///
    /// Debian architectures are indexed across all kernel architectures;
    /// the same debian architecture under two kernel architectures is an
    /// error.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let mut archs: BTreeMap<String, ResolvedArch> = BTreeMap::new();

        for kernelarch in self.kernelarchs.values() {
            let ka_build = self.build.inherit(&kernelarch.build);

            for debianarch in kernelarch.debianarchs.values() {
                if let Some(existing) = archs.get(&debianarch.name) {
                    return Err(ConfigError::DuplicateArch {
                        name: debianarch.name.clone(),
                        first: existing.kernelarch.clone(),
                        second: kernelarch.name.clone(),
                    });
                }

                let da_build = ka_build.inherit(&debianarch.build);
                let featuresets = debianarch
                    .featuresets
                    .values()
                    .map(|featureset| {
                        let fs_build = da_build.inherit(&featureset.build);
                        let flavours = featureset
                            .flavours
                            .values()
                            .map(|flavour| {
                                let settings = fs_build.inherit(&flavour.build);
                                (flavour.name.clone(), EffectivePolicy::from(settings))
                            })
                            .collect();
                        (featureset.name.clone(), ResolvedFeatureset { flavours })
                    })
                    .collect();

                archs.insert(
                    debianarch.name.clone(),
                    ResolvedArch {
                        kernelarch: kernelarch.name.clone(),
                        featuresets,
                    },
                );
            }
        }

        Ok(ResolvedConfig { archs })
    }
}

impl ResolvedConfig {
    /// Select the effective policy for one variant
    pub fn select(&self, variant: &Variant) -> Result<&EffectivePolicy, ConfigError> {
        let not_found = |level, name: &str| ConfigError::NotFound {
            level,
            name: name.to_string(),
        };

        let arch = self
            .archs
            .get(&variant.arch)
            .ok_or_else(|| not_found(NodeLevel::Architecture, variant.arch.as_str()))?;
        let featureset = arch
            .featuresets
            .get(&variant.featureset)
            .ok_or_else(|| not_found(NodeLevel::Featureset, variant.featureset.as_str()))?;
        let policy = featureset
            .flavours
            .get(&variant.flavour)
            .ok_or_else(|| not_found(NodeLevel::Flavour, variant.flavour.as_str()))?;

        tracing::debug!(
            %variant,
            kernelarch = %arch.kernelarch,
            ?policy,
            "selected effective policy"
        );
        Ok(policy)
    }
}
