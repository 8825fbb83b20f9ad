//! Merged configuration hierarchy
//!
//! Fragments are folded in load order:
//! - Nodes: matched by exact `name` within their level, created on first sight
//! - Fields: a field set by a later fragment replaces the earlier value
//! - Unmentioned fields and nodes: left untouched

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::fragment::{
    fragment_paths, DebianArchFragment, FeaturesetFragment, FlavourFragment, Fragment,
    KernelArchFragment,
};
use super::settings::BuildSettings;
use super::ConfigError;

/// A fragment file that contributed to the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// File path
    pub path: PathBuf,

    /// SHA-256 digest of raw file bytes
    pub digest: String,
}

/// Merged top node plus the fragments it was built from
#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    /// Top-level defaults
    pub build: BuildSettings,

    /// Kernel architectures by name
    pub kernelarchs: BTreeMap<String, KernelArchNode>,

    /// Contributing fragments in load order
    pub sources: Vec<ConfigSource>,
}

/// Kernel architecture level (e.g. `x86`)
#[derive(Debug, Clone, Default)]
pub struct KernelArchNode {
    pub name: String,
    pub build: BuildSettings,
    pub debianarchs: BTreeMap<String, DebianArchNode>,
}

/// Debian architecture level (e.g. `amd64`)
#[derive(Debug, Clone, Default)]
pub struct DebianArchNode {
    pub name: String,
    pub build: BuildSettings,
    pub featuresets: BTreeMap<String, FeaturesetNode>,
}

/// Feature-set level (e.g. `none`, `rt`)
#[derive(Debug, Clone, Default)]
pub struct FeaturesetNode {
    pub name: String,
    pub build: BuildSettings,
    pub flavours: BTreeMap<String, FlavourNode>,
}

/// Flavour level (e.g. `cloud-amd64`)
#[derive(Debug, Clone, Default)]
pub struct FlavourNode {
    pub name: String,
    pub build: BuildSettings,
}

/// A node that can absorb fragments of its own level
trait Absorb: Default {
    type Fragment;

    fn fragment_name(fragment: &Self::Fragment) -> &str;

    fn absorb(&mut self, fragment: Self::Fragment);
}

fn absorb_children<N: Absorb>(children: &mut BTreeMap<String, N>, fragments: Vec<N::Fragment>) {
    for fragment in fragments {
        let name = N::fragment_name(&fragment).to_string();
        children.entry(name).or_default().absorb(fragment);
    }
}

impl Absorb for KernelArchNode {
    type Fragment = KernelArchFragment;

    fn fragment_name(fragment: &KernelArchFragment) -> &str {
        &fragment.name
    }

    fn absorb(&mut self, fragment: KernelArchFragment) {
        self.build.overlay(&fragment.build);
        absorb_children(&mut self.debianarchs, fragment.debianarch);
        self.name = fragment.name;
    }
}

impl Absorb for DebianArchNode {
    type Fragment = DebianArchFragment;

    fn fragment_name(fragment: &DebianArchFragment) -> &str {
        &fragment.name
    }

    fn absorb(&mut self, fragment: DebianArchFragment) {
        self.build.overlay(&fragment.build);
        absorb_children(&mut self.featuresets, fragment.featureset);
        self.name = fragment.name;
    }
}

impl Absorb for FeaturesetNode {
    type Fragment = FeaturesetFragment;

    fn fragment_name(fragment: &FeaturesetFragment) -> &str {
        &fragment.name
    }

    fn absorb(&mut self, fragment: FeaturesetFragment) {
        self.build.overlay(&fragment.build);
        absorb_children(&mut self.flavours, fragment.flavour);
        self.name = fragment.name;
    }
}

impl Absorb for FlavourNode {
    type Fragment = FlavourFragment;

    fn fragment_name(fragment: &FlavourFragment) -> &str {
        &fragment.name
    }

    fn absorb(&mut self, fragment: FlavourFragment) {
        self.build.overlay(&fragment.build);
        self.name = fragment.name;
    }
}

impl ConfigTree {
    /// Read every fragment from `dirs` in order; later directories win.
    ///
    /// Missing directories are skipped.
    pub fn read<P: AsRef<Path>>(dirs: &[P]) -> Result<Self, ConfigError> {
        let mut tree = ConfigTree::default();

        for dir in dirs {
            let dir = dir.as_ref();
            let paths = fragment_paths(dir)?;
            if paths.is_empty() {
                tracing::debug!(dir = %dir.display(), "no configuration fragments");
                continue;
            }

            for path in paths {
                let (fragment, digest) = Fragment::load(&path)?;
                tracing::debug!(path = %path.display(), %digest, "loaded configuration fragment");
                tree.absorb(fragment);
                tree.sources.push(ConfigSource { path, digest });
            }
        }

        Ok(tree)
    }

    /// Fold one fragment into the tree
    pub fn absorb(&mut self, fragment: Fragment) {
        self.build.overlay(&fragment.build);
        absorb_children(&mut self.kernelarchs, fragment.kernelarch);
    }

    /// Whether no node below the top was defined
    pub fn is_empty(&self) -> bool {
        self.kernelarchs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fragment(text: &str) -> Fragment {
        Fragment::parse(Path::new("defines.toml"), text).unwrap()
    }

    fn x86_amd64_flavour(tree: &ConfigTree) -> &FlavourNode {
        &tree.kernelarchs["x86"].debianarchs["amd64"].featuresets["none"].flavours["amd64"]
    }

    const BASE: &str = r#"
[build]
kernel_file = "vmlinux"

[[kernelarch]]
name = "x86"
[kernelarch.build]
kernel_file = "arch/x86/boot/bzImage"

[[kernelarch.debianarch]]
name = "amd64"

[[kernelarch.debianarch.featureset]]
name = "none"

[[kernelarch.debianarch.featureset.flavour]]
name = "amd64"
[kernelarch.debianarch.featureset.flavour.build]
kernel_file_max_size = 1000
"#;

    #[test]
    fn test_later_field_overrides() {
        let mut tree = ConfigTree::default();
        tree.absorb(fragment(BASE));
        tree.absorb(fragment(
            r#"
[[kernelarch]]
name = "x86"
[[kernelarch.debianarch]]
name = "amd64"
[[kernelarch.debianarch.featureset]]
name = "none"
[[kernelarch.debianarch.featureset.flavour]]
name = "amd64"
[kernelarch.debianarch.featureset.flavour.build]
kernel_file_max_size = 2000
"#,
        ));

        let flavour = x86_amd64_flavour(&tree);
        assert_eq!(flavour.build.kernel_file_max_size, Some(2000));
        // Untouched by the overlay
        assert_eq!(
            tree.kernelarchs["x86"].build.kernel_file.as_deref(),
            Some("arch/x86/boot/bzImage")
        );
        assert_eq!(tree.build.kernel_file.as_deref(), Some("vmlinux"));
    }

    #[test]
    fn test_later_fragment_adds_nodes() {
        let mut tree = ConfigTree::default();
        tree.absorb(fragment(BASE));
        tree.absorb(fragment(
            r#"
[[kernelarch]]
name = "x86"
[[kernelarch.debianarch]]
name = "amd64"
[[kernelarch.debianarch.featureset]]
name = "rt"
[[kernelarch.debianarch.featureset.flavour]]
name = "amd64"

[[kernelarch]]
name = "arm64"
"#,
        ));

        let amd64 = &tree.kernelarchs["x86"].debianarchs["amd64"];
        assert_eq!(
            amd64.featuresets.keys().collect::<Vec<_>>(),
            vec!["none", "rt"]
        );
        assert_eq!(tree.kernelarchs.len(), 2);
        assert_eq!(tree.kernelarchs["arm64"].name, "arm64");
    }

    #[test]
    fn test_names_are_exact() {
        let mut tree = ConfigTree::default();
        tree.absorb(fragment(BASE));
        tree.absorb(fragment("[[kernelarch]]\nname = \"X86\"\n"));

        assert_eq!(tree.kernelarchs.len(), 2);
        assert!(tree.kernelarchs["X86"].debianarchs.is_empty());
    }

    #[test]
    fn test_read_local_overrides_base() {
        let root = TempDir::new().unwrap();
        let base = root.path().join("config");
        let local = root.path().join("config.local");
        fs::create_dir_all(base.join("x86")).unwrap();
        fs::create_dir_all(&local).unwrap();
        fs::write(base.join("x86").join("defines.toml"), BASE).unwrap();
        fs::write(local.join("defines.toml"), "[build]\nenable_signed = true\n").unwrap();

        let tree = ConfigTree::read(&[&base, &local]).unwrap();

        assert_eq!(tree.build.enable_signed, Some(true));
        assert_eq!(tree.sources.len(), 2);
        assert_eq!(tree.sources[0].path, base.join("x86").join("defines.toml"));
        assert_eq!(tree.sources[1].path, local.join("defines.toml"));
        assert_eq!(tree.sources[0].digest.len(), 64);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_symlinked_fragment() {
        let root = TempDir::new().unwrap();
        let base = root.path().join("config");
        fs::create_dir_all(base.join("x86")).unwrap();
        fs::write(root.path().join("x86-defines.toml"), BASE).unwrap();
        std::os::unix::fs::symlink(
            root.path().join("x86-defines.toml"),
            base.join("x86").join("defines.toml"),
        )
        .unwrap();

        let tree = ConfigTree::read(&[&base]).unwrap();

        assert_eq!(tree.sources.len(), 1);
        let flavour = x86_amd64_flavour(&tree);
        assert_eq!(flavour.build.kernel_file_max_size, Some(1000));
    }

    #[test]
    fn test_read_missing_dirs_is_empty() {
        let root = TempDir::new().unwrap();
        let tree =
            ConfigTree::read(&[root.path().join("config"), root.path().join("config.local")])
                .unwrap();

        assert!(tree.is_empty());
        assert!(tree.sources.is_empty());
    }

    #[test]
    fn test_read_propagates_parse_error() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("defines.toml"), "[build\n").unwrap();

        let err = ConfigTree::read(&[root.path()]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
