//! On-disk fixtures for end-to-end tests
//!
//! Builds a throwaway source tree shaped like a Debian kernel package:
//! `debian/config`, optional `debian/config.local`, `debian/changelog`
//! and a build output directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Base policy tree used by most tests
pub const BASE_DEFINES: &str = r#"
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
[kernelarch.debianarch.featureset.build]
enable_signed = true

[[kernelarch.debianarch.featureset.flavour]]
name = "amd64"
[kernelarch.debianarch.featureset.flavour.build]
kernel_file_max_size = 1000

[[kernelarch.debianarch.featureset.flavour]]
name = "cloud-amd64"
[kernelarch.debianarch.featureset.flavour.build]
enable_signed = false

[[kernelarch.debianarch.featureset]]
name = "rt"

[[kernelarch.debianarch.featureset.flavour]]
name = "amd64"
"#;

pub const CHANGELOG: &str = "\
linux (6.1.76-1) bookworm; urgency=medium

  * New upstream stable update.

 -- Debian Kernel Team <debian-kernel@lists.debian.org>  Fri, 02 Feb 2024 10:00:00 +0100
";

pub const GOOD_KCONFIG: &str = "\
CONFIG_EFI_STUB=y
CONFIG_LOCK_DOWN_IN_EFI_SECURE_BOOT=y
CONFIG_SYSTEM_TRUSTED_KEYS=\"\"
";

pub const IMAGE: &str = "arch/x86/boot/bzImage";

/// Temporary package source tree
pub struct SourceTree {
    root: TempDir,
}

impl SourceTree {
    /// Tree with [`BASE_DEFINES`] under `debian/config/x86` and a changelog
    pub fn new() -> Self {
        let tree = Self::empty();
        tree.write("debian/config/x86/defines.toml", BASE_DEFINES);
        tree.write("debian/changelog", CHANGELOG);
        fs::create_dir_all(tree.build_dir()).unwrap();
        tree
    }

    /// Tree with no configuration at all
    pub fn empty() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn config_dirs(&self) -> Vec<PathBuf> {
        vec![self.path("debian/config"), self.path("debian/config.local")]
    }

    pub fn changelog(&self) -> PathBuf {
        self.path("debian/changelog")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.path("debian/build/build_amd64_none_amd64")
    }

    /// Write a kernel image of `size` bytes into the build directory
    pub fn write_image(&self, size: usize) {
        let rel = format!("debian/build/build_amd64_none_amd64/{}", IMAGE);
        self.write(&rel, vec![0u8; size]);
    }

    /// Write the build directory's `.config`
    pub fn write_kconfig(&self, contents: &str) {
        self.write("debian/build/build_amd64_none_amd64/.config", contents);
    }
}
