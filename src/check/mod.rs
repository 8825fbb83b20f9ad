//! Policy checks and the phase registry
//!
//! Each phase maps to an ordered list of check constructors. Every check in
//! a phase runs, even after an earlier one failed, and the status codes are
//! OR-combined.

mod kernel_size;
mod secure_boot;

pub use kernel_size::KernelSizeCheck;
pub use secure_boot::{SecureBootCheck, DISABLE_SIGNED_ENV, REQUIRED_SYMBOLS};

use std::fmt;
use std::io::{self, Write};
use std::ops::{BitOr, BitOrAssign};
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::changelog::ChangelogError;
use crate::config::{EffectivePolicy, Variant};
use crate::kconfig::KconfigError;

/// Outcome of a check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckStatus {
    #[default]
    Passed,
    Failed,
}

impl CheckStatus {
    /// Process exit code for this status
    pub fn code(self) -> i32 {
        match self {
            CheckStatus::Passed => 0,
            CheckStatus::Failed => 1,
        }
    }

    pub fn is_failure(self) -> bool {
        self == CheckStatus::Failed
    }
}

impl BitOr for CheckStatus {
    type Output = CheckStatus;

    fn bitor(self, rhs: CheckStatus) -> CheckStatus {
        if self.is_failure() || rhs.is_failure() {
            CheckStatus::Failed
        } else {
            CheckStatus::Passed
        }
    }
}

impl BitOrAssign for CheckStatus {
    fn bitor_assign(&mut self, rhs: CheckStatus) {
        *self = *self | rhs;
    }
}

/// Error that prevented a check from reaching a verdict.
///
/// The runner reports it and counts the check as failed.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("no kernel_file configured for this flavour")]
    NoKernelFile,

    #[error("cannot stat image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Kconfig(#[from] KconfigError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error("failed to write check output: {0}")]
    Output(#[from] io::Error),
}

/// Inputs every check is constructed from
#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    /// Effective policy of the selected flavour
    pub policy: &'a EffectivePolicy,

    /// Build output directory
    pub dir: &'a Path,

    pub variant: &'a Variant,

    /// Debian changelog used to name the target distribution
    pub changelog: &'a Path,

    /// Secure Boot check forced off by the environment
    pub signing_disabled: bool,
}

/// A policy check bound to one build variant
pub trait Check {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Run the check, writing its narrative to `out`
    fn run(&self, out: &mut dyn Write) -> Result<CheckStatus, CheckError>;
}

/// Builds a check from its inputs
pub type CheckConstructor = fn(&CheckInput<'_>) -> Result<Box<dyn Check>, CheckError>;

/// Registry entry: a check's name and how to build it
#[derive(Clone, Copy)]
pub struct RegisteredCheck {
    pub name: &'static str,
    pub construct: CheckConstructor,
}

const SETUP_CHECKS: &[RegisteredCheck] = &[RegisteredCheck {
    name: SecureBootCheck::NAME,
    construct: SecureBootCheck::construct,
}];

const BUILD_CHECKS: &[RegisteredCheck] = &[RegisteredCheck {
    name: KernelSizeCheck::NAME,
    construct: KernelSizeCheck::construct,
}];

/// Packaging phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Phase {
    /// Before compilation
    Setup,
    /// After compilation
    Build,
}

impl Phase {
    /// Checks registered for this phase, in run order
    pub fn checks(self) -> &'static [RegisteredCheck] {
        match self {
            Phase::Setup => SETUP_CHECKS,
            Phase::Build => BUILD_CHECKS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Build => "build",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
