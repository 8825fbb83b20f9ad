//! Phase runner
//!
//! Resolves the effective policy for one variant, then runs every check
//! registered for the phase against a shared output sink.

use std::io::Write;
use std::path::PathBuf;

use crate::changelog::DEFAULT_CHANGELOG;
use crate::check::{Check, CheckError, CheckInput, CheckStatus, Phase, RegisteredCheck};
use crate::config::{ConfigError, ConfigTree, Variant, DEFAULT_CONFIG_DIRS};

/// Everything one invocation needs
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Build output directory
    pub dir: PathBuf,

    pub variant: Variant,

    pub phase: Phase,

    /// Configuration directories, lowest precedence first
    pub config_dirs: Vec<PathBuf>,

    pub changelog: PathBuf,

    /// Force the Secure Boot check off
    pub signing_disabled: bool,
}

impl RunOptions {
    /// Options with the default configuration directories and changelog
    pub fn new(dir: impl Into<PathBuf>, variant: Variant, phase: Phase) -> Self {
        Self {
            dir: dir.into(),
            variant,
            phase,
            config_dirs: DEFAULT_CONFIG_DIRS.iter().map(PathBuf::from).collect(),
            changelog: PathBuf::from(DEFAULT_CHANGELOG),
            signing_disabled: false,
        }
    }
}

/// Run all checks for `options.phase`.
///
/// Configuration errors abort before any check runs. Check failures and
/// check errors are reported on `out` and folded into the returned status.
pub fn run(options: &RunOptions, out: &mut dyn Write) -> Result<CheckStatus, ConfigError> {
    let tree = ConfigTree::read(&options.config_dirs)?;
    let resolved = tree.resolve()?;
    let policy = resolved.select(&options.variant)?;

    let input = CheckInput {
        policy,
        dir: &options.dir,
        variant: &options.variant,
        changelog: &options.changelog,
        signing_disabled: options.signing_disabled,
    };

    let status = run_registered(options.phase.checks(), &input, out);

    tracing::info!(
        phase = %options.phase,
        variant = %options.variant,
        code = status.code(),
        "phase checks finished"
    );
    Ok(status)
}

/// Construct and run each registered check in order, without
/// short-circuiting. Constructor and run errors count as failures.
pub fn run_registered(
    entries: &[RegisteredCheck],
    input: &CheckInput<'_>,
    out: &mut dyn Write,
) -> CheckStatus {
    entries
        .iter()
        .fold(CheckStatus::Passed, |status, entry| {
            status
                | match (entry.construct)(input) {
                    Ok(check) => run_check(check.as_ref(), out),
                    Err(err) => report_error(entry.name, &err, out),
                }
        })
}

fn run_check(check: &dyn Check, out: &mut dyn Write) -> CheckStatus {
    tracing::info!(check = check.name(), "running check");
    match check.run(out) {
        Ok(status) => {
            tracing::info!(check = check.name(), code = status.code(), "check finished");
            status
        }
        Err(err) => report_error(check.name(), &err, out),
    }
}

fn report_error(name: &str, err: &CheckError, out: &mut dyn Write) -> CheckStatus {
    tracing::error!(check = name, error = %err, "check could not complete");
    if let Err(write_err) = writeln!(out, "{}: {}", name, err) {
        tracing::error!(check = name, error = %write_err, "failed to report check error");
    }
    CheckStatus::Failed
}
