//! Kernel build policy checker CLI
//!
//! Entry point for the `buildcheck` command-line tool.

use clap::Parser;
use kernel_buildcheck::changelog::DEFAULT_CHANGELOG;
use kernel_buildcheck::check::DISABLE_SIGNED_ENV;
use kernel_buildcheck::{logging, run, CheckStatus, ConfigError, Phase, RunOptions, Variant};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status when a check failed or its narrative could not be written
const EXIT_FAILURE: u8 = 1;

/// Exit status for configuration errors (no check ran)
const EXIT_CONFIG_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "buildcheck")]
#[command(about = "Check a kernel build against packaging policy", version)]
struct Cli {
    /// Build output directory
    dir: PathBuf,

    /// Debian architecture (e.g. amd64)
    arch: String,

    /// Feature-set (e.g. none, rt)
    featureset: String,

    /// Flavour (e.g. cloud-amd64)
    flavour: String,

    /// Packaging phase whose checks to run
    #[arg(value_enum)]
    phase: Phase,

    /// Configuration directory, repeatable; later ones take precedence
    /// (default: debian/config, debian/config.local)
    #[arg(long = "config-dir", value_name = "PATH")]
    config_dirs: Vec<PathBuf>,

    /// Debian changelog naming the target distribution
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CHANGELOG)]
    changelog: PathBuf,
}

fn signing_disabled_by_env() -> bool {
    std::env::var_os(DISABLE_SIGNED_ENV).is_some_and(|value| !value.is_empty())
}

/// Map the run result and the final stdout flush to an exit status
fn exit_code(result: &Result<CheckStatus, ConfigError>, flushed: &io::Result<()>) -> u8 {
    match (result, flushed) {
        (Err(e), _) => {
            eprintln!("buildcheck: {}", e);
            EXIT_CONFIG_ERROR
        }
        (Ok(_), Err(e)) => {
            eprintln!("buildcheck: failed to write check output: {}", e);
            EXIT_FAILURE
        }
        (Ok(status), Ok(())) => {
            if status.is_failure() {
                EXIT_FAILURE
            } else {
                0
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_cli();

    let mut options = RunOptions::new(
        cli.dir,
        Variant::new(cli.arch, cli.featureset, cli.flavour),
        cli.phase,
    );
    if !cli.config_dirs.is_empty() {
        options.config_dirs = cli.config_dirs;
    }
    options.changelog = cli.changelog;
    options.signing_disabled = signing_disabled_by_env();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = run(&options, &mut out);
    let flushed = out.flush();

    ExitCode::from(exit_code(&result, &flushed))
}
