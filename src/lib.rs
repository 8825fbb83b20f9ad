//! Kernel build policy checks
//!
//! Validates a kernel build against packaging policy at two points of the
//! pipeline: `setup` (Secure Boot configuration) and `build` (image size
//! budget). The effective policy for a variant comes from a layered
//! configuration hierarchy; see [`config`].

pub mod changelog;
pub mod check;
pub mod config;
pub mod logging;
pub mod runner;

pub use buildcheck_kconfig as kconfig;

pub use check::{Check, CheckError, CheckInput, CheckStatus, Phase};
pub use config::{ConfigError, ConfigTree, EffectivePolicy, ResolvedConfig, Variant};
pub use runner::{run, run_registered, RunOptions};
