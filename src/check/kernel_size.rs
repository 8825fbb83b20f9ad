//! Kernel image size budget check (`build` phase)

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{Check, CheckError, CheckInput, CheckStatus};
use crate::changelog::ChangelogEntry;
use crate::config::EffectivePolicy;

/// Usage percentage at or above which headroom is reported as too thin
const HEADROOM_WARN_PERCENT: f64 = 99.0;

/// Compares the built image against `kernel_file_max_size`
#[derive(Debug, Clone)]
pub struct KernelSizeCheck {
    limit: Option<u64>,
    image: Option<PathBuf>,
    distribution: String,
}

impl KernelSizeCheck {
    pub const NAME: &'static str = "kernel-size";

    pub fn new(policy: &EffectivePolicy, dir: &Path, distribution: impl Into<String>) -> Self {
        Self {
            limit: policy.kernel_file_max_size,
            image: policy.kernel_file.as_ref().map(|file| dir.join(file)),
            distribution: distribution.into(),
        }
    }

    /// Registry constructor. The changelog is only consulted when a size
    /// budget is configured.
    pub fn construct(input: &CheckInput<'_>) -> Result<Box<dyn Check>, CheckError> {
        let distribution = match input.policy.kernel_file_max_size {
            Some(_) => ChangelogEntry::read_top(input.changelog)?.distribution,
            None => String::new(),
        };
        Ok(Box::new(Self::new(input.policy, input.dir, distribution)))
    }
}

impl Check for KernelSizeCheck {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&self, out: &mut dyn Write) -> Result<CheckStatus, CheckError> {
        let Some(limit) = self.limit else {
            return Ok(CheckStatus::Passed);
        };
        let image = self.image.as_ref().ok_or(CheckError::NoKernelFile)?;

        let size = fs::metadata(image)
            .map_err(|source| CheckError::Image {
                path: image.clone(),
                source,
            })?
            .len();
        let usage = (size as f64 / limit as f64) * 100.0;

        writeln!(out, "Image size {}/{}, using {:.2}%.", size, limit, usage)?;

        if size > limit {
            writeln!(out, "Too large, refusing to continue.")?;
            return Ok(CheckStatus::Failed);
        }

        // Stable releases need room to grow
        if usage >= HEADROOM_WARN_PERCENT {
            writeln!(out, "Under 1% space in {}.", self.distribution)?;
        }
        writeln!(out, "Image fits. Continuing.")?;
        Ok(CheckStatus::Passed)
    }
}
