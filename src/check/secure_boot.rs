//! Secure Boot kernel configuration check (`setup` phase)

use std::io::Write;
use std::path::{Path, PathBuf};

use super::{Check, CheckError, CheckInput, CheckStatus};
use crate::config::EffectivePolicy;
use crate::kconfig::{Kconfig, KconfigValue};

/// Environment variable that turns this check off when set to a non-empty value
pub const DISABLE_SIGNED_ENV: &str = "DEBIAN_KERNEL_DISABLE_SIGNED";

/// Required value of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Required {
    /// `=y`
    Enabled,
    /// Quoted string literal, quotes included
    Literal(&'static str),
}

impl Required {
    fn matches(self, value: &KconfigValue) -> bool {
        match (self, value) {
            (Required::Enabled, value) => value.is_enabled(),
            (Required::Literal(want), KconfigValue::Str(have)) => have == want,
            (Required::Literal(_), _) => false,
        }
    }
}

/// Symbols a signed kernel must carry
pub const REQUIRED_SYMBOLS: &[(&str, Required)] = &[
    ("EFI_STUB", Required::Enabled),
    ("LOCK_DOWN_IN_EFI_SECURE_BOOT", Required::Enabled),
    ("SYSTEM_TRUSTED_KEYS", Required::Literal("\"\"")),
];

/// Verifies `.config` supports Secure Boot when signing is enabled
#[derive(Debug, Clone)]
pub struct SecureBootCheck {
    enabled: bool,
    config_path: PathBuf,
}

impl SecureBootCheck {
    pub const NAME: &'static str = "secure-boot-config";

    pub fn new(policy: &EffectivePolicy, dir: &Path, signing_disabled: bool) -> Self {
        Self {
            enabled: policy.enable_signed && !signing_disabled,
            config_path: dir.join(".config"),
        }
    }

    pub fn construct(input: &CheckInput<'_>) -> Result<Box<dyn Check>, CheckError> {
        Ok(Box::new(Self::new(
            input.policy,
            input.dir,
            input.signing_disabled,
        )))
    }

    /// Compare a symbol table against [`REQUIRED_SYMBOLS`], reporting every
    /// problem found.
    pub fn verify(kconfig: &Kconfig, out: &mut dyn Write) -> Result<CheckStatus, CheckError> {
        let mut status = CheckStatus::Passed;

        for &(name, required) in REQUIRED_SYMBOLS {
            match kconfig.value(name) {
                None => {
                    writeln!(out, "Secure Boot: CONFIG_{} is not defined", name)?;
                    status = CheckStatus::Failed;
                }
                Some(value) if !required.matches(value) => {
                    writeln!(out, "Secure Boot: CONFIG_{} has wrong value: {}", name, value)?;
                    status = CheckStatus::Failed;
                }
                Some(_) => {}
            }
        }

        Ok(status)
    }
}

impl Check for SecureBootCheck {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&self, out: &mut dyn Write) -> Result<CheckStatus, CheckError> {
        if !self.enabled {
            return Ok(CheckStatus::Passed);
        }

        let kconfig = Kconfig::from_file(&self.config_path)?;
        Self::verify(&kconfig, out)
    }
}
