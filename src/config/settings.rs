//! Build policy fields carried by every hierarchy level

use serde::Deserialize;

/// Policy fields as written at one level of the hierarchy.
///
/// Every field is optional; an unset field is inherited from the parent
/// level during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildSettings {
    /// Image path relative to the build directory
    pub kernel_file: Option<String>,

    /// Size budget for the image in bytes
    pub kernel_file_max_size: Option<u64>,

    /// Whether this variant is Secure Boot signed
    pub enable_signed: Option<bool>,
}

impl BuildSettings {
    /// Overlay `other` on top of `self`: fields set in `other` win,
    /// fields unset in `other` are left untouched.
    pub fn overlay(&mut self, other: &BuildSettings) {
        if let Some(ref file) = other.kernel_file {
            self.kernel_file = Some(file.clone());
        }
        if let Some(max) = other.kernel_file_max_size {
            self.kernel_file_max_size = Some(max);
        }
        if let Some(signed) = other.enable_signed {
            self.enable_signed = Some(signed);
        }
    }

    /// Return a copy with `child` overlaid
    pub fn inherit(&self, child: &BuildSettings) -> BuildSettings {
        let mut merged = self.clone();
        merged.overlay(child);
        merged
    }

    /// Check field values that TOML typing alone cannot rule out
    pub fn validate(&self) -> Result<(), String> {
        if self.kernel_file_max_size == Some(0) {
            return Err("kernel_file_max_size must be a positive number of bytes".to_string());
        }
        if self.kernel_file.as_deref() == Some("") {
            return Err("kernel_file must not be empty".to_string());
        }
        Ok(())
    }
}
