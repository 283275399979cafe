use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{PrepError, Result};

/// Tunables for fitting, filtering and splitting.
///
/// Every field has a default so a partial TOML file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Maximum fraction of missing values a column may have and still be kept.
    pub null_pct_cut: f64,
    /// Columns with variance at or below this are treated as constant.
    pub low_var_eps: f64,
    /// Fraction of the binary-labelled rows held out for validation.
    pub test_size: f64,
    /// Seed for the stratified split.
    pub random_state: u64,
    /// Rows with fewer known raw canonical values are dropped.
    pub min_raw_nonnull: usize,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            null_pct_cut: 0.80,
            low_var_eps: 1e-12,
            test_size: 0.20,
            random_state: 42,
            min_raw_nonnull: 3,
        }
    }
}

impl PrepConfig {
    /// Read a TOML file, falling back to defaults for absent keys.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PrepError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: PrepConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.null_pct_cut) {
            return Err(PrepError::Config(format!(
                "null_pct_cut must be within [0, 1], got {}",
                self.null_pct_cut
            )));
        }
        if self.low_var_eps < 0.0 || !self.low_var_eps.is_finite() {
            return Err(PrepError::Config(format!(
                "low_var_eps must be a non-negative finite number, got {}",
                self.low_var_eps
            )));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PrepError::Config(format!(
                "test_size must be strictly between 0 and 1, got {}",
                self.test_size
            )));
        }
        if self.min_raw_nonnull > crate::domain::N_FEATURES {
            return Err(PrepError::Config(format!(
                "min_raw_nonnull cannot exceed the {} canonical features, got {}",
                crate::domain::N_FEATURES,
                self.min_raw_nonnull
            )));
        }
        Ok(())
    }
}
