//! Quality gate: column filtering, imputation and row completeness.
//!
//! Column decisions and imputation statistics are learned once at fit time
//! and applied unchanged afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::PrepConfig;
use crate::constants;
use crate::error::{PrepError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::coerce::NumericColumn;

/// Configuration for the quality gate thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct QualityGateConfig {
    /// Columns missing more than this fraction are dropped
    pub null_pct_cut: f64,
    /// Columns whose variance is at or below this are dropped
    pub low_var_eps: f64,
    /// Minimum raw canonical values a row needs to be kept
    pub min_raw_nonnull: usize,
}

impl Default for QualityGateConfig {
    fn default() -> Self {
        Self::from(&PrepConfig::default())
    }
}

impl From<&PrepConfig> for QualityGateConfig {
    fn from(config: &PrepConfig) -> Self {
        Self {
            null_pct_cut: config.null_pct_cut,
            low_var_eps: config.low_var_eps,
            min_raw_nonnull: config.min_raw_nonnull,
        }
    }
}

/// Why a column was removed from the working set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    Identifier,
    Duplicate,
    Sparse,
    Constant,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Identifier => "identifier",
            DropReason::Duplicate => "duplicate",
            DropReason::Sparse => "sparse",
            DropReason::Constant => "constant",
        }
    }
}

/// Fraction of missing values; an empty column counts as fully missing.
pub fn null_fraction(values: &[Option<f64>]) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    let missing = values.iter().filter(|v| v.is_none()).count();
    missing as f64 / values.len() as f64
}

pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Sample variance (n - 1) of the present values. Fewer than two values
/// give 0.
pub fn variance(values: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.len() < 2 {
        return 0.0;
    }
    let m = present.iter().sum::<f64>() / present.len() as f64;
    present.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (present.len() - 1) as f64
}

/// Median of the present values; the mean of the middle pair for even counts.
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(|a, b| a.total_cmp(b));
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

/// Reason a single column fails the gate, checking sparsity before variance.
pub fn drop_reason(values: &[Option<f64>], config: &QualityGateConfig) -> Option<DropReason> {
    if null_fraction(values) > config.null_pct_cut {
        return Some(DropReason::Sparse);
    }
    if variance(values).abs() <= config.low_var_eps {
        return Some(DropReason::Constant);
    }
    None
}

/// Drop sparse columns, then constant ones. Returns the surviving columns in
/// input order and the dropped names with their reason.
pub fn filter_columns(
    columns: Vec<(String, NumericColumn)>,
    config: &QualityGateConfig,
) -> (Vec<(String, NumericColumn)>, Vec<(String, DropReason)>) {
    let mut kept = Vec::with_capacity(columns.len());
    let mut dropped = Vec::new();

    for (name, values) in columns {
        match drop_reason(&values, config) {
            Some(DropReason::Sparse) => {
                debug!(
                    "Dropping sparse column '{}' ({:.1}% missing)",
                    name,
                    null_fraction(&values) * 100.0
                );
                dropped.push((name, DropReason::Sparse));
            }
            Some(reason) => {
                debug!("Dropping constant column '{}' (variance {:e})", name, variance(&values));
                dropped.push((name, reason));
            }
            None => kept.push((name, values)),
        }
    }

    for reason in [DropReason::Sparse, DropReason::Constant] {
        let count = dropped.iter().filter(|(_, r)| *r == reason).count();
        if count > 0 {
            metrics::reconcile::columns_dropped(reason.as_str(), count);
        }
    }

    (kept, dropped)
}

/// Fit-time imputation statistics for the working columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Imputer {
    pub means: BTreeMap<String, f64>,
    pub int_medians: BTreeMap<String, f64>,
}

impl Imputer {
    pub fn fit(columns: &[(String, NumericColumn)]) -> Self {
        let mut imputer = Imputer::default();
        for (name, values) in columns {
            if let Some(m) = mean(values) {
                imputer.means.insert(name.clone(), m);
            }
            if constants::INTEGER_LIKE.contains(&name.as_str()) {
                if let Some(med) = median(values) {
                    imputer.int_medians.insert(name.clone(), med);
                }
            }
        }
        imputer
    }

    /// Fill one column. Integer-like columns take the median and are then
    /// rounded half up; the rest take the mean. A column with no statistic
    /// falls back to 0.
    pub fn impute(&self, name: &str, values: &[Option<f64>]) -> Vec<f64> {
        if let Some(med) = self.int_medians.get(name) {
            return values
                .iter()
                .map(|v| (v.unwrap_or(*med) + 0.5).floor())
                .collect();
        }
        let fill = self.means.get(name).copied().unwrap_or(0.0);
        values.iter().map(|v| v.unwrap_or(fill)).collect()
    }
}

/// Number of present values per row across `columns`.
pub fn raw_counts(columns: &[NumericColumn], n_rows: usize) -> Vec<usize> {
    (0..n_rows)
        .map(|r| columns.iter().filter(|c| c[r].is_some()).count())
        .collect()
}

/// Indices of rows with at least `min_raw_nonnull` raw values. Fails when
/// none survive.
pub fn complete_rows(raw_counts: &[usize], min_raw_nonnull: usize) -> Result<Vec<usize>> {
    let kept: Vec<usize> = raw_counts
        .iter()
        .enumerate()
        .filter(|(_, &n)| n >= min_raw_nonnull)
        .map(|(i, _)| i)
        .collect();

    let dropped = raw_counts.len() - kept.len();
    if dropped > 0 {
        info!(
            "Dropped {} of {} rows with fewer than {} known features",
            dropped,
            raw_counts.len(),
            min_raw_nonnull
        );
        metrics::quality_gate::rows_incomplete(dropped);
    }

    if kept.is_empty() {
        return Err(PrepError::InsufficientData(format!(
            "no row has at least {} known canonical features ({} rows checked)",
            min_raw_nonnull,
            raw_counts.len()
        )));
    }
    Ok(kept)
}
