//! Fit, transform and split a training table in one pass.

use tracing::info;

use crate::config::PrepConfig;
use crate::domain::{FeatureMatrix, Label};
use crate::error::{PrepError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::quality_gate::complete_rows;
use crate::pipeline::processing::reconcile::{FittedState, Reconciler};
use crate::pipeline::processing::split::{partition_labels, stratified_split};
use crate::table::RawTable;

/// Candidate rows held aside for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    /// Source row of each candidate.
    pub rows: Vec<usize>,
    /// Identifiers, present when the table had an identifier column.
    pub ids: Option<Vec<Option<String>>>,
    pub features: FeatureMatrix,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SplitResult {
    pub state: FittedState,
    pub train_features: FeatureMatrix,
    pub train_labels: Vec<Label>,
    pub train_rows: Vec<usize>,
    pub valid_features: FeatureMatrix,
    pub valid_labels: Vec<Label>,
    pub valid_rows: Vec<usize>,
    pub candidates: CandidateSet,
    /// Rows dropped for too few known canonical values.
    pub incomplete_rows: usize,
    /// Rows discarded for an unrecognized disposition.
    pub unknown_rows: usize,
}

pub struct Preprocessor {
    pub config: PrepConfig,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            config: PrepConfig::default(),
        }
    }

    pub fn with_config(config: PrepConfig) -> Self {
        Self { config }
    }

    pub fn fit(&self, raw: &RawTable) -> Result<FittedState> {
        Reconciler::from_prep_config(&self.config).fit(raw)
    }

    /// Fit on `raw`, transform it with the fitted state, drop incomplete rows,
    /// and split confirmed / false-positive rows into train and validation
    /// parts. Candidates are returned separately; unknown rows are discarded.
    pub fn fit_and_split(&self, raw: &RawTable) -> Result<SplitResult> {
        self.config.validate()?;

        let state = self.fit(raw)?;
        let out = state.transform(raw);

        let complete = complete_rows(&out.raw_counts, self.config.min_raw_nonnull)?;
        let incomplete_rows = out.raw_counts.len() - complete.len();

        let partition = partition_labels(&out.labels, &complete);
        if partition.binary.is_empty() {
            return Err(PrepError::InsufficientData(format!(
                "no confirmed or false-positive rows among {} complete rows",
                complete.len()
            )));
        }

        let binary_labels: Vec<Label> = partition.binary.iter().map(|&r| out.labels[r]).collect();
        let (train_pos, valid_pos) =
            stratified_split(&binary_labels, self.config.test_size, self.config.random_state)?;
        let train_rows: Vec<usize> = train_pos.iter().map(|&p| partition.binary[p]).collect();
        let valid_rows: Vec<usize> = valid_pos.iter().map(|&p| partition.binary[p]).collect();

        let candidates = CandidateSet {
            ids: out
                .ids
                .as_ref()
                .map(|ids| partition.candidates.iter().map(|&r| ids[r].clone()).collect()),
            features: out.features.select(&partition.candidates),
            rows: partition.candidates,
        };

        metrics::partition::rows("train", train_rows.len());
        metrics::partition::rows("valid", valid_rows.len());
        metrics::partition::rows("candidates", candidates.len());
        info!(
            "Split {} table: {} train, {} valid, {} candidates ({} incomplete, {} unknown)",
            state.mission,
            train_rows.len(),
            valid_rows.len(),
            candidates.len(),
            incomplete_rows,
            partition.unknown
        );

        Ok(SplitResult {
            train_features: out.features.select(&train_rows),
            train_labels: train_rows.iter().map(|&r| out.labels[r]).collect(),
            valid_features: out.features.select(&valid_rows),
            valid_labels: valid_rows.iter().map(|&r| out.labels[r]).collect(),
            train_rows,
            valid_rows,
            candidates,
            incomplete_rows,
            unknown_rows: partition.unknown,
            state,
        })
    }
}

/// [`Preprocessor::fit_and_split`] with default thresholds.
pub fn fit_and_split(raw: &RawTable, test_fraction: f64, seed: u64) -> Result<SplitResult> {
    Preprocessor::with_config(PrepConfig {
        test_size: test_fraction,
        random_state: seed,
        ..PrepConfig::default()
    })
    .fit_and_split(raw)
}
