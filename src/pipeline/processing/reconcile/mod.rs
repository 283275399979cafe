//! Schema reconciliation.
//!
//! [`Reconciler::fit`] learns everything needed to turn a survey table into
//! features: the mission, which columns survive hygiene and quality
//! filtering, imputation statistics, and which source column feeds each
//! canonical field. The result is an immutable [`FittedState`]; [`transform`]
//! only borrows it, so the same state can be applied to any number of tables.
//!
//! A canonical field only binds to a source column that passes the sparse
//! and constant checks. Sources caught by the identifier markers (`ra` in
//! `koi_duration`) are still eligible, but are checked on their own.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::PrepConfig;
use crate::constants;
use crate::domain::{CanonicalField, FeatureMatrix, Label, Mission, N_FEATURES};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::coerce::{to_numeric, NumericColumn};
use crate::pipeline::processing::disposition::{detect_mission, map_labels};
use crate::pipeline::processing::quality_gate::{
    self, filter_columns, DropReason, Imputer, QualityGateConfig,
};
use crate::pipeline::processing::resolve::find_column;
use crate::table::{Column, RawTable};

/// Source column chosen for one canonical field at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureBinding {
    pub field: CanonicalField,
    /// `None` when no alias matched or the match failed the quality gate;
    /// the field is then imputed with 0.
    pub source: Option<String>,
}

/// Everything learned by [`Reconciler::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedState {
    pub mission: Mission,
    pub disposition_column: String,
    /// Human-readable identifier carried through to candidate output.
    pub id_column: Option<String>,
    pub kept_columns: Vec<String>,
    pub dropped_columns: Vec<(String, DropReason)>,
    /// Statistics for every kept column plus any bound source outside them.
    pub imputer: Imputer,
    /// One binding per canonical field, in canonical order.
    pub bindings: Vec<FeatureBinding>,
}

impl FittedState {
    pub fn binding(&self, field: CanonicalField) -> Option<&FeatureBinding> {
        self.bindings.iter().find(|b| b.field == field)
    }

    pub fn transform(&self, raw: &RawTable) -> TransformOutput {
        transform(raw, self)
    }
}

/// Output of [`transform`]; every vector is aligned with the input rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub features: FeatureMatrix,
    pub labels: Vec<Label>,
    pub ids: Option<Vec<Option<String>>>,
    /// Canonical values present before imputation, per row.
    pub raw_counts: Vec<usize>,
}

pub struct Reconciler {
    pub config: QualityGateConfig,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            config: QualityGateConfig::default(),
        }
    }

    pub fn with_config(config: QualityGateConfig) -> Self {
        Self { config }
    }

    pub fn from_prep_config(config: &PrepConfig) -> Self {
        Self::with_config(QualityGateConfig::from(config))
    }

    pub fn fit(&self, raw: &RawTable) -> Result<FittedState> {
        let started = Instant::now();
        let table = raw.with_trimmed_names();

        let (mission, disposition_column) = detect_mission(&table)?;
        info!(
            "Detected mission {} from column '{}'",
            mission, disposition_column
        );

        if let Some(column) = table.column(&disposition_column) {
            let labels = map_labels(&column.cells, mission);
            for label in [Label::Confirmed, Label::FalsePositive, Label::Candidate, Label::Unknown] {
                debug!(
                    "{} rows labelled {}",
                    labels.iter().filter(|l| **l == label).count(),
                    label.as_str()
                );
            }
        }

        let id_column = constants::HUMAN_ID_CANDIDATES
            .iter()
            .find(|name| table.has_column(name))
            .map(|name| name.to_string());

        let mut dropped_columns = Vec::new();
        let mut candidates: Vec<(String, NumericColumn)> = Vec::new();

        for column in table.columns() {
            let name = column.name.as_str();
            if name == disposition_column || Some(name) == id_column.as_deref() {
                continue;
            }
            if is_duplicate(&table, name) {
                debug!("Dropping duplicate column '{}'", name);
                dropped_columns.push((name.to_string(), DropReason::Duplicate));
                continue;
            }
            if is_identifier_like(name) {
                debug!("Dropping identifier or comment column '{}'", name);
                dropped_columns.push((name.to_string(), DropReason::Identifier));
                continue;
            }
            candidates.push((name.to_string(), numeric_column(column)));
        }

        let hygiene_dropped = dropped_columns.len();
        for reason in [DropReason::Duplicate, DropReason::Identifier] {
            let count = dropped_columns.iter().filter(|(_, r)| *r == reason).count();
            if count > 0 {
                metrics::reconcile::columns_dropped(reason.as_str(), count);
            }
        }

        let (kept, filtered) = filter_columns(candidates, &self.config);
        dropped_columns.extend(filtered);

        let (bindings, extra_sources) = self.bind_features(&table, &kept, &dropped_columns);

        let kept_columns: Vec<String> = kept.iter().map(|(name, _)| name.clone()).collect();
        let mut fitted = kept;
        fitted.extend(extra_sources);
        let imputer = Imputer::fit(&fitted);

        info!(
            "Fitted {} table: kept {} columns, dropped {} ({} by hygiene), bound {}/{} features",
            mission,
            kept_columns.len(),
            dropped_columns.len(),
            hygiene_dropped,
            bindings.iter().filter(|b| b.source.is_some()).count(),
            N_FEATURES
        );
        metrics::reconcile::fit_duration(started.elapsed().as_secs_f64());

        Ok(FittedState {
            mission,
            disposition_column,
            id_column,
            kept_columns,
            dropped_columns,
            imputer,
            bindings,
        })
    }

    /// Bind each canonical field to its first alias match, provided that
    /// column survives the quality gate. Also returns the bound sources that
    /// are not among the kept columns, so the imputer can be fitted on them.
    fn bind_features(
        &self,
        table: &RawTable,
        kept: &[(String, NumericColumn)],
        dropped: &[(String, DropReason)],
    ) -> (Vec<FeatureBinding>, Vec<(String, NumericColumn)>) {
        let mut extra: Vec<(String, NumericColumn)> = Vec::new();

        let bindings = CanonicalField::ALL
            .iter()
            .map(|field| {
                let Some(column) = find_column(table, field.aliases()) else {
                    warn!("No source column for {}; it will be imputed", field);
                    metrics::reconcile::unbound_feature();
                    return FeatureBinding { field: *field, source: None };
                };
                let name = column.name.as_str();

                let rejected = if kept.iter().any(|(n, _)| n == name) {
                    None
                } else if let Some((_, reason)) = dropped
                    .iter()
                    .find(|(n, r)| n == name && matches!(r, DropReason::Sparse | DropReason::Constant))
                {
                    Some(*reason)
                } else {
                    let values = numeric_column(column);
                    let reason = quality_gate::drop_reason(&values, &self.config);
                    if reason.is_none() && !extra.iter().any(|(n, _)| n == name) {
                        extra.push((name.to_string(), values));
                    }
                    reason
                };

                match rejected {
                    None => {
                        debug!("Bound {} to '{}'", field, name);
                        FeatureBinding {
                            field: *field,
                            source: Some(name.to_string()),
                        }
                    }
                    Some(reason) => {
                        warn!(
                            "Source column '{}' for {} is {}; it will be imputed",
                            name,
                            field,
                            reason.as_str()
                        );
                        metrics::reconcile::unbound_feature();
                        FeatureBinding { field: *field, source: None }
                    }
                }
            })
            .collect();

        (bindings, extra)
    }
}

/// Apply a fitted state to a table. Statistics are never recomputed; columns
/// the state expects but the table lacks are filled entirely by imputation.
pub fn transform(raw: &RawTable, state: &FittedState) -> TransformOutput {
    let table = raw.with_trimmed_names();
    let n_rows = table.n_rows();

    let labels = match table.column(&state.disposition_column) {
        Some(column) => map_labels(&column.cells, state.mission),
        None => match detect_mission(&table) {
            Ok((mission, name)) => table
                .column(&name)
                .map(|c| map_labels(&c.cells, mission))
                .unwrap_or_else(|| vec![Label::Unknown; n_rows]),
            Err(_) => vec![Label::Unknown; n_rows],
        },
    };

    let sources: Vec<Option<&str>> = CanonicalField::ALL
        .iter()
        .map(|field| state.binding(*field).and_then(|b| b.source.as_deref()))
        .collect();
    let raw_features: Vec<NumericColumn> = sources
        .iter()
        .map(|source| {
            source
                .and_then(|name| table.column(name))
                .map(numeric_column)
                .unwrap_or_else(|| vec![None; n_rows])
        })
        .collect();

    let raw_counts = quality_gate::raw_counts(&raw_features, n_rows);

    let filled: Vec<Vec<f64>> = sources
        .iter()
        .zip(&raw_features)
        .map(|(source, values)| match source {
            Some(name) => state.imputer.impute(name, values),
            None => vec![0.0; n_rows],
        })
        .collect();
    let rows = (0..n_rows)
        .map(|r| {
            let mut row = [0.0; N_FEATURES];
            for (i, column) in filled.iter().enumerate() {
                row[i] = column[r];
            }
            row
        })
        .collect();

    let ids = state
        .id_column
        .as_deref()
        .and_then(|name| table.column(name))
        .map(|column| column.cells.iter().map(|c| c.to_text()).collect());

    TransformOutput {
        features: FeatureMatrix::from_rows(rows),
        labels,
        ids,
        raw_counts,
    }
}

/// Coerce a column, restricting false-positive flag columns to 0, 1 or missing.
fn numeric_column(column: &Column) -> NumericColumn {
    let values = to_numeric(&column.cells);
    if column.name.to_lowercase().starts_with(constants::FLAG_PREFIX) {
        values
            .into_iter()
            .map(|v| v.filter(|x| *x == 0.0 || *x == 1.0))
            .collect()
    } else {
        values
    }
}

fn is_duplicate(table: &RawTable, name: &str) -> bool {
    constants::DUPLICATE_COLUMNS
        .iter()
        .any(|(backup, canonical)| name == *backup && table.has_column(canonical))
}

fn is_identifier_like(name: &str) -> bool {
    let lower = name.to_lowercase();
    constants::ID_LIKE
        .iter()
        .chain(constants::COMMENT_LIKE)
        .any(|marker| lower.contains(marker))
}
