//! Scoring incoming tables against an already trained classifier.
//!
//! An [`InferenceContext`] is built once at startup from the persisted
//! feature manifest and a classifier, then passed to every scoring call.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::domain::{CanonicalField, FeatureMatrix};
use crate::error::{PrepError, Result};
use crate::pipeline::{align, AlignConfig};
use crate::table::RawTable;

/// Ordered feature names a classifier was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureManifest {
    pub features: Vec<String>,
}

impl Default for FeatureManifest {
    fn default() -> Self {
        Self::canonical()
    }
}

impl FeatureManifest {
    /// Manifest listing the canonical features in canonical order.
    pub fn canonical() -> Self {
        Self {
            features: FeatureMatrix::column_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let manifest: FeatureManifest = serde_json::from_str(&content)?;
        manifest.fields()?;
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Canonical field for each listed name. Fails on unknown or repeated names.
    pub fn fields(&self) -> Result<Vec<CanonicalField>> {
        let mut fields = Vec::with_capacity(self.features.len());
        for name in &self.features {
            let field = CanonicalField::from_name(name).ok_or_else(|| {
                PrepError::Config(format!("manifest feature '{}' is not a canonical feature", name))
            })?;
            if fields.contains(&field) {
                return Err(PrepError::Config(format!(
                    "manifest lists feature '{}' twice",
                    name
                )));
            }
            fields.push(field);
        }
        if fields.is_empty() {
            return Err(PrepError::Config("manifest lists no features".to_string()));
        }
        Ok(fields)
    }
}

/// A trained binary classifier. Receives one row per object, columns in
/// manifest order, and returns the probability of the positive (confirmed)
/// class for each row.
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, rows: &[Vec<f64>]) -> anyhow::Result<Vec<f64>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    /// Row of the input table.
    pub row_index: usize,
    pub object_id: Option<String>,
    /// Feature values in manifest order.
    pub features: Vec<f64>,
    pub probability: f64,
    /// 1 for the most probable row.
    pub rank: usize,
}

pub struct InferenceContext {
    manifest: FeatureManifest,
    fields: Vec<CanonicalField>,
    classifier: Box<dyn Classifier>,
}

impl InferenceContext {
    pub fn new(manifest: FeatureManifest, classifier: Box<dyn Classifier>) -> Result<Self> {
        let fields = manifest.fields()?;
        Ok(Self {
            manifest,
            fields,
            classifier,
        })
    }

    pub fn manifest(&self) -> &FeatureManifest {
        &self.manifest
    }

    /// Align `table`, score every surviving row, and return the rows ordered
    /// by descending probability. Ties keep input order.
    pub fn score(&self, table: &RawTable, min_raw_nonnull: usize) -> anyhow::Result<Vec<ScoredRow>> {
        let batch = align(table, &AlignConfig { min_raw_nonnull })
            .context("Failed to align input table")?;

        let rows: Vec<Vec<f64>> = batch
            .features
            .rows()
            .iter()
            .map(|row| self.fields.iter().map(|f| row[f.index()]).collect())
            .collect();

        let probabilities = self.classifier.predict_proba(&rows)?;
        if probabilities.len() != rows.len() {
            bail!(
                "classifier returned {} probabilities for {} rows",
                probabilities.len(),
                rows.len()
            );
        }

        let mut scored: Vec<ScoredRow> = rows
            .into_iter()
            .zip(probabilities)
            .enumerate()
            .map(|(i, (features, probability))| ScoredRow {
                row_index: batch.row_indices[i],
                object_id: batch.ids.as_ref().and_then(|ids| ids[i].clone()),
                features,
                probability,
                rank: 0,
            })
            .collect();

        scored.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        for (i, row) in scored.iter_mut().enumerate() {
            row.rank = i + 1;
        }

        info!("Scored {} rows", scored.len());
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Column};

    /// Probability proportional to the first manifest feature.
    struct FirstFeature;

    impl Classifier for FirstFeature {
        fn predict_proba(&self, rows: &[Vec<f64>]) -> anyhow::Result<Vec<f64>> {
            Ok(rows.iter().map(|r| r[0] / 10.0).collect())
        }
    }

    struct Broken;

    impl Classifier for Broken {
        fn predict_proba(&self, _rows: &[Vec<f64>]) -> anyhow::Result<Vec<f64>> {
            Ok(vec![])
        }
    }

    fn col(name: &str, cells: &[&str]) -> Column {
        Column::new(name, cells.iter().map(|c| Cell::from(*c)).collect())
    }

    fn table() -> RawTable {
        RawTable::new(vec![
            col("kepoi_name", &["A", "B", "C", "D"]),
            col("koi_depth", &["2", "9", "", "5"]),
            col("koi_period", &["1", "1", "1", "1"]),
            col("koi_model_snr", &["3", "3", "", "3"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_score_ranks_by_probability() {
        let manifest = FeatureManifest {
            features: vec!["depth_ppm".into(), "period_d".into()],
        };
        let ctx = InferenceContext::new(manifest, Box::new(FirstFeature)).unwrap();
        let scored = ctx.score(&table(), 3).unwrap();

        let order: Vec<_> = scored.iter().map(|r| r.object_id.clone().unwrap()).collect();
        assert_eq!(order, vec!["B", "D", "A"]);
        assert_eq!(scored[0].rank, 1);
        assert_eq!(scored[0].row_index, 1);
        assert_eq!(scored[0].features, vec![9.0, 1.0]);
        assert_eq!(scored[2].probability, 0.2);
    }

    #[test]
    fn test_manifest_rejects_unknown_feature() {
        let manifest = FeatureManifest {
            features: vec!["koi_period".into()],
        };
        assert!(matches!(
            InferenceContext::new(manifest, Box::new(FirstFeature)),
            Err(PrepError::Config(_))
        ));
    }

    #[test]
    fn test_classifier_length_mismatch() {
        let ctx = InferenceContext::new(FeatureManifest::canonical(), Box::new(Broken)).unwrap();
        assert!(ctx.score(&table(), 3).is_err());
    }

    #[test]
    fn test_manifest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        FeatureManifest::canonical().save(&path).unwrap();
        assert_eq!(FeatureManifest::load(&path).unwrap(), FeatureManifest::canonical());
    }
}
