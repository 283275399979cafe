use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::app::inference::FeatureManifest;
use crate::app::ports::{FeatureRows, PrepareOutputPort};
use crate::config::PrepConfig;
use crate::domain::Mission;
use crate::pipeline::processing::quality_gate::DropReason;
use crate::pipeline::{Preprocessor, SplitResult};
use crate::table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionSizes {
    pub train: usize,
    pub valid: usize,
    pub candidates: usize,
    pub incomplete: usize,
    pub unknown: usize,
}

/// Metadata written next to the prepared partitions of one input file.
#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub input_sha256: String,
    pub mission: Mission,
    pub disposition_column: String,
    pub id_column: Option<String>,
    pub kept_columns: Vec<String>,
    pub dropped_columns: Vec<(String, DropReason)>,
    /// Source column bound to each canonical feature.
    pub feature_sources: BTreeMap<String, Option<String>>,
    pub sizes: PartitionSizes,
    pub null_cut: f64,
    pub low_var_eps: f64,
    pub test_size: f64,
    pub random_state: u64,
    pub min_raw_nonnull: usize,
}

impl RunMeta {
    pub fn new(source: &Path, input_sha256: String, split: &SplitResult, config: &PrepConfig) -> Self {
        let state = &split.state;
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            source: source.display().to_string(),
            input_sha256,
            mission: state.mission,
            disposition_column: state.disposition_column.clone(),
            id_column: state.id_column.clone(),
            kept_columns: state.kept_columns.clone(),
            dropped_columns: state.dropped_columns.clone(),
            feature_sources: state
                .bindings
                .iter()
                .map(|b| (b.field.as_str().to_string(), b.source.clone()))
                .collect(),
            sizes: PartitionSizes {
                train: split.train_rows.len(),
                valid: split.valid_rows.len(),
                candidates: split.candidates.len(),
                incomplete: split.incomplete_rows,
                unknown: split.unknown_rows,
            },
            null_cut: config.null_pct_cut,
            low_var_eps: config.low_var_eps,
            test_size: config.test_size,
            random_state: config.random_state,
            min_raw_nonnull: config.min_raw_nonnull,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrepareReport {
    pub source: PathBuf,
    pub meta: RunMeta,
    pub outputs: Vec<PathBuf>,
}

/// Use case for turning raw survey exports into train / valid / candidate files
pub struct PrepareUseCase {
    preprocessor: Preprocessor,
    output: Box<dyn PrepareOutputPort>,
}

impl PrepareUseCase {
    pub fn new(config: PrepConfig, output: Box<dyn PrepareOutputPort>) -> Self {
        Self {
            preprocessor: Preprocessor::with_config(config),
            output,
        }
    }

    /// Prepare every existing file in `paths`. Missing files are skipped with
    /// a warning; any other failure stops the run.
    pub fn run(&self, paths: &[PathBuf]) -> Result<Vec<PrepareReport>> {
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.exists() {
                warn!("Input file '{}' not found, skipping", path.display());
                continue;
            }
            reports.push(self.prepare_file(path)?);
        }
        info!("Prepared {} of {} input files", reports.len(), paths.len());
        Ok(reports)
    }

    pub fn prepare_file(&self, path: &Path) -> Result<PrepareReport> {
        let span = info_span!("prepare", file = %path.display());
        let _enter = span.enter();

        let digest = file_sha256(path)
            .with_context(|| format!("Failed to hash '{}'", path.display()))?;
        let raw = table::load_path(path)
            .with_context(|| format!("Failed to load '{}'", path.display()))?;
        let split = self
            .preprocessor
            .fit_and_split(&raw)
            .with_context(|| format!("Failed to prepare '{}'", path.display()))?;

        let stem = output_stem(path);
        let meta = RunMeta::new(path, digest, &split, &self.preprocessor.config);

        let outputs = vec![
            self.output.write_partition(
                &stem,
                "train",
                FeatureRows {
                    features: &split.train_features,
                    labels: Some(split.train_labels.as_slice()),
                    ids: None,
                },
            )?,
            self.output.write_partition(
                &stem,
                "valid",
                FeatureRows {
                    features: &split.valid_features,
                    labels: Some(split.valid_labels.as_slice()),
                    ids: None,
                },
            )?,
            self.output.write_partition(
                &stem,
                "candidates",
                FeatureRows {
                    features: &split.candidates.features,
                    labels: None,
                    ids: split.candidates.ids.as_deref(),
                },
            )?,
            self.output.write_meta(&stem, &meta)?,
            self.output.write_manifest(&stem, &FeatureManifest::canonical())?,
        ];

        info!(
            "Processed '{}': mission {}, {} kept columns, {} train, {} valid, {} candidates",
            path.display(),
            meta.mission,
            meta.kept_columns.len(),
            meta.sizes.train,
            meta.sizes.valid,
            meta.sizes.candidates
        );

        Ok(PrepareReport {
            source: path.to_path_buf(),
            meta,
            outputs,
        })
    }
}

/// Upper-cased file stem used to name every output of one input.
pub fn output_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| "INPUT".to_string())
}

pub fn file_sha256(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOutput {
        partitions: Mutex<Vec<(String, String, usize, bool, bool)>>,
        metas: Mutex<Vec<RunMeta>>,
    }

    impl PrepareOutputPort for std::sync::Arc<RecordingOutput> {
        fn write_partition(&self, stem: &str, partition: &str, rows: FeatureRows<'_>) -> Result<PathBuf> {
            self.partitions.lock().unwrap().push((
                stem.to_string(),
                partition.to_string(),
                rows.features.len(),
                rows.labels.is_some(),
                rows.ids.is_some(),
            ));
            Ok(PathBuf::from(format!("{}_{}.csv", stem, partition)))
        }

        fn write_meta(&self, stem: &str, meta: &RunMeta) -> Result<PathBuf> {
            self.metas.lock().unwrap().push(meta.clone());
            Ok(PathBuf::from(format!("{}_meta.json", stem)))
        }

        fn write_manifest(&self, stem: &str, _manifest: &FeatureManifest) -> Result<PathBuf> {
            Ok(PathBuf::from(format!("{}_features.json", stem)))
        }
    }

    fn write_koi_csv(dir: &Path) -> PathBuf {
        let mut text = String::from("# archive export\nkepoi_name,koi_disposition,koi_period,koi_depth,koi_model_snr\n");
        for i in 0..30 {
            let disposition = match i % 3 {
                0 => "CONFIRMED",
                1 => "FALSE POSITIVE",
                _ => "CANDIDATE",
            };
            text.push_str(&format!("K{:05}.01,{},{},{},{}\n", i, disposition, i + 1, 10 * (i + 1), i % 7));
        }
        let path = dir.join("koi_cumulative.csv");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_prepare_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_koi_csv(dir.path());
        let output = std::sync::Arc::new(RecordingOutput::default());
        let use_case = PrepareUseCase::new(PrepConfig::default(), Box::new(output.clone()));

        let reports = use_case
            .run(&[input.clone(), dir.path().join("missing.csv")])
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outputs.len(), 5);
        let partitions = output.partitions.lock().unwrap();
        assert_eq!(partitions[0], ("KOI_CUMULATIVE".to_string(), "train".to_string(), 16, true, false));
        assert_eq!(partitions[1], ("KOI_CUMULATIVE".to_string(), "valid".to_string(), 4, true, false));
        assert_eq!(partitions[2], ("KOI_CUMULATIVE".to_string(), "candidates".to_string(), 10, false, true));

        let meta = &output.metas.lock().unwrap()[0];
        assert_eq!(meta.mission, Mission::Koi);
        assert_eq!(meta.input_sha256, file_sha256(&input).unwrap());
        assert_eq!(meta.input_sha256.len(), 64);
        assert_eq!(meta.feature_sources["period_d"].as_deref(), Some("koi_period"));
    }

    #[test]
    fn test_failing_file_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();
        let output = std::sync::Arc::new(RecordingOutput::default());
        let use_case = PrepareUseCase::new(PrepConfig::default(), Box::new(output));

        let err = use_case.run(&[path]).unwrap_err();
        assert!(format!("{:#}", err).contains("No disposition column found"));
    }

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem(Path::new("data/k2pandc.csv")), "K2PANDC");
    }
}
