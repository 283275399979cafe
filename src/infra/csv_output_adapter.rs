use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::inference::FeatureManifest;
use crate::app::ports::{FeatureRows, PrepareOutputPort};
use crate::app::prepare_use_case::RunMeta;
use crate::constants::OBJECT_ID_COLUMN;
use crate::domain::FeatureMatrix;
use crate::pipeline::AlignedBatch;

/// File-based implementation of PrepareOutputPort
/// Writes `<STEM>_<partition>.csv`, `<STEM>_meta.json` and `<STEM>_features.json`
/// into one output directory.
pub struct CsvOutputAdapter {
    out_dir: PathBuf,
}

impl CsvOutputAdapter {
    pub fn new(out_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create output directory '{}'", out_dir.display()))?;
        info!("Writing prepared files to {}", out_dir.display());
        Ok(Self { out_dir })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl PrepareOutputPort for CsvOutputAdapter {
    fn write_partition(&self, stem: &str, partition: &str, rows: FeatureRows<'_>) -> anyhow::Result<PathBuf> {
        let path = self.out_dir.join(format!("{}_{}.csv", stem, partition));
        write_feature_csv(&path, rows)?;
        info!("Wrote {} rows to {}", rows.features.len(), path.display());
        Ok(path)
    }

    fn write_meta(&self, stem: &str, meta: &RunMeta) -> anyhow::Result<PathBuf> {
        let path = self.out_dir.join(format!("{}_meta.json", stem));
        fs::write(&path, serde_json::to_string_pretty(meta)?)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        Ok(path)
    }

    fn write_manifest(&self, stem: &str, manifest: &FeatureManifest) -> anyhow::Result<PathBuf> {
        let path = self.out_dir.join(format!("{}_features.json", stem));
        manifest
            .save(&path)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        Ok(path)
    }
}

/// Write features as CSV: `object_id` first when identifiers are given, the
/// canonical features, then a numeric `label` when labels are given.
pub fn write_feature_csv(path: &Path, rows: FeatureRows<'_>) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;

    let mut header: Vec<&str> = Vec::new();
    if rows.ids.is_some() {
        header.push(OBJECT_ID_COLUMN);
    }
    header.extend(FeatureMatrix::column_names());
    if rows.labels.is_some() {
        header.push("label");
    }
    writer.write_record(&header)?;

    for (i, values) in rows.features.rows().iter().enumerate() {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        if let Some(ids) = rows.ids {
            record.push(ids.get(i).cloned().flatten().unwrap_or_default());
        }
        record.extend(values.iter().map(|v| v.to_string()));
        if let Some(labels) = rows.labels {
            let code = labels.get(i).and_then(|l| l.code());
            record.push(code.map(|c| c.to_string()).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write an aligned inference batch, keeping the source row index.
pub fn write_aligned_csv(path: &Path, batch: &AlignedBatch) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;

    let mut header = vec!["row_index"];
    if batch.ids.is_some() {
        header.push(OBJECT_ID_COLUMN);
    }
    header.extend(FeatureMatrix::column_names());
    writer.write_record(&header)?;

    for (i, values) in batch.features.rows().iter().enumerate() {
        let mut record = vec![batch.row_indices[i].to_string()];
        if let Some(ids) = &batch.ids {
            record.push(ids[i].clone().unwrap_or_default());
        }
        record.extend(values.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    info!("Wrote {} aligned rows to {}", batch.len(), path.display());
    Ok(())
}
