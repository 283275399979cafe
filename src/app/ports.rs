use std::path::PathBuf;

use crate::app::inference::FeatureManifest;
use crate::app::prepare_use_case::RunMeta;
use crate::domain::{FeatureMatrix, Label};

/// Rows handed to an output port: features plus optional labels and identifiers,
/// all aligned by position.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRows<'a> {
    pub features: &'a FeatureMatrix,
    pub labels: Option<&'a [Label]>,
    pub ids: Option<&'a [Option<String>]>,
}

// Output side of the prepare use case
pub trait PrepareOutputPort: Send + Sync {
    /// Write one partition (`train`, `valid`, `candidates`) for the input `stem`.
    fn write_partition(&self, stem: &str, partition: &str, rows: FeatureRows<'_>) -> anyhow::Result<PathBuf>;

    fn write_meta(&self, stem: &str, meta: &RunMeta) -> anyhow::Result<PathBuf>;

    fn write_manifest(&self, stem: &str, manifest: &FeatureManifest) -> anyhow::Result<PathBuf>;
}
