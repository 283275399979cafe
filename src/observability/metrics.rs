//! Pipeline metrics
//!
//! Counters and histograms recorded through the `metrics` facade. The library
//! never installs a recorder, so every call is a no-op until the binary (or
//! an embedding service) calls [`init`].

use std::fmt;

/// Enum representing all metric names used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Loader metrics
    LoaderRowsLoaded,
    LoaderRowsSkipped,

    // Reconcile metrics
    ReconcileColumnsDropped,
    ReconcileFitDuration,
    ReconcileUnboundFeatures,

    // Quality gate metrics
    QualityGateRowsIncomplete,

    // Partition metrics
    PartitionLabels,
    PartitionRows,

    // Inference alignment metrics
    AlignRowsKept,
    AlignRowsDropped,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::LoaderRowsLoaded => "exoprep_loader_rows_loaded_total",
            MetricName::LoaderRowsSkipped => "exoprep_loader_rows_skipped_total",
            MetricName::ReconcileColumnsDropped => "exoprep_reconcile_columns_dropped_total",
            MetricName::ReconcileFitDuration => "exoprep_reconcile_fit_duration_seconds",
            MetricName::ReconcileUnboundFeatures => "exoprep_reconcile_unbound_features_total",
            MetricName::QualityGateRowsIncomplete => "exoprep_quality_gate_rows_incomplete_total",
            MetricName::PartitionLabels => "exoprep_partition_labels_total",
            MetricName::PartitionRows => "exoprep_partition_rows_total",
            MetricName::AlignRowsKept => "exoprep_align_rows_kept_total",
            MetricName::AlignRowsDropped => "exoprep_align_rows_dropped_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus recorder and return its handle for rendering.
pub fn init() -> Result<metrics_exporter_prometheus::PrometheusHandle, String> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))
}

// ============================================================================
// Loader Metrics
// ============================================================================

pub mod loader {
    use super::MetricName;

    pub fn rows_loaded(count: usize) {
        ::metrics::counter!(MetricName::LoaderRowsLoaded.as_str()).increment(count as u64);
    }

    /// Rows dropped by the loader as malformed
    pub fn rows_skipped(count: usize) {
        ::metrics::counter!(MetricName::LoaderRowsSkipped.as_str()).increment(count as u64);
    }
}

// ============================================================================
// Reconcile Metrics
// ============================================================================

pub mod reconcile {
    use super::MetricName;

    pub fn columns_dropped(reason: &'static str, count: usize) {
        ::metrics::counter!(MetricName::ReconcileColumnsDropped.as_str(), "reason" => reason)
            .increment(count as u64);
    }

    pub fn fit_duration(secs: f64) {
        ::metrics::histogram!(MetricName::ReconcileFitDuration.as_str()).record(secs);
    }

    pub fn unbound_feature() {
        ::metrics::counter!(MetricName::ReconcileUnboundFeatures.as_str()).increment(1);
    }
}

// ============================================================================
// Quality Gate Metrics
// ============================================================================

pub mod quality_gate {
    use super::MetricName;

    pub fn rows_incomplete(count: usize) {
        ::metrics::counter!(MetricName::QualityGateRowsIncomplete.as_str()).increment(count as u64);
    }
}

// ============================================================================
// Partition Metrics
// ============================================================================

pub mod partition {
    use super::MetricName;
    use crate::domain::Label;

    pub fn label_seen(label: Label) {
        ::metrics::counter!(MetricName::PartitionLabels.as_str(), "label" => label.as_str())
            .increment(1);
    }

    pub fn rows(partition: &'static str, count: usize) {
        ::metrics::counter!(MetricName::PartitionRows.as_str(), "partition" => partition)
            .increment(count as u64);
    }
}

// ============================================================================
// Alignment Metrics
// ============================================================================

pub mod align {
    use super::MetricName;

    pub fn rows_kept(count: usize) {
        ::metrics::counter!(MetricName::AlignRowsKept.as_str()).increment(count as u64);
    }

    pub fn rows_dropped(count: usize) {
        ::metrics::counter!(MetricName::AlignRowsDropped.as_str()).increment(count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed_and_unique() {
        let names = [
            MetricName::LoaderRowsLoaded,
            MetricName::LoaderRowsSkipped,
            MetricName::ReconcileColumnsDropped,
            MetricName::ReconcileFitDuration,
            MetricName::ReconcileUnboundFeatures,
            MetricName::QualityGateRowsIncomplete,
            MetricName::PartitionLabels,
            MetricName::PartitionRows,
            MetricName::AlignRowsKept,
            MetricName::AlignRowsDropped,
        ];
        let mut seen = std::collections::HashSet::new();
        for name in names {
            assert!(name.as_str().starts_with("exoprep_"));
            assert!(seen.insert(name.as_str()));
        }
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        loader::rows_loaded(10);
        reconcile::columns_dropped("sparse", 2);
        partition::label_seen(crate::domain::Label::Candidate);
    }
}
