//! Inference-time feature alignment.
//!
//! Turns an arbitrary incoming table into canonical features without any
//! fitted state: columns are matched by canonical name or alias, sparse rows
//! are dropped, and gaps are filled with medians of the batch itself.

use tracing::{info, warn};

use crate::config::PrepConfig;
use crate::constants;
use crate::domain::{CanonicalField, FeatureMatrix, N_FEATURES};
use crate::error::{PrepError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::coerce::{to_numeric, NumericColumn};
use crate::pipeline::processing::quality_gate::{complete_rows, median, raw_counts};
use crate::pipeline::processing::resolve::resolve_field;
use crate::table::RawTable;

#[derive(Debug, Clone, PartialEq)]
pub struct AlignConfig {
    pub min_raw_nonnull: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self { min_raw_nonnull: 3 }
    }
}

impl From<&PrepConfig> for AlignConfig {
    fn from(config: &PrepConfig) -> Self {
        Self {
            min_raw_nonnull: config.min_raw_nonnull,
        }
    }
}

/// Aligned rows; `row_indices` maps each row back to the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedBatch {
    pub row_indices: Vec<usize>,
    pub features: FeatureMatrix,
    pub ids: Option<Vec<Option<String>>>,
}

impl AlignedBatch {
    pub fn len(&self) -> usize {
        self.row_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_indices.is_empty()
    }
}

/// Raw canonical columns of `table`: taken by exact name when the table
/// already carries the whole canonical set, otherwise resolved per field.
pub fn canonical_columns(table: &RawTable) -> Vec<NumericColumn> {
    let table = table.with_trimmed_names();
    let exact: Option<Vec<NumericColumn>> = CanonicalField::ALL
        .iter()
        .map(|field| table.column(field.as_str()).map(|c| to_numeric(&c.cells)))
        .collect();

    match exact {
        Some(columns) => columns,
        None => CanonicalField::ALL
            .iter()
            .map(|field| resolve_field(&table, *field))
            .collect(),
    }
}

pub fn align(table: &RawTable, config: &AlignConfig) -> Result<AlignedBatch> {
    if table.n_rows() == 0 {
        return Err(PrepError::InsufficientData("input table has no rows".to_string()));
    }

    let columns = canonical_columns(table);
    let counts = raw_counts(&columns, table.n_rows());
    let kept = complete_rows(&counts, config.min_raw_nonnull)?;

    let mut fills = [0.0; N_FEATURES];
    for (i, field) in CanonicalField::ALL.iter().enumerate() {
        let surviving: Vec<Option<f64>> = kept.iter().map(|&r| columns[i][r]).collect();
        fills[i] = match median(&surviving) {
            Some(m) => m,
            None => {
                warn!("{} is missing in every row; imputing 0", field);
                0.0
            }
        };
    }

    let rows = kept
        .iter()
        .map(|&r| {
            let mut row = [0.0; N_FEATURES];
            for (i, column) in columns.iter().enumerate() {
                row[i] = column[r].unwrap_or(fills[i]);
            }
            row
        })
        .collect();

    let ids = id_column(table).map(|cells| kept.iter().map(|&r| cells[r].clone()).collect());

    let dropped = table.n_rows() - kept.len();
    metrics::align::rows_kept(kept.len());
    if dropped > 0 {
        metrics::align::rows_dropped(dropped);
    }
    info!("Aligned {} rows ({} dropped)", kept.len(), dropped);

    Ok(AlignedBatch {
        row_indices: kept,
        features: FeatureMatrix::from_rows(rows),
        ids,
    })
}

fn id_column(table: &RawTable) -> Option<Vec<Option<String>>> {
    std::iter::once(constants::OBJECT_ID_COLUMN)
        .chain(constants::HUMAN_ID_CANDIDATES.iter().copied())
        .find_map(|name| table.column_ci(name))
        .map(|column| column.cells.iter().map(|c| c.to_text()).collect())
}
