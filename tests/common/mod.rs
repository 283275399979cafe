#![allow(dead_code)]

use exoprep::{Cell, Column, RawTable};

pub const KOI_FEATURE_COLUMNS: [&str; 8] = [
    "koi_period",
    "koi_duration",
    "koi_depth",
    "koi_model_snr",
    "koi_prad",
    "koi_steff",
    "koi_slogg",
    "koi_srad",
];

pub const TOI_FEATURE_COLUMNS: [&str; 8] = [
    "pl_orbper",
    "pl_trandurh",
    "pl_trandep",
    "snr",
    "pl_rade",
    "st_teff",
    "st_logg",
    "st_rad",
];

/// Deterministic, non-constant measurement for row `i`, feature `f`.
pub fn value(i: usize, f: usize) -> f64 {
    let base = [2.5, 3.1, 450.0, 12.0, 1.8, 5600.0, 4.4, 1.0][f];
    base + ((i * 7 + f * 3) % 11) as f64 * base / 20.0
}

pub fn dispositions(confirmed: usize, false_positive: usize, candidate: usize) -> Vec<String> {
    let mut out = Vec::new();
    out.extend(std::iter::repeat("CONFIRMED".to_string()).take(confirmed));
    out.extend(std::iter::repeat("FALSE POSITIVE".to_string()).take(false_positive));
    out.extend(std::iter::repeat("CANDIDATE".to_string()).take(candidate));
    out
}

/// A KOI export: identifier, disposition and the eight KOI feature columns.
pub fn koi_table(dispositions: &[String]) -> RawTable {
    let n = dispositions.len();
    let mut columns = vec![
        Column::new(
            "kepoi_name",
            (0..n).map(|i| Cell::Text(format!("K{:05}.01", i + 1))).collect(),
        ),
        Column::new(
            "koi_disposition",
            dispositions.iter().map(|d| Cell::text(d.as_str())).collect(),
        ),
    ];
    for (f, name) in KOI_FEATURE_COLUMNS.iter().enumerate() {
        columns.push(Column::new(
            *name,
            (0..n).map(|i| Cell::Text(value(i, f).to_string())).collect(),
        ));
    }
    RawTable::new(columns).unwrap()
}

/// The same measurements under TESS naming, without a disposition column.
pub fn toi_table(n: usize) -> RawTable {
    let columns = TOI_FEATURE_COLUMNS
        .iter()
        .enumerate()
        .map(|(f, name)| Column::new(*name, (0..n).map(|i| Cell::Number(value(i, f))).collect()))
        .collect();
    RawTable::new(columns).unwrap()
}
