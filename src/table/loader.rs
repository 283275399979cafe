//! Loading survey exports into a [`RawTable`].
//!
//! CSV exports from the exoplanet archive start with `#` comment lines and
//! occasionally contain broken rows; both are tolerated. Broken rows are
//! skipped and counted rather than failing the whole file. Spreadsheets are
//! read from their first sheet, whose first row is the header.

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{Cell, Column, RawTable};
use crate::error::{PrepError, Result};
use crate::observability::metrics;

/// Load a table, choosing the reader from the file extension.
pub fn load_path(path: &Path) -> Result<RawTable> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .ok_or_else(|| {
            PrepError::UnsupportedFormat(format!("'{}' has no extension", path.display()))
        })?;

    let table = match extension.as_str() {
        "csv" => from_csv_reader(File::open(path)?, b',')?,
        "tsv" => from_csv_reader(File::open(path)?, b'\t')?,
        "json" => from_json_str(&fs::read_to_string(path)?)?,
        "xlsx" | "xlsm" | "xls" => from_xlsx_path(path)?,
        other => {
            return Err(PrepError::UnsupportedFormat(format!(
                "'{}' (.{}); expected .csv, .tsv, .json or .xlsx",
                path.display(),
                other
            )))
        }
    };

    info!(
        "Loaded '{}': {} rows x {} columns",
        path.display(),
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}

/// Parse delimited text with a header row. `#` lines are comments; rows
/// wider than the header or not valid UTF-8 are skipped.
pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut skipped = 0usize;

    for (idx, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unreadable row {}: {}", idx, e);
                skipped += 1;
                continue;
            }
        };
        if record.len() > width {
            debug!(
                "Skipping row {}: {} fields for {} columns",
                idx,
                record.len(),
                width
            );
            skipped += 1;
            continue;
        }
        rows.push(record.iter().map(Cell::text).collect());
    }

    if skipped > 0 {
        warn!("Skipped {} malformed rows", skipped);
        metrics::loader::rows_skipped(skipped);
    }
    metrics::loader::rows_loaded(rows.len());

    RawTable::from_rows(headers, rows)
}

/// Read the first sheet of a workbook. Empty and error cells are missing;
/// numbers and booleans stay numeric.
pub fn from_xlsx_path(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or_else(|| {
        PrepError::MalformedTable(format!("workbook '{}' has no sheets", path.display()))
    })??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => Vec::new(),
    };
    let body: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(xlsx_cell).collect()).collect();

    metrics::loader::rows_loaded(body.len());
    RawTable::from_rows(headers, body)
}

fn xlsx_cell(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        Data::String(s) => Cell::text(s.as_str()),
        other => Cell::text(other.to_string()),
    }
}

/// Parse a JSON payload: either an array of records or an object mapping
/// column names to equally long arrays.
pub fn from_json_str(payload: &str) -> Result<RawTable> {
    let value: serde_json::Value = serde_json::from_str(payload)?;

    let table = match value {
        serde_json::Value::Array(records) => records_to_table(records)?,
        serde_json::Value::Object(map) => {
            let mut columns = Vec::with_capacity(map.len());
            for (name, values) in map {
                let values = match values {
                    serde_json::Value::Array(values) => values,
                    other => {
                        return Err(PrepError::MalformedTable(format!(
                            "column '{}' is not an array (found {})",
                            name,
                            json_kind(&other)
                        )))
                    }
                };
                columns.push(Column::new(name, values.into_iter().map(json_cell).collect()));
            }
            RawTable::new(columns)?
        }
        other => {
            return Err(PrepError::MalformedTable(format!(
                "expected an array of records or an object of columns, found {}",
                json_kind(&other)
            )))
        }
    };

    metrics::loader::rows_loaded(table.n_rows());
    Ok(table)
}

fn records_to_table(records: Vec<serde_json::Value>) -> Result<RawTable> {
    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());

    for (idx, record) in records.into_iter().enumerate() {
        match record {
            serde_json::Value::Object(map) => {
                for key in map.keys() {
                    if !headers.iter().any(|h| h == key) {
                        headers.push(key.clone());
                    }
                }
                objects.push(map);
            }
            other => {
                return Err(PrepError::MalformedTable(format!(
                    "record {} is {}, expected an object",
                    idx,
                    json_kind(&other)
                )))
            }
        }
    }

    let rows = objects
        .into_iter()
        .map(|mut map| {
            headers
                .iter()
                .map(|h| map.remove(h).map(json_cell).unwrap_or(Cell::Missing))
                .collect()
        })
        .collect();

    RawTable::from_rows(headers, rows)
}

fn json_cell(value: serde_json::Value) -> Cell {
    match value {
        serde_json::Value::Null => Cell::Missing,
        serde_json::Value::Bool(b) => Cell::Number(if b { 1.0 } else { 0.0 }),
        serde_json::Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Missing),
        serde_json::Value::String(s) => Cell::text(s),
        other => Cell::Text(other.to_string()),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
