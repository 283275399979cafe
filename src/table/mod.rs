//! In-memory survey tables.
//!
//! A [`RawTable`] is the source of truth handed to the pipeline: ordered,
//! named columns of heterogeneous cells. Nothing in the pipeline mutates one;
//! each stage builds new values from it.

pub mod loader;

pub use loader::{from_csv_reader, from_json_str, from_xlsx_path, load_path};

use crate::error::{PrepError, Result};

/// A single untyped or typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Text cell, or `Missing` when the text is blank.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Cell::Missing
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Render the cell as text, as written to output files.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            Cell::Number(v) => Some(v.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::text(s)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map(Cell::Number).unwrap_or(Cell::Missing)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }
}

/// Ordered collection of equally long named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl RawTable {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.cells.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.cells.len() != n_rows) {
            return Err(PrepError::MalformedTable(format!(
                "column '{}' has {} rows, expected {}",
                bad.name,
                bad.cells.len(),
                n_rows
            )));
        }
        Ok(Self { columns, n_rows })
    }

    /// Build from a header and row-major cells. Short rows are padded with
    /// `Missing`; long rows are rejected.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let width = headers.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|h| Column::new(h, Vec::with_capacity(rows.len())))
            .collect();

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(PrepError::MalformedTable(format!(
                    "row {} has {} fields, header has {}",
                    row_idx,
                    row.len(),
                    width
                )));
            }
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(cells.next().unwrap_or(Cell::Missing));
            }
        }

        Self::new(columns)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// First column with exactly this name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// First column whose trimmed, lower-cased name equals `name` trimmed and lower-cased.
    pub fn column_ci(&self, name: &str) -> Option<&Column> {
        let wanted = name.trim().to_lowercase();
        self.columns
            .iter()
            .find(|c| c.name.trim().to_lowercase() == wanted)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Copy of the table with whitespace trimmed from every column name.
    pub fn with_trimmed_names(&self) -> RawTable {
        RawTable {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.trim(), c.cells.clone()))
                .collect(),
            n_rows: self.n_rows,
        }
    }
}
