use std::collections::HashSet;

use crate::error::{ModelError, Result};
use crate::lookup::CaseInsensitiveSet;

/// Rectangular string dataset as handed over by a loader.
///
/// Rows may be shorter than the header; missing trailing cells are absent
/// values. Empty strings and absent cells both read as "no value".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.trim().to_ascii_uppercase()) {
                return Err(ModelError::DuplicateColumn(column.clone()));
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() > columns.len() {
                return Err(ModelError::RaggedRow {
                    row: idx,
                    found: row.len(),
                    expected: columns.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Build a table from string slices; handy for fixtures.
    pub fn from_rows<C, R>(columns: &[C], rows: &[R]) -> Result<Self>
    where
        C: AsRef<str>,
        R: AsRef<[&'static str]>,
    {
        Self::new(
            columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows.iter()
                .map(|row| row.as_ref().iter().map(|v| (*v).to_string()).collect())
                .collect(),
        )
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_lookup(&self) -> CaseInsensitiveSet {
        CaseInsensitiveSet::new(&self.columns)
    }

    /// Index of `name`, ignoring ASCII case and surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.columns
            .iter()
            .position(|column| column.trim().eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Trimmed cell value, `None` when empty or absent.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(column)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Values of one column in row order, `None` for empty cells.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, column))
    }
}

/// A table together with the label it arrived under (file name, sheet name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTable {
    pub label: String,
    pub table: Table,
}

impl LabeledTable {
    pub fn new(label: impl Into<String>, table: Table) -> Self {
        Self {
            label: label.into(),
            table,
        }
    }
}
