#![deny(unsafe_code)]

pub mod fields;
pub mod modules;

use std::path::Path;

use crate::error::StandardsError;

/// Header-addressed view of one standards CSV file.
pub(crate) struct CsvRows {
    headers: Vec<String>,
    records: Vec<csv::StringRecord>,
}

impl CsvRows {
    pub(crate) fn read(path: &Path) -> Result<Self, StandardsError> {
        let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes.as_slice());
        let headers = reader
            .headers()
            .map_err(|e| StandardsError::csv(path, e.to_string()))?
            .iter()
            .map(|h| h.trim_matches('\u{feff}').trim().to_string())
            .collect();
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StandardsError::csv(path, e.to_string()))?;
        Ok(Self { headers, records })
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = CsvRow<'_>> {
        self.records.iter().enumerate().map(|(index, record)| CsvRow {
            headers: &self.headers,
            record,
            line: index + 2,
        })
    }
}

pub(crate) struct CsvRow<'a> {
    headers: &'a [String],
    record: &'a csv::StringRecord,
    /// 1-based line in the file (header is line 1).
    pub(crate) line: usize,
}

impl CsvRow<'_> {
    /// Trimmed non-empty value of column `name`.
    pub(crate) fn get(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .and_then(|i| self.record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.record.iter().all(|value| value.trim().is_empty())
    }
}

/// `Y`/`YES`/`TRUE`/`1` style flags; empty takes `default`.
pub(crate) fn parse_flag(value: Option<&str>, default: bool) -> Option<bool> {
    let Some(value) = value else {
        return Some(default);
    };
    match value.trim().to_ascii_uppercase().as_str() {
        "Y" | "YES" | "TRUE" | "1" => Some(true),
        "N" | "NO" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}
