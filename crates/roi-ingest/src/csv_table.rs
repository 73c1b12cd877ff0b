use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use roi_model::Table;

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim_matches('\u{feff}').to_string()
}

/// Read a flat CSV export into a [`Table`].
///
/// The first non-blank record is the header. Fully blank records are
/// dropped; trailing empty header cells and empty cells past the header width
/// (spreadsheet padding) are cut.
pub fn read_table(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Csv {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    read_table_from_reader(file, path)
}

/// Same as [`read_table`] for any reader; `origin` names the source in errors.
pub fn read_table_from_reader<R: Read>(reader: R, origin: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::Csv {
            path: origin.to_path_buf(),
            source: e,
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        match &headers {
            None => {
                let mut columns: Vec<String> = record.iter().map(normalize_header).collect();
                while columns.last().is_some_and(String::is_empty) {
                    columns.pop();
                }
                headers = Some(columns);
            }
            Some(columns) => {
                let mut row: Vec<String> = record.iter().map(normalize_cell).collect();
                while row.len() > columns.len() && row.last().is_some_and(|v| v.trim().is_empty())
                {
                    row.pop();
                }
                rows.push(row);
            }
        }
    }

    let columns = headers.unwrap_or_default();
    debug!(
        path = %origin.display(),
        columns = columns.len(),
        rows = rows.len(),
        "read csv table"
    );
    Table::new(columns, rows).map_err(|source| IngestError::Table {
        path: origin.to_path_buf(),
        source,
    })
}
