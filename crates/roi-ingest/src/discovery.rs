//! Folder discovery and module classification.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use roi_model::{LabeledTable, ModuleCode};

use crate::classifier::detect_module;
use crate::csv_table::read_table;
use crate::error::{IngestError, Result};

/// A CSV file found in a submission folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// File stem, used as the table label.
    pub label: String,
    pub module: Option<ModuleCode>,
}

/// Lists all CSV files in a directory, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Lists CSV files in `dir` and classifies each by its file stem.
pub fn discover_files(dir: &Path) -> Result<Vec<DiscoveredFile>> {
    let files = list_csv_files(dir)?;
    Ok(files
        .into_iter()
        .map(|path| {
            let label = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default()
                .to_string();
            let module = detect_module(&label);
            DiscoveredFile {
                path,
                label,
                module,
            }
        })
        .collect())
}

/// A classified file that could not be read into a table.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub label: String,
    pub module: ModuleCode,
    pub error: IngestError,
}

/// Tables read from a submission folder and the classified files that failed.
#[derive(Debug, Default)]
pub struct LoadedBatch {
    pub tables: Vec<LabeledTable>,
    pub failures: Vec<LoadFailure>,
}

/// Read every classified CSV file in `dir`. Unclassified files are skipped.
///
/// A file that cannot be read is recorded in [`LoadedBatch::failures`] and
/// the remaining files are still loaded. Only folder-level problems are
/// returned as errors.
pub fn load_batch(dir: &Path) -> Result<LoadedBatch> {
    let mut batch = LoadedBatch::default();
    for file in discover_files(dir)? {
        let Some(module) = file.module else {
            info!(path = %file.path.display(), "no module tag in file name, skipping");
            continue;
        };
        match read_table(&file.path) {
            Ok(table) => batch.tables.push(LabeledTable::new(file.label, table)),
            Err(error) => {
                warn!(
                    path = %file.path.display(),
                    module = %module,
                    %error,
                    "table could not be read, continuing with the rest of the folder"
                );
                batch.failures.push(LoadFailure {
                    path: file.path,
                    label: file.label,
                    module,
                    error,
                });
            }
        }
    }
    info!(
        dir = %dir.display(),
        tables = batch.tables.len(),
        failures = batch.failures.len(),
        "loaded submission folder"
    );
    Ok(batch)
}
