use std::collections::BTreeMap;
use std::path::PathBuf;

use roi_model::{AuditReport, ModuleCode};

/// Outcome of one `validate` run.
#[derive(Debug)]
pub struct AuditRun {
    pub folder: PathBuf,
    pub standards_release: String,
    /// Tables read from the folder (classified files only).
    pub tables: usize,
    /// Classified files that could not be read.
    pub unreadable: usize,
    pub rules: usize,
    pub descriptions: BTreeMap<ModuleCode, String>,
    pub report: AuditReport,
    pub outputs: Vec<PathBuf>,
}
