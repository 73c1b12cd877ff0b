#![deny(unsafe_code)]

use std::path::Path;

use roi_model::ModuleCode;

use super::CsvRows;
use crate::error::StandardsError;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ModuleMeta {
    pub code: ModuleCode,
    pub description: String,
}

/// Parse `Modules.csv` (`Module`, `Description`).
pub fn parse_modules_csv(path: &Path) -> Result<Vec<ModuleMeta>, StandardsError> {
    let rows = CsvRows::read(path)?;
    let mut results = Vec::new();
    for row in rows.rows() {
        if row.is_blank() {
            continue;
        }
        let raw = row.get("Module").ok_or_else(|| {
            StandardsError::csv(path, format!("line {}: missing Module", row.line))
        })?;
        let code = ModuleCode::parse(&raw)
            .map_err(|e| StandardsError::csv(path, format!("line {}: {e}", row.line)))?;
        results.push(ModuleMeta {
            code,
            description: row.get("Description").unwrap_or_default(),
        });
    }
    results.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(results)
}
