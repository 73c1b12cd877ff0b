#![deny(unsafe_code)]

use std::path::Path;

use roi_model::{FieldSpec, FieldType, ModuleCode};

use super::{CsvRows, parse_flag};
use crate::error::StandardsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    pub module: ModuleCode,
    pub order: u32,
    pub spec: FieldSpec,
}

/// Parse `Fields.csv`.
///
/// Columns: `Module`, `Field`, `Label`, `Type`, `Expected` (Y/N, default Y),
/// `Expiry` (Y/N, default N), `Order`. Rows without `Order` keep file order.
pub fn parse_fields_csv(path: &Path) -> Result<Vec<FieldMeta>, StandardsError> {
    let rows = CsvRows::read(path)?;
    let mut results = Vec::new();
    for row in rows.rows() {
        if row.is_blank() {
            continue;
        }
        let line = row.line;
        let fail = |message: String| StandardsError::csv(path, format!("line {line}: {message}"));

        let module = row
            .get("Module")
            .ok_or_else(|| fail("missing Module".to_string()))
            .and_then(|raw| ModuleCode::parse(&raw).map_err(|e| fail(e.to_string())))?;
        let id = row
            .get("Field")
            .ok_or_else(|| fail("missing Field".to_string()))?
            .to_ascii_lowercase();
        let field_type = row
            .get("Type")
            .unwrap_or_default()
            .parse::<FieldType>()
            .map_err(|e| fail(e.to_string()))?;
        let expected = parse_flag(row.get("Expected").as_deref(), true)
            .ok_or_else(|| fail("Expected must be Y or N".to_string()))?;
        let expiry = parse_flag(row.get("Expiry").as_deref(), false)
            .ok_or_else(|| fail("Expiry must be Y or N".to_string()))?;
        if expiry && field_type != FieldType::Date {
            return Err(fail(format!("expiry field {id} must be DATE")));
        }
        let order = match row.get("Order") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| fail(format!("invalid Order '{raw}'")))?,
            None => u32::try_from(line).unwrap_or(u32::MAX),
        };

        let mut spec = FieldSpec::new(id, field_type);
        spec.label = row.get("Label");
        spec.expected = expected;
        spec.expiry = expiry;
        results.push(FieldMeta {
            module,
            order,
            spec,
        });
    }
    Ok(results)
}
