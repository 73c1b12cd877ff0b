//! Structural gate and per-cell type checks for one table.

use tracing::trace;

use roi_model::{
    CaseInsensitiveSet, Category, ColumnRef, FieldType, Finding, ModuleSchema, RowRef, Severity,
    Table,
};

use crate::dates::parse_date;
use crate::options::ValidationOptions;

pub const LEI_LENGTH: usize = 20;

/// Validate `table` against `schema`.
///
/// A table missing expected columns yields a single FATAL finding and no
/// cell findings. Otherwise cells are visited row by row, column by column.
pub fn validate_fields(
    table: &Table,
    schema: &ModuleSchema,
    options: &ValidationOptions,
) -> Vec<Finding> {
    let columns = table.column_lookup();
    if let Some(finding) = structural_gate(&columns, schema) {
        return vec![finding];
    }

    let types: Vec<FieldType> = table
        .columns()
        .iter()
        .map(|column| schema.field_type(column))
        .collect();
    let expiry: Vec<bool> = table
        .columns()
        .iter()
        .map(|column| schema.is_expiry(column))
        .collect();

    let mut findings = Vec::new();
    for row in 0..table.row_count() {
        for (index, column) in table.columns().iter().enumerate() {
            let Some(value) = table.cell(row, index) else {
                continue;
            };
            let finding = match types[index] {
                FieldType::Identifier => check_identifier(value, options),
                FieldType::Date => check_date(value, expiry[index], options),
                FieldType::Text | FieldType::Number => None,
            };
            if let Some((severity, message)) = finding {
                let category = match types[index] {
                    FieldType::Identifier => Category::Identifier,
                    _ => Category::Date,
                };
                trace!(row, column = %column, %severity, "cell finding");
                findings.push(Finding::cell(
                    severity,
                    category,
                    &schema.code,
                    row,
                    column,
                    message,
                ));
            }
        }
    }
    findings
}

fn structural_gate(columns: &CaseInsensitiveSet, schema: &ModuleSchema) -> Option<Finding> {
    let missing: Vec<&str> = schema
        .expected_fields()
        .filter(|field| !columns.contains(field))
        .collect();
    if missing.is_empty() {
        return None;
    }
    Some(Finding::new(
        Severity::Fatal,
        Category::Structure,
        &schema.code,
        RowRef::Header,
        ColumnRef::Table,
        format!(
            "Missing expected columns for {}: {}",
            schema.code,
            missing.join(", ")
        ),
    ))
}

/// True for a 20-character ASCII alphanumeric legal entity identifier.
pub fn is_valid_lei(value: &str) -> bool {
    value.len() == LEI_LENGTH && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn check_identifier(value: &str, options: &ValidationOptions) -> Option<(Severity, String)> {
    if options.exemptions.is_identifier_exempt(value) || is_valid_lei(value) {
        return None;
    }
    Some((
        Severity::Error,
        format!(
            "Invalid LEI '{value}': expected {LEI_LENGTH} alphanumeric characters, found length {}",
            value.chars().count()
        ),
    ))
}

fn check_date(
    value: &str,
    expiry: bool,
    options: &ValidationOptions,
) -> Option<(Severity, String)> {
    if options.exemptions.is_indefinite(value) {
        return None;
    }
    match parse_date(value) {
        Err(_) => Some((Severity::Error, format!("Invalid date '{value}'"))),
        Ok(date) if expiry && date < options.now => Some((
            Severity::Warning,
            format!(
                "Date {value} is expired (before {})",
                options.now.format("%Y-%m-%d")
            ),
        )),
        Ok(_) => None,
    }
}
