use roi_model::ModuleCode;

/// Why a rule produced no findings without being violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleSkip {
    #[error("column {column} not present in {module}")]
    MissingColumn { module: ModuleCode, column: String },

    #[error("module {module} not present in the batch")]
    MissingModule { module: ModuleCode },

    #[error("operator {operator} does not apply to {kind} rules")]
    UnsupportedOperator { kind: String, operator: String },

    #[error("REQUIRED_IF rule has no condition value")]
    MissingCondition,
}

/// Index of `name` in `table`, or the skip reason naming it.
pub(crate) fn require_column(
    table: &roi_model::Table,
    module: &ModuleCode,
    name: &str,
) -> Result<usize, RuleSkip> {
    table
        .column_index(name)
        .ok_or_else(|| RuleSkip::MissingColumn {
            module: module.clone(),
            column: name.to_string(),
        })
}
