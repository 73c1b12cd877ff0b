//! CROSS_SHEET referential checks across the whole batch.
//!
//! Runs after every table has been validated on its own. A rule whose source
//! or target module is not in the batch is skipped silently, so removing
//! either side of a relationship never turns into an error.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use roi_model::{Category, Finding, ModuleCode, Table};

use crate::rules::{Rule, RuleSet};
use crate::skip::{RuleSkip, require_column};

/// Tables of one batch keyed by module code.
pub type TablesByModule<'a> = BTreeMap<ModuleCode, &'a Table>;

pub fn check_cross_table(tables: &TablesByModule<'_>, rules: &RuleSet) -> Vec<Finding> {
    let mut findings = Vec::new();
    for rule in rules.cross_sheet() {
        match evaluate(tables, rule) {
            Ok(rule_findings) => findings.extend(rule_findings),
            Err(skip) => debug!(
                group = %rule.group,
                source = %rule.source_module,
                reason = %skip,
                "cross-table rule skipped"
            ),
        }
    }
    findings
}

/// Evaluate one CROSS_SHEET rule.
pub fn evaluate(tables: &TablesByModule<'_>, rule: &Rule) -> Result<Vec<Finding>, RuleSkip> {
    let Some(target_module) = rule.target_module.as_ref() else {
        return Err(RuleSkip::UnsupportedOperator {
            kind: rule.kind.to_string(),
            operator: rule.operator.to_string(),
        });
    };
    let source_table = lookup(tables, &rule.source_module)?;
    let target_table = lookup(tables, target_module)?;
    let source = require_column(source_table, &rule.source_module, &rule.source_column)?;
    let target = require_column(target_table, target_module, &rule.target_column)?;

    let keys: BTreeSet<&str> = target_table.column_values(target).flatten().collect();
    let source_name = &source_table.columns()[source];
    let target_name = &target_table.columns()[target];

    let findings = source_table
        .column_values(source)
        .enumerate()
        .filter_map(|(row, value)| value.map(|value| (row, value)))
        .filter(|(_, value)| !keys.contains(value))
        .map(|(row, value)| {
            Finding::cell(
                rule.severity,
                Category::Integrity,
                &rule.source_module,
                row,
                source_name,
                format!(
                    "{}: '{value}' not found in {target_module}.{target_name}",
                    rule.render(value)
                ),
            )
        })
        .collect();
    Ok(findings)
}

fn lookup<'a>(tables: &TablesByModule<'a>, module: &ModuleCode) -> Result<&'a Table, RuleSkip> {
    tables
        .get(module)
        .copied()
        .ok_or_else(|| RuleSkip::MissingModule {
            module: module.clone(),
        })
}

