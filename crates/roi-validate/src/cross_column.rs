//! CROSS_COL and CONDITIONAL rules within one table.

use tracing::{debug, trace};

use roi_model::{Category, Finding, ModuleCode, Table};

use crate::dates::parse_date;
use crate::rules::{Operator, Rule, RuleKind, RuleSet};
use crate::skip::{RuleSkip, require_column};

/// Run every cross-column rule of `module` against `table`.
pub fn check_cross_column(table: &Table, module: &ModuleCode, rules: &RuleSet) -> Vec<Finding> {
    let mut findings = Vec::new();
    for rule in rules.cross_column_for(module) {
        match evaluate(table, module, rule) {
            Ok(rule_findings) => findings.extend(rule_findings),
            Err(skip) => debug!(
                module = %module,
                group = %rule.group,
                kind = %rule.kind,
                source = %rule.source_column,
                target = %rule.target_column,
                reason = %skip,
                "rule skipped"
            ),
        }
    }
    findings
}

/// Evaluate one rule against one table.
pub fn evaluate(table: &Table, module: &ModuleCode, rule: &Rule) -> Result<Vec<Finding>, RuleSkip> {
    match rule.kind {
        RuleKind::CrossCol => compare_columns(table, module, rule),
        RuleKind::Conditional => required_if(table, module, rule),
        RuleKind::CrossSheet => Err(RuleSkip::UnsupportedOperator {
            kind: rule.kind.to_string(),
            operator: rule.operator.to_string(),
        }),
    }
}

fn compare_columns(
    table: &Table,
    module: &ModuleCode,
    rule: &Rule,
) -> Result<Vec<Finding>, RuleSkip> {
    if matches!(
        rule.operator,
        Operator::RequiredIf | Operator::Subset | Operator::Unsupported(_)
    ) {
        return Err(RuleSkip::UnsupportedOperator {
            kind: rule.kind.to_string(),
            operator: rule.operator.to_string(),
        });
    }
    let source = require_column(table, module, &rule.source_column)?;
    let target = require_column(table, module, &rule.target_column)?;
    let source_name = &table.columns()[source];
    let target_name = &table.columns()[target];

    let mut findings = Vec::new();
    for row in 0..table.row_count() {
        let (Some(left_raw), Some(right_raw)) = (table.cell(row, source), table.cell(row, target))
        else {
            continue;
        };
        let (Ok(left), Ok(right)) = (parse_date(left_raw), parse_date(right_raw)) else {
            trace!(row, "comparison operands are not both dates");
            continue;
        };
        if rule.operator.compare(&left, &right) == Some(false) {
            let message = format!(
                "{} [{source_name}={left_raw} must be {} {target_name}={right_raw}]",
                rule.render(left_raw),
                rule.operator
            );
            findings.push(Finding::cell(
                rule.severity,
                Category::CrossColumn,
                module,
                row,
                source_name,
                message,
            ));
        }
    }
    Ok(findings)
}

fn required_if(table: &Table, module: &ModuleCode, rule: &Rule) -> Result<Vec<Finding>, RuleSkip> {
    if rule.operator != Operator::RequiredIf {
        return Err(RuleSkip::UnsupportedOperator {
            kind: rule.kind.to_string(),
            operator: rule.operator.to_string(),
        });
    }
    let condition = rule
        .condition
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(RuleSkip::MissingCondition)?;
    let target = require_column(table, module, &rule.target_column)?;
    let target_name = table.columns()[target].as_str();
    // Absent source column: every triggered row lacks a value and the finding
    // points at the target column.
    let source = table.column_index(&rule.source_column);
    let finding_column = source.map_or(target_name, |index| table.columns()[index].as_str());

    let mut findings = Vec::new();
    for row in 0..table.row_count() {
        if table.cell(row, target) != Some(condition) {
            continue;
        }
        if source.and_then(|index| table.cell(row, index)).is_some() {
            continue;
        }
        let message = format!(
            "{} [required when {target_name} = '{condition}']",
            rule.render(condition)
        );
        findings.push(Finding::cell(
            rule.severity,
            Category::Conditional,
            module,
            row,
            finding_column,
            message,
        ));
    }
    Ok(findings)
}
