use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span, trace};

use roi_ingest::load_batch;
use roi_model::{AuditReport, Severity};
use roi_standards::{StandardsRegistry, VerifySummary, standards_root};
use roi_validate::rules::load_rules_with_default;
use roi_validate::{
    RuleSet, ValidationOptions, validate_loaded_batch, write_report_csv, write_report_json,
};

use crate::cli::{RulesArgs, ValidateArgs};
use crate::logging::redact_value;
use crate::summary::apply_table_style;
use crate::types::AuditRun;

pub const EXIT_CLEAN: i32 = 0;
pub const EXIT_FINDINGS: i32 = 1;
pub const EXIT_FAILURE: i32 = 2;

/// Exit status for a finished audit.
pub fn exit_code(report: &AuditReport, fail_on: Severity) -> i32 {
    if report.has_findings_at_least(fail_on) {
        EXIT_FINDINGS
    } else {
        EXIT_CLEAN
    }
}

fn resolve_standards_dir(standards_dir: Option<&Path>) -> PathBuf {
    standards_dir.map_or_else(standards_root, Path::to_path_buf)
}

fn load_standards(standards_dir: Option<&Path>) -> Result<(StandardsRegistry, VerifySummary)> {
    let dir = resolve_standards_dir(standards_dir);
    StandardsRegistry::verify_and_load(&dir)
        .with_context(|| format!("load standards from {}", dir.display()))
}

fn load_rule_set(standards_dir: Option<&Path>, rules: Option<&Path>) -> RuleSet {
    let default_rules = resolve_standards_dir(standards_dir).join("rules");
    load_rules_with_default(rules, &default_rules)
}

pub fn run_validate(args: &ValidateArgs, standards_dir: Option<&Path>) -> Result<AuditRun> {
    let span = info_span!("audit", folder = %args.folder.display());
    let _guard = span.enter();
    let start = Instant::now();

    let (standards, _) = load_standards(standards_dir)?;
    let rules = load_rule_set(standards_dir, args.rules.as_deref());
    let mut options =
        ValidationOptions::default().with_exemptions(standards.exemptions().clone());
    if let Some(date) = args.as_of {
        options = options.as_of(date);
    }

    let batch = load_batch(&args.folder)
        .with_context(|| format!("read submission folder {}", args.folder.display()))?;
    let report = validate_loaded_batch(&batch, &standards.schemas, &rules, &options);
    for finding in &report.findings {
        trace!(
            module = %finding.module,
            row = %finding.row,
            column = %finding.column,
            message = redact_value(&finding.message),
            "finding"
        );
    }

    let mut outputs = Vec::new();
    if !args.dry_run {
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| args.folder.join("audit"));
        if args.output.json() {
            outputs.push(write_report_json(&output_dir, &report, standards.release())?);
        }
        if args.output.csv() {
            outputs.push(write_report_csv(&output_dir, &report)?);
        }
    }

    info!(
        tables = batch.tables.len(),
        unreadable = batch.failures.len(),
        findings = report.len(),
        duration_ms = start.elapsed().as_millis(),
        "audit finished"
    );

    let descriptions = standards
        .schemas
        .modules()
        .map(|schema| (schema.code.clone(), schema.description.clone()))
        .collect();
    Ok(AuditRun {
        folder: args.folder.clone(),
        standards_release: standards.release().to_string(),
        tables: batch.tables.len(),
        unreadable: batch.failures.len(),
        rules: rules.len(),
        descriptions,
        report,
        outputs,
    })
}

pub fn run_modules(standards_dir: Option<&Path>) -> Result<()> {
    let (standards, _) = load_standards(standards_dir)?;
    let mut table = Table::new();
    table.set_header(vec!["Module", "Description", "Fields", "Expected", "Expiry"]);
    apply_table_style(&mut table);
    for schema in standards.schemas.modules() {
        table.add_row(vec![
            schema.code.to_string(),
            schema.description.clone(),
            schema.fields.len().to_string(),
            schema.expected_fields().count().to_string(),
            schema
                .fields
                .iter()
                .filter(|field| field.expiry)
                .map(|field| field.id.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ]);
    }
    println!("Standards release: {}", standards.release());
    println!("{table}");
    Ok(())
}

pub fn run_rules(args: &RulesArgs, standards_dir: Option<&Path>) -> Result<()> {
    let rules = load_rule_set(standards_dir, args.rules.as_deref());
    println!("{}", rules_table(&rules));
    Ok(())
}

/// One row per rule, in load order.
pub fn rules_table(rules: &RuleSet) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Group", "Type", "Source", "Operator", "Target", "Condition", "Severity", "Message",
    ]);
    apply_table_style(&mut table);
    for rule in rules {
        let target = match &rule.target_module {
            Some(module) => format!("{module}.{}", rule.target_column),
            None => rule.target_column.clone(),
        };
        table.add_row(vec![
            rule.group.clone(),
            rule.kind.to_string(),
            format!("{}.{}", rule.source_module, rule.source_column),
            rule.operator.to_string(),
            target,
            rule.condition.clone().unwrap_or_else(|| "-".to_string()),
            rule.severity.to_string(),
            rule.message.clone(),
        ]);
    }
    table
}

pub fn run_verify_standards(standards_dir: Option<&Path>) -> Result<()> {
    let (_, summary) = load_standards(standards_dir)?;
    println!("Standards: {}", summary.standards_dir.display());
    println!("Release: {}", summary.manifest_pins.release);
    println!(
        "Verified {} files: {} modules, {} fields ({} expiry), {} rule files",
        summary.file_count,
        summary.module_count,
        summary.field_count,
        summary.expiry_field_count,
        summary.rule_file_count
    );
    Ok(())
}
