//! Register of Information audit engine.
//!
//! [`validate_batch`] is a pure function of tables, schemas, rules and the
//! reference instant: classify each table, validate its fields, run its
//! cross-column rules, then run cross-table rules over the whole batch and
//! aggregate everything into one report.

pub mod cross_column;
pub mod cross_table;
pub mod dates;
pub mod fields;
pub mod options;
pub mod report;
pub mod rules;
mod skip;

pub use cross_column::check_cross_column;
pub use cross_table::{TablesByModule, check_cross_table};
pub use dates::{DateParseError, parse_date};
pub use fields::{is_valid_lei, validate_fields};
pub use options::ValidationOptions;
pub use report::{aggregate, write_findings_csv, write_report_csv, write_report_json};
pub use rules::{Rule, RuleSet, load_rules};
pub use skip::RuleSkip;

use tracing::{info, info_span, warn};

use roi_ingest::{LoadFailure, LoadedBatch, detect_module};
use roi_model::{
    AuditReport, Category, ColumnRef, Finding, LabeledTable, ModuleCode, RowRef, Severity, Table,
};
use roi_standards::SchemaRegistry;

/// Validate one table already bound to `module`: field checks, rule notice,
/// cross-column rules.
pub fn validate_table(
    table: &Table,
    module: &ModuleCode,
    registry: &SchemaRegistry,
    rules: &RuleSet,
    options: &ValidationOptions,
) -> Vec<Finding> {
    let span = info_span!("table", module = %module, rows = table.row_count());
    let _enter = span.enter();

    let mut findings = match registry.get(module) {
        Some(schema) => validate_fields(table, schema, options),
        None => {
            warn!("module is not defined in the standards release");
            vec![Finding::notice(
                Severity::Info,
                Category::Compliance,
                module,
                format!(
                    "Module {module} is not defined in standards release {}; field checks skipped",
                    registry.release()
                ),
            )]
        }
    };

    let applicable = rules.count_for(module);
    if applicable > 0 {
        findings.push(Finding::notice(
            Severity::Info,
            Category::Compliance,
            module,
            format!("{applicable} custom rules apply to this module"),
        ));
    }

    findings.extend(check_cross_column(table, module, rules));
    findings
}

/// Validate a batch of labelled tables.
///
/// Tables whose label carries no module tag are discarded. When two tables
/// carry the same module both are validated, but only the first takes part
/// in cross-table checks.
pub fn validate_batch(
    tables: &[LabeledTable],
    registry: &SchemaRegistry,
    rules: &RuleSet,
    options: &ValidationOptions,
) -> AuditReport {
    run_batch(tables, &[], registry, rules, options)
}

/// Validate a loaded submission folder.
///
/// Files that could not be read come first in the report, one FATAL finding
/// each; the readable tables are validated as in [`validate_batch`].
pub fn validate_loaded_batch(
    batch: &LoadedBatch,
    registry: &SchemaRegistry,
    rules: &RuleSet,
    options: &ValidationOptions,
) -> AuditReport {
    run_batch(&batch.tables, &batch.failures, registry, rules, options)
}

/// FATAL/Structure finding for a file that never became a table.
pub fn load_failure_finding(failure: &LoadFailure) -> Finding {
    Finding::new(
        Severity::Fatal,
        Category::Structure,
        &failure.module,
        RowRef::Header,
        ColumnRef::Table,
        format!("Table {} could not be read: {}", failure.label, failure.error),
    )
}

fn run_batch(
    tables: &[LabeledTable],
    failures: &[LoadFailure],
    registry: &SchemaRegistry,
    rules: &RuleSet,
    options: &ValidationOptions,
) -> AuditReport {
    let span = info_span!("validate_batch", tables = tables.len(), rules = rules.len());
    let _enter = span.enter();

    let mut streams: Vec<Vec<Finding>> = Vec::with_capacity(tables.len() + 2);
    streams.push(failures.iter().map(load_failure_finding).collect());
    let mut by_module = TablesByModule::new();
    for labeled in tables {
        let Some(module) = detect_module(&labeled.label) else {
            info!(label = %labeled.label, "no module tag in label, table discarded");
            continue;
        };
        info!(label = %labeled.label, module = %module, "table classified");
        streams.push(validate_table(
            &labeled.table,
            &module,
            registry,
            rules,
            options,
        ));
        if by_module.contains_key(&module) {
            warn!(
                label = %labeled.label,
                module = %module,
                "duplicate module in batch, first table kept for cross-table checks"
            );
        } else {
            by_module.insert(module, &labeled.table);
        }
    }

    streams.push(check_cross_table(&by_module, rules));
    let report = aggregate(streams);
    info!(
        findings = report.summary.total,
        fatal = report.summary.count(Severity::Fatal),
        errors = report.summary.count(Severity::Error),
        warnings = report.summary.count(Severity::Warning),
        "audit complete"
    );
    report
}
