//! CSV rule sources.
//!
//! A source is a single CSV file or a directory of CSV files. Every file is
//! one named group (its file stem); groups are merged into one flat set.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use roi_model::{ModuleCode, Severity};
use roi_standards::default_rules_dir;

use super::RuleSet;
use super::model::{Operator, Rule, RuleKind};

/// A rule source that could not be read at all.
#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    #[error("failed to read rules {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list rule files in {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: roi_ingest::IngestError,
    },

    #[error("failed to parse rules CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("rules file {path} is missing column {column}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("no rule files found in {path}")]
    NoRuleFiles { path: PathBuf },
}

/// A single rule row that was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{group} line {line}: {message}")]
pub struct RuleError {
    pub group: String,
    pub line: usize,
    pub message: String,
}

/// Load the override source if it loads, else the bundled default rules.
///
/// Never fails: with no usable source the set is empty and rule-based checks
/// become no-ops.
pub fn load_rules(override_path: Option<&Path>) -> RuleSet {
    load_rules_with_default(override_path, &default_rules_dir())
}

/// [`load_rules`] with an explicit default source.
pub fn load_rules_with_default(override_path: Option<&Path>, default_source: &Path) -> RuleSet {
    if let Some(path) = override_path {
        match load_rule_source(path) {
            Ok(rules) => {
                info!(path = %path.display(), rules = rules.len(), "loaded override rules");
                return rules;
            }
            Err(error) => {
                warn!(%error, "override rules failed to load, falling back to bundled rules");
            }
        }
    }

    match load_rule_source(default_source) {
        Ok(rules) => {
            info!(path = %default_source.display(), rules = rules.len(), "loaded default rules");
            rules
        }
        Err(error) => {
            warn!(%error, "no usable rule source, rule-based checks disabled");
            RuleSet::empty()
        }
    }
}

/// Load a CSV file or every CSV file of a directory.
pub fn load_rule_source(path: &Path) -> Result<RuleSet, RuleLoadError> {
    let files = if path.is_dir() {
        let files =
            roi_ingest::list_csv_files(path).map_err(|source| RuleLoadError::Listing {
                path: path.to_path_buf(),
                source,
            })?;
        if files.is_empty() {
            return Err(RuleLoadError::NoRuleFiles {
                path: path.to_path_buf(),
            });
        }
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut rules = Vec::new();
    for file in &files {
        let group = file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("rules");
        rules.extend(load_rule_file(file, group)?);
    }
    Ok(RuleSet::from_rules(rules))
}

/// Columns are matched ignoring case, spaces and underscores.
fn header_key(raw: &str) -> String {
    raw.trim_matches('\u{feff}')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

struct Columns {
    rule_type: usize,
    source_module: usize,
    source_column: usize,
    target_module: Option<usize>,
    target_column: usize,
    operator: Option<usize>,
    condition: Option<usize>,
    severity: Option<usize>,
    message: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord, path: &Path) -> Result<Self, RuleLoadError> {
        let keys: Vec<String> = headers.iter().map(header_key).collect();
        let find = |names: &[&str]| keys.iter().position(|key| names.contains(&key.as_str()));
        let require = |names: &[&str], column: &str| {
            find(names).ok_or_else(|| RuleLoadError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })
        };
        Ok(Self {
            rule_type: require(&["ruletype", "type"], "Rule_Type")?,
            source_module: require(&["sourcemodule"], "Source_Module")?,
            source_column: require(&["sourcecolumn"], "Source_Column")?,
            target_module: find(&["targetmodule"]),
            target_column: require(&["targetcolumn"], "Target_Column")?,
            operator: find(&["operator"]),
            condition: find(&["conditionvalue", "condition"]),
            severity: find(&["severity"]),
            message: find(&["message"]),
        })
    }
}

/// Load one rule file as group `group`. Malformed rows are dropped with a warning.
pub fn load_rule_file(path: &Path, group: &str) -> Result<Vec<Rule>, RuleLoadError> {
    let bytes = std::fs::read(path).map_err(|source| RuleLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());
    let headers = reader
        .headers()
        .map_err(|source| RuleLoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let columns = Columns::locate(&headers, path)?;

    let mut rules = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|source| RuleLoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let line = index + 2;
        match parse_rule_row(&record, &columns, group, line) {
            Ok(rule) => rules.push(rule),
            Err(error) => warn!(%error, "skipping malformed rule row"),
        }
    }
    debug!(group, rules = rules.len(), "loaded rule group");
    Ok(rules)
}

fn parse_rule_row(
    record: &csv::StringRecord,
    columns: &Columns,
    group: &str,
    line: usize,
) -> Result<Rule, RuleError> {
    let fail = |message: String| RuleError {
        group: group.to_string(),
        line,
        message,
    };
    let cell = |index: usize| record.get(index).map(str::trim).unwrap_or("");
    let optional = |index: Option<usize>| {
        index
            .map(cell)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let raw_kind = cell(columns.rule_type);
    let kind =
        RuleKind::parse(raw_kind).ok_or_else(|| fail(format!("unknown rule type '{raw_kind}'")))?;
    let source_module = ModuleCode::parse(cell(columns.source_module))
        .map_err(|e| fail(format!("source module: {e}")))?;
    let source_column = required(cell(columns.source_column), "Source_Column", &fail)?;
    let target_column = required(cell(columns.target_column), "Target_Column", &fail)?;

    let target_module = match kind {
        RuleKind::CrossSheet => {
            let raw = optional(columns.target_module)
                .ok_or_else(|| fail("CROSS_SHEET rule without Target_Module".to_string()))?;
            Some(ModuleCode::parse(&raw).map_err(|e| fail(format!("target module: {e}")))?)
        }
        RuleKind::CrossCol | RuleKind::Conditional => None,
    };

    let raw_operator = optional(columns.operator);
    let operator = match (kind, raw_operator) {
        (RuleKind::CrossSheet, _) => Operator::Subset,
        (RuleKind::Conditional, None) => Operator::RequiredIf,
        (RuleKind::CrossCol, None) => {
            return Err(fail("CROSS_COL rule without Operator".to_string()));
        }
        (_, Some(raw)) => Operator::parse(&raw),
    };

    let severity = match optional(columns.severity) {
        None => Severity::Error,
        Some(raw) => {
            Severity::parse(&raw).ok_or_else(|| fail(format!("unknown severity '{raw}'")))?
        }
    };

    Ok(Rule {
        kind,
        source_module,
        source_column,
        target_module,
        target_column,
        operator,
        condition: optional(columns.condition),
        severity,
        message: optional(columns.message).unwrap_or_default(),
        group: group.to_string(),
    })
}

fn required(
    value: &str,
    column: &str,
    fail: &impl Fn(String) -> RuleError,
) -> Result<String, RuleError> {
    if value.is_empty() {
        Err(fail(format!("{column} is empty")))
    } else {
        Ok(value.to_string())
    }
}
