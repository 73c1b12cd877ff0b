#![allow(dead_code)]

use chrono::NaiveDate;

use roi_model::{FieldSpec, FieldType, ModuleCode, ModuleSchema, Table};
use roi_standards::SchemaRegistry;
use roi_validate::ValidationOptions;
use roi_validate::rules::{Operator, Rule, RuleKind, RuleSet};

pub const GOOD_LEI: &str = "ABCDEFGHIJ1234567890";

pub fn code(raw: &str) -> ModuleCode {
    ModuleCode::parse(raw).unwrap()
}

pub fn table<R: AsRef<[&'static str]>>(columns: &[&str], rows: &[R]) -> Table {
    Table::from_rows(columns, rows).unwrap()
}

pub fn options() -> ValidationOptions {
    ValidationOptions::default().as_of(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
}

pub fn registry() -> SchemaRegistry {
    let text = |id: &str| FieldSpec::new(id, FieldType::Text);
    let date = |id: &str| FieldSpec::new(id, FieldType::Date);
    let lei = |id: &str| FieldSpec::new(id, FieldType::Identifier);
    SchemaRegistry::from_modules(
        "test",
        [
            ModuleSchema::new(
                code("b_01.01"),
                "Entity maintaining the register",
                vec![
                    lei("c0010"),
                    text("c0020"),
                    text("c0030"),
                    text("c0040"),
                    text("c0050"),
                    date("c0060"),
                ],
            ),
            ModuleSchema::new(
                code("b_02.01"),
                "ICT third-party service providers",
                vec![
                    text("c0010"),
                    lei("c0020"),
                    text("c0030"),
                    FieldSpec::new("c0070", FieldType::Number).optional(),
                ],
            ),
            ModuleSchema::new(
                code("b_05.01"),
                "Contractual arrangements",
                vec![
                    text("c0010"),
                    text("c0020"),
                    text("c0030"),
                    date("c0040").expiry(),
                    date("c0050"),
                    date("c0060"),
                ],
            ),
        ],
    )
}

pub fn cross_col(source: &str, operator: &str, target: &str) -> Rule {
    Rule {
        kind: RuleKind::CrossCol,
        source_module: code("b_05.01"),
        source_column: source.to_string(),
        target_module: None,
        target_column: target.to_string(),
        operator: Operator::parse(operator),
        condition: None,
        severity: roi_model::Severity::Error,
        message: "Start date after end date".to_string(),
        group: "contracts".to_string(),
    }
}

pub fn renewal_rule() -> Rule {
    Rule {
        kind: RuleKind::Conditional,
        source_module: code("b_05.01"),
        source_column: "c0050".to_string(),
        target_module: None,
        target_column: "c0030".to_string(),
        operator: Operator::RequiredIf,
        condition: Some("Renewal".to_string()),
        severity: roi_model::Severity::Error,
        message: "Renewal date is required".to_string(),
        group: "contracts".to_string(),
    }
}

pub fn provider_rule() -> Rule {
    Rule {
        kind: RuleKind::CrossSheet,
        source_module: code("b_05.01"),
        source_column: "c0020".to_string(),
        target_module: Some(code("b_02.01")),
        target_column: "c0010".to_string(),
        operator: Operator::Subset,
        condition: None,
        severity: roi_model::Severity::Error,
        message: "Unknown ICT provider".to_string(),
        group: "integrity".to_string(),
    }
}

pub fn default_rules() -> RuleSet {
    RuleSet::from_rules(vec![
        cross_col("c0060", "<=", "c0040"),
        renewal_rule(),
        provider_rule(),
    ])
}

pub const CONTRACT_COLUMNS: [&str; 6] = ["c0010", "c0020", "c0030", "c0040", "c0050", "c0060"];
