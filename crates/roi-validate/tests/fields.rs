mod common;

use proptest::prelude::*;

use common::{CONTRACT_COLUMNS, GOOD_LEI, code, options, registry, table};
use roi_model::{Category, ColumnRef, RowRef, Severity};
use roi_validate::{is_valid_lei, validate_fields};

#[test]
fn missing_columns_yield_one_fatal_finding() {
    let registry = registry();
    let schema = registry.get(&code("b_01.01")).unwrap();
    // Bad values everywhere: the field loop must not run.
    let table = table(&["c0010", "C0020"], &[["BAD", "x"], ["ALSO BAD", "y"]]);

    let findings = validate_fields(&table, schema, &options());

    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.severity, Severity::Fatal);
    assert_eq!(finding.category, Category::Structure);
    assert_eq!(finding.row, RowRef::Header);
    assert_eq!(finding.column, ColumnRef::Table);
    assert_eq!(
        finding.message,
        "Missing expected columns for b_01.01: c0030, c0040, c0050, c0060"
    );
}

#[test]
fn column_matching_ignores_case() {
    let registry = registry();
    let schema = registry.get(&code("b_02.01")).unwrap();
    let table = table(&["C0010", "C0020", "C0030"], &[["P-1", GOOD_LEI, "Cloud Co"]]);

    assert!(validate_fields(&table, schema, &options()).is_empty());
}

#[test]
fn identifier_length_is_reported() {
    let registry = registry();
    let schema = registry.get(&code("b_02.01")).unwrap();
    let table = table(
        &["c0010", "c0020", "c0030"],
        &[["P-1", GOOD_LEI, "A"], ["P-2", "ABC123", "B"]],
    );

    let findings = validate_fields(&table, schema, &options());

    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.category, Category::Identifier);
    assert_eq!(finding.row, RowRef::Row(3));
    assert_eq!(finding.column, ColumnRef::field("c0020"));
    assert!(finding.message.contains("ABC123"));
    assert!(finding.message.contains('6'));
}

#[test]
fn identifier_placeholders_are_exempt() {
    let registry = registry();
    let schema = registry.get(&code("b_02.01")).unwrap();
    let table = table(
        &["c0010", "c0020", "c0030"],
        &[["P-1", "Not applicable", "A"], ["P-2", "EBA_GA:LU", "B"], ["P-3", "", "C"]],
    );

    assert!(validate_fields(&table, schema, &options()).is_empty());
}

#[test]
fn past_expiry_date_is_a_warning() {
    let registry = registry();
    let schema = registry.get(&code("b_05.01")).unwrap();
    let table = table(
        &CONTRACT_COLUMNS,
        &[["C-1", "P-1", "Active", "2020-01-01", "", "2019-01-01"]],
    );

    let findings = validate_fields(&table, schema, &options());

    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.severity, Severity::Warning);
    assert_eq!(finding.category, Category::Date);
    assert_eq!(finding.column, ColumnRef::field("c0040"));
    assert!(finding.message.contains("expired"));
}

#[test]
fn past_date_on_plain_date_field_is_fine() {
    let registry = registry();
    let schema = registry.get(&code("b_05.01")).unwrap();
    let table = table(
        &CONTRACT_COLUMNS,
        &[["C-1", "P-1", "Active", "31/12/2030", "01.01.2001", "2001-01-01"]],
    );

    assert!(validate_fields(&table, schema, &options()).is_empty());
}

#[test]
fn unparseable_and_indefinite_dates() {
    let registry = registry();
    let schema = registry.get(&code("b_05.01")).unwrap();
    let table = table(
        &CONTRACT_COLUMNS,
        &[
            ["C-1", "P-1", "Active", "Indefinite", "soon", "2024-13-01"],
            ["C-2", "P-1", "Active", "open-ended term", "", ""],
        ],
    );

    let findings = validate_fields(&table, schema, &options());

    let cells: Vec<_> = findings
        .iter()
        .map(|f| (f.row.to_string(), f.column.to_string(), f.severity))
        .collect();
    assert_eq!(
        cells,
        vec![
            ("2".to_string(), "c0050".to_string(), Severity::Error),
            ("2".to_string(), "c0060".to_string(), Severity::Error),
        ]
    );
    assert_eq!(findings[0].message, "Invalid date 'soon'");
}

#[test]
fn expiry_compares_against_reference_instant() {
    let registry = registry();
    let schema = registry.get(&code("b_05.01")).unwrap();
    let table = table(
        &CONTRACT_COLUMNS,
        &[
            ["C-1", "P-1", "Active", "2024-06-29", "", ""],
            ["C-2", "P-1", "Active", "2024-06-30", "", ""],
            ["C-3", "P-1", "Active", "2024-07-01", "", ""],
        ],
    );

    let findings = validate_fields(&table, schema, &options());

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].row, RowRef::Row(2));
}

#[test]
fn undeclared_and_number_columns_are_not_checked() {
    let registry = registry();
    let schema = registry.get(&code("b_02.01")).unwrap();
    let table = table(
        &["c0010", "c0020", "c0030", "c0070", "notes"],
        &[["P-1", GOOD_LEI, "A", "lots", "2024-99-99"]],
    );

    assert!(validate_fields(&table, schema, &options()).is_empty());
}

proptest! {
    #[test]
    fn identifier_finding_iff_not_lei(value in "[A-Za-z0-9 _-]{1,25}") {
        prop_assume!(!value.trim().is_empty());
        prop_assume!(!value.trim().to_lowercase().starts_with("eba_"));
        prop_assume!(!value.trim().eq_ignore_ascii_case("not applicable"));

        let registry = registry();
        let schema = registry.get(&code("b_02.01")).unwrap();
        let table = roi_model::Table::new(
            vec!["c0010".into(), "c0020".into(), "c0030".into()],
            vec![vec!["P-1".into(), value.clone(), "A".into()]],
        )
        .unwrap();

        let findings = validate_fields(&table, schema, &options());
        let trimmed = value.trim();
        prop_assert_eq!(findings.len() == 1, !is_valid_lei(trimmed));
        prop_assert_eq!(
            !findings.is_empty(),
            trimmed.len() != 20 || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        );
    }

    #[test]
    fn validation_is_idempotent(
        rows in prop::collection::vec(
            prop::collection::vec("[A-Z0-9/.-]{0,22}", 6),
            0..8,
        )
    ) {
        let registry = registry();
        let schema = registry.get(&code("b_05.01")).unwrap();
        let table = roi_model::Table::new(
            common::CONTRACT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        )
        .unwrap();
        let options = options();

        let first = validate_fields(&table, schema, &options);
        let second = validate_fields(&table, schema, &options);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn missing_any_expected_column_is_fatal_only(drop in 0usize..6) {
        let registry = registry();
        let schema = registry.get(&code("b_05.01")).unwrap();
        let columns: Vec<String> = CONTRACT_COLUMNS
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != drop)
            .map(|(_, c)| c.to_string())
            .collect();
        let row = vec!["not a date".to_string(); columns.len()];
        let table = roi_model::Table::new(columns, vec![row]).unwrap();

        let findings = validate_fields(&table, schema, &options());
        prop_assert_eq!(findings.len(), 1);
        prop_assert_eq!(findings[0].severity, Severity::Fatal);
        prop_assert_eq!(findings[0].category, Category::Structure);
    }
}
