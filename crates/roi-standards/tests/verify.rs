use std::fs;
use std::path::Path;

use roi_model::{FieldType, ModuleCode};
use roi_standards::hash::sha256_hex;
use roi_standards::{StandardsError, StandardsRegistry, standards_root};

const MODULES_CSV: &str = "Module,Description\nb_05.01,Contractual arrangements\nb_02.01,ICT providers\n";

const FIELDS_CSV: &str = "\
Module,Field,Label,Type,Expected,Expiry,Order
b_05.01,c0020,Provider,TEXT,Y,N,20
b_05.01,c0010,Contract,TEXT,Y,N,10
b_05.01,c0040,End date,DATE,Y,Y,40
b_05.01,c0070,Cost,NUMBER,N,N,70
b_02.01,c0010,Provider,TEXT,Y,N,10
b_02.01,C0020,LEI,IDENTIFIER,,,20
";

fn write(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn sha(path: &Path) -> String {
    sha256_hex(&fs::read(path).unwrap())
}

fn write_bundle(dir: &Path, fields_csv: &str) {
    write(&dir.join("roi/v9_9/Modules.csv"), MODULES_CSV.as_bytes());
    write(&dir.join("roi/v9_9/Fields.csv"), fields_csv.as_bytes());
    write(
        &dir.join("rules/contracts.csv"),
        b"Rule_Type,Source_Module,Source_Column,Target_Module,Target_Column,Operator,Condition_Value,Severity,Message\n",
    );
    write_manifest(dir);
}

fn write_manifest(dir: &Path) {
    let manifest = format!(
        r#"[manifest]
schema = "roi-audit.standards-manifest"
schema_version = 1

[pins]
release = "v9_9"

[exemptions]
identifier_placeholders = ["n/a"]

[[files]]
path = "roi/v9_9/Modules.csv"
sha256 = "{}"
kind = "csv"
role = "modules"

[[files]]
path = "roi/v9_9/Fields.csv"
sha256 = "{}"
kind = "csv"
role = "fields"

[[files]]
path = "rules/contracts.csv"
sha256 = "{}"
kind = "csv"
role = "rules.contracts"
"#,
        sha(&dir.join("roi/v9_9/Modules.csv")),
        sha(&dir.join("roi/v9_9/Fields.csv")),
        sha(&dir.join("rules/contracts.csv")),
    );
    write(&dir.join("manifest.toml"), manifest.as_bytes());
}

fn code(raw: &str) -> ModuleCode {
    ModuleCode::parse(raw).unwrap()
}

#[test]
fn verify_and_load_builds_ordered_schemas() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), FIELDS_CSV);

    let (registry, summary) = StandardsRegistry::verify_and_load(dir.path()).unwrap();

    assert_eq!(summary.module_count, 2);
    assert_eq!(summary.field_count, 6);
    assert_eq!(summary.expiry_field_count, 1);
    assert_eq!(summary.rule_file_count, 1);
    assert_eq!(registry.release(), "v9_9");

    let contracts = registry.schemas.get(&code("b_05.01")).unwrap();
    let expected: Vec<_> = contracts.expected_fields().collect();
    assert_eq!(expected, vec!["c0010", "c0020", "c0040"]);
    assert!(contracts.is_expiry("C0040"));
    assert_eq!(contracts.field_type("c0070"), FieldType::Number);
    assert_eq!(contracts.field_type("c9999"), FieldType::Text);

    let providers = registry.schemas.get(&code("b_02.01")).unwrap();
    let lei = providers.field("c0020").unwrap();
    assert_eq!(lei.id, "c0020");
    assert_eq!(lei.field_type, FieldType::Identifier);
    assert!(lei.expected);
    assert!(!lei.expiry);

    // Partial exemption tables keep the remaining defaults.
    let exemptions = registry.exemptions();
    assert!(exemptions.is_identifier_exempt("N/A"));
    assert!(!exemptions.is_identifier_exempt("not applicable"));
    assert!(exemptions.is_identifier_exempt("EBA_XX"));
    assert!(exemptions.is_indefinite("Indeterminate"));
}

#[test]
fn tampered_file_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), FIELDS_CSV);
    write(
        &dir.path().join("roi/v9_9/Fields.csv"),
        b"Module,Field,Type\nb_05.01,c0010,TEXT\n",
    );

    let err = StandardsRegistry::verify_and_load(dir.path()).unwrap_err();
    assert!(matches!(err, StandardsError::Sha256Mismatch { .. }), "{err}");
}

#[test]
fn unlisted_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), FIELDS_CSV);
    write(&dir.path().join("rules/extra.csv"), b"Rule_Type\n");

    let err = StandardsRegistry::verify_and_load(dir.path()).unwrap_err();
    match err {
        StandardsError::UnexpectedFile { path } => assert!(path.ends_with("rules/extra.csv")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), FIELDS_CSV);
    fs::remove_file(dir.path().join("rules/contracts.csv")).unwrap();

    let err = StandardsRegistry::verify_and_load(dir.path()).unwrap_err();
    assert!(matches!(err, StandardsError::MissingFile { .. }), "{err}");
}

#[test]
fn expiry_flag_requires_date_type() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(
        dir.path(),
        "Module,Field,Type,Expiry\nb_05.01,c0010,TEXT,Y\n",
    );

    let err = StandardsRegistry::verify_and_load(dir.path()).unwrap_err();
    match err {
        StandardsError::Csv { message, .. } => {
            assert_eq!(message, "line 2: expiry field c0010 must be DATE");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn fields_for_unlisted_module_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), "Module,Field,Type\nb_07.01,c0010,TEXT\n");

    let err = StandardsRegistry::verify_and_load(dir.path()).unwrap_err();
    match err {
        StandardsError::Csv { message, .. } => {
            assert_eq!(message, "fields declared for unlisted module b_07.01");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bundled_standards_verify() {
    let (registry, summary) = StandardsRegistry::verify_and_load(&standards_root()).unwrap();
    assert_eq!(summary.manifest_pins.release, "v4_0");

    let codes: Vec<_> = registry
        .schemas
        .modules()
        .map(|schema| schema.code.to_string())
        .collect();
    insta::assert_json_snapshot!(codes, @r#"
    [
      "b_01.01",
      "b_01.02",
      "b_02.01",
      "b_03.01",
      "b_05.01",
      "b_06.01"
    ]
    "#);

    let header: Vec<_> = registry
        .schemas
        .get(&code("b_01.01"))
        .unwrap()
        .expected_fields()
        .collect();
    assert_eq!(header, vec!["c0010", "c0020", "c0030", "c0040", "c0050", "c0060"]);

    let contracts = registry.schemas.get(&code("b_05.01")).unwrap();
    assert!(contracts.is_expiry("c0040"));
    assert!(!contracts.is_expiry("c0060"));
}
