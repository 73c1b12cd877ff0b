use std::fs;
use std::path::Path;

use clap::Parser;
use tracing::level_filters::LevelFilter;

use roi_cli::cli::{Cli, Command, FailOnArg, OutputFormatArg, ValidateArgs};
use roi_cli::commands::{EXIT_CLEAN, EXIT_FINDINGS, exit_code, rules_table, run_validate};
use roi_cli::logging::LogFormat;
use roi_cli::summary::{finding_table, module_table};
use roi_model::Severity;
use roi_standards::standards_root;
use roi_validate::load_rules;

const PROVIDERS: &str = "\
c0010,c0020,c0030,c0040,c0050
P-1,ABCDEFGHIJ1234567890,Cloud Co,DE,Legal person
P-2,ABC123,Hosting Ltd,FR,Legal person
";

const CONTRACTS: &str = "\
c0010,c0020,c0030,c0040,c0050,c0060
C-1,P-1,Active,2026-12-31,2026-06-30,2024-01-01
C-2,P-9,Renewal,2023-12-31,,2023-01-01
";

fn write_submission(dir: &Path) {
    fs::write(dir.join("B_02.01.csv"), PROVIDERS).unwrap();
    fs::write(dir.join("b_05.01_contracts.csv"), CONTRACTS).unwrap();
    fs::write(dir.join("notes.csv"), "anything\nx\n").unwrap();
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("roi-audit").chain(args.iter().copied())).unwrap()
}

fn validate_args(cli: &Cli) -> &ValidateArgs {
    match &cli.command {
        Command::Validate(args) => args,
        _ => panic!("expected validate command"),
    }
}

fn cell_text(table: &comfy_table::Table) -> Vec<Vec<String>> {
    table
        .row_iter()
        .map(|row| row.cell_iter().map(comfy_table::Cell::content).collect())
        .collect()
}

#[test]
fn validate_flags_parse() {
    let cli = parse(&[
        "validate",
        "submission",
        "--as-of",
        "2024-06-30",
        "--fail-on",
        "warning",
        "--output",
        "csv",
        "--rules",
        "extra.csv",
    ]);
    let args = validate_args(&cli);
    assert_eq!(args.folder, Path::new("submission"));
    assert_eq!(args.as_of, chrono::NaiveDate::from_ymd_opt(2024, 6, 30));
    assert_eq!(args.fail_on, FailOnArg::Warning);
    assert_eq!(args.output, OutputFormatArg::Csv);
    assert!(args.output.csv() && !args.output.json());
    assert_eq!(args.rules.as_deref(), Some(Path::new("extra.csv")));
    assert!(!args.dry_run);
}

#[test]
fn invalid_as_of_is_rejected() {
    let result = Cli::try_parse_from(["roi-audit", "validate", "dir", "--as-of", "30/06/2024"]);
    assert!(result.is_err());
}

#[test]
fn log_config_precedence() {
    let config = parse(&["modules"]).log_config();
    assert_eq!(config.level_filter, LevelFilter::WARN);
    assert!(config.use_env_filter);
    assert_eq!(config.format, LogFormat::Pretty);

    let config = parse(&["-v", "modules"]).log_config();
    assert_eq!(config.level_filter, LevelFilter::INFO);
    assert!(!config.use_env_filter);

    let config = parse(&[
        "verify-standards",
        "--log-level",
        "trace",
        "--log-format",
        "json",
        "--log-data",
    ])
    .log_config();
    assert_eq!(config.level_filter, LevelFilter::TRACE);
    assert_eq!(config.format, LogFormat::Json);
    assert!(config.log_data);
}

#[test]
fn validate_writes_reports_and_fails_on_errors() {
    let submission = tempfile::tempdir().unwrap();
    write_submission(submission.path());
    let output = submission.path().join("out");
    let cli = parse(&[
        "validate",
        submission.path().to_str().unwrap(),
        "--as-of",
        "2024-06-30",
        "--output-dir",
        output.to_str().unwrap(),
    ]);

    let run = run_validate(validate_args(&cli), Some(&standards_root())).unwrap();

    assert_eq!(run.tables, 2);
    assert_eq!(run.rules, 7);
    assert_eq!(run.standards_release, "v4_0");
    assert_eq!(run.report.summary.total, 5);
    assert_eq!(run.report.summary.count(Severity::Error), 3);
    assert_eq!(exit_code(&run.report, Severity::Error), EXIT_FINDINGS);
    assert_eq!(exit_code(&run.report, Severity::Fatal), EXIT_CLEAN);

    assert_eq!(
        run.outputs,
        vec![output.join("audit_report.json"), output.join("audit_report.csv")]
    );
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join("audit_report.json")).unwrap())
            .unwrap();
    assert_eq!(json["standards_release"], "v4_0");
    assert_eq!(json["findings"].as_array().unwrap().len(), 5);
    let csv = fs::read_to_string(output.join("audit_report.csv")).unwrap();
    assert_eq!(csv.lines().count(), 6);

    let modules = cell_text(&module_table(&run));
    assert_eq!(modules.len(), 3);
    assert_eq!(modules[0][0], "b_02.01");
    assert_eq!(modules[1][..3], ["b_05.01", "Contractual arrangements with ICT third-party service providers", "0"]);
    assert_eq!(modules[2][0], "TOTAL");
    assert_eq!(modules[2][3], "3");

    let findings = cell_text(&finding_table(&run.report.findings).unwrap());
    insta::assert_json_snapshot!(findings, @r#"
    [
      [
        "ERROR",
        "b_02.01",
        "3",
        "c0020",
        "Identifier",
        "Invalid LEI 'ABC123': expected 20 alphanumeric characters, found length 6"
      ],
      [
        "ERROR",
        "b_05.01",
        "3",
        "c0050",
        "Conditional",
        "Renewal date c0050 is required for renewed arrangements [required when c0030 = 'Renewal']"
      ],
      [
        "ERROR",
        "b_05.01",
        "3",
        "c0020",
        "Integrity",
        "Contract references an unregistered ICT third-party service provider: 'P-9' not found in b_02.01.c0010"
      ],
      [
        "WARNING",
        "b_05.01",
        "3",
        "c0040",
        "Date",
        "Date 2023-12-31 is expired (before 2024-06-30)"
      ],
      [
        "INFO",
        "b_05.01",
        "-",
        "-",
        "Compliance",
        "4 custom rules apply to this module"
      ]
    ]
    "#);
}

#[test]
fn dry_run_writes_nothing() {
    let submission = tempfile::tempdir().unwrap();
    write_submission(submission.path());
    let cli = parse(&[
        "validate",
        submission.path().to_str().unwrap(),
        "--as-of",
        "2024-06-30",
        "--dry-run",
    ]);

    let run = run_validate(validate_args(&cli), Some(&standards_root())).unwrap();

    assert!(run.outputs.is_empty());
    assert!(!submission.path().join("audit").exists());
    assert_eq!(run.report.summary.total, 5);
}

#[test]
fn override_rules_replace_bundled_rules() {
    let submission = tempfile::tempdir().unwrap();
    write_submission(submission.path());
    let rules = submission.path().join("rules.txt");
    fs::write(
        &rules,
        "Rule_Type,Source_Module,Source_Column,Target_Module,Target_Column,Operator,Condition_Value,Severity,Message\n",
    )
    .unwrap();
    let cli = parse(&[
        "validate",
        submission.path().to_str().unwrap(),
        "--as-of",
        "2024-06-30",
        "--dry-run",
        "--rules",
        rules.to_str().unwrap(),
    ]);

    let run = run_validate(validate_args(&cli), Some(&standards_root())).unwrap();

    assert_eq!(run.rules, 0);
    assert_eq!(run.report.summary.total, 2);
    assert_eq!(exit_code(&run.report, Severity::Warning), EXIT_FINDINGS);
}

#[test]
fn unreadable_table_is_reported_and_the_run_completes() {
    let submission = tempfile::tempdir().unwrap();
    fs::write(submission.path().join("B_02.01.csv"), PROVIDERS).unwrap();
    fs::write(
        submission.path().join("b_05.01.csv"),
        "c0010,c0020,c0030,c0040,c0050,c0060\nC-1,P-1,Active,2026-12-31,,2024-01-01,Acme, Inc\n",
    )
    .unwrap();
    let output = submission.path().join("out");
    let cli = parse(&[
        "validate",
        submission.path().to_str().unwrap(),
        "--as-of",
        "2024-06-30",
        "--output",
        "json",
        "--output-dir",
        output.to_str().unwrap(),
    ]);

    let run = run_validate(validate_args(&cli), Some(&standards_root())).unwrap();

    assert_eq!(run.tables, 1);
    assert_eq!(run.unreadable, 1);
    assert_eq!(run.report.summary.total, 2);
    assert_eq!(run.report.summary.count(Severity::Fatal), 1);
    let fatal = &run.report.findings[0];
    assert_eq!(fatal.module.as_str(), "b_05.01");
    assert_eq!(fatal.row.to_string(), "Header");
    assert_eq!(exit_code(&run.report, Severity::Fatal), EXIT_FINDINGS);
    assert_eq!(run.outputs, vec![output.join("audit_report.json")]);
    assert!(output.join("audit_report.json").is_file());
}

#[test]
fn missing_folder_is_an_operational_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let cli = parse(&["validate", missing.to_str().unwrap(), "--dry-run"]);

    let error = run_validate(validate_args(&cli), Some(&standards_root())).unwrap_err();
    assert!(format!("{error:#}").contains("read submission folder"));
}

#[test]
fn bundled_rules_table_lists_every_rule() {
    let rules = load_rules(None);
    let rows = cell_text(&rules_table(&rules));
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[0][..5], ["contracts", "CROSS_COL", "b_05.01.c0060", "<=", "c0040"]);
    assert_eq!(rows[4][4], "b_02.01.c0010");
}
