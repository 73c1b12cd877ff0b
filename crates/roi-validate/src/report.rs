//! Report aggregation and serialization.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use roi_model::{AuditReport, Finding, ReportSummary};

pub const REPORT_SCHEMA: &str = "roi-audit.audit-report";
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Flat CSV header, in serialization order.
pub const CSV_HEADER: [&str; 6] = ["Level", "Type", "Message", "Row", "Column", "Module"];

/// Concatenate finding streams in order and count them. No deduplication.
pub fn aggregate<I>(streams: I) -> AuditReport
where
    I: IntoIterator<Item = Vec<Finding>>,
{
    AuditReport::from_findings(streams.into_iter().flatten().collect())
}

#[derive(Debug, Serialize)]
pub struct AuditReportPayload<'a> {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: String,
    pub standards_release: &'a str,
    pub summary: &'a ReportSummary,
    pub findings: &'a [Finding],
}

impl<'a> AuditReportPayload<'a> {
    pub fn new(report: &'a AuditReport, standards_release: &'a str, generated_at: String) -> Self {
        Self {
            schema: REPORT_SCHEMA,
            schema_version: REPORT_SCHEMA_VERSION,
            generated_at,
            standards_release,
            summary: &report.summary,
            findings: &report.findings,
        }
    }
}

pub fn write_report_json(
    output_dir: &Path,
    report: &AuditReport,
    standards_release: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;
    let output_path = output_dir.join("audit_report.json");
    let payload = AuditReportPayload::new(report, standards_release, Utc::now().to_rfc3339());
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(&output_path, json)
        .with_context(|| format!("write {}", output_path.display()))?;
    Ok(output_path)
}

/// Write findings as flat CSV records. The header is written even when empty.
pub fn write_findings_csv<W: Write>(writer: W, findings: &[Finding]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(CSV_HEADER)?;
    for finding in findings {
        writer.serialize(finding)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_report_csv(output_dir: &Path, report: &AuditReport) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;
    let output_path = output_dir.join("audit_report.csv");
    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("create {}", output_path.display()))?;
    write_findings_csv(file, &report.findings)
        .with_context(|| format!("write {}", output_path.display()))?;
    Ok(output_path)
}
