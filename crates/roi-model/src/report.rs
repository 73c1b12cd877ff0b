use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::finding::{Finding, Severity};
use crate::module::ModuleCode;

/// Per-module finding counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCounts {
    pub fatal: usize,
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl ModuleCounts {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Fatal => self.fatal += 1,
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Fatal => self.fatal,
            Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    pub fn total(&self) -> usize {
        self.fatal + self.error + self.warning + self.info
    }
}

/// Counts derived from the finding list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_module: BTreeMap<ModuleCode, ModuleCounts>,
}

impl ReportSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            summary.total += 1;
            *summary.by_severity.entry(finding.severity).or_default() += 1;
            summary
                .by_module
                .entry(finding.module.clone())
                .or_default()
                .record(finding.severity);
        }
        summary
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    /// Distinct module codes touched by at least one finding.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleCode> {
        self.by_module.keys()
    }
}

/// Consolidated audit result of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Findings in discovery order.
    pub findings: Vec<Finding>,
    pub summary: ReportSummary,
}

impl AuditReport {
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let summary = ReportSummary::from_findings(&findings);
        Self { findings, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Any finding at or above `threshold`.
    pub fn has_findings_at_least(&self, threshold: Severity) -> bool {
        self.findings
            .iter()
            .any(|finding| finding.severity.at_least(threshold))
    }

    pub fn has_errors(&self) -> bool {
        self.has_findings_at_least(Severity::Error)
    }

    pub fn findings_for<'a>(&'a self, module: &'a ModuleCode) -> impl Iterator<Item = &'a Finding> {
        self.findings
            .iter()
            .filter(move |finding| &finding.module == module)
    }
}
