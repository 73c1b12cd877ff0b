//! Validation findings.
//!
//! A finding is the atomic result of every check: one offending cell, one
//! violated rule row, or one table-level notice. Findings are produced and
//! never mutated.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::module::ModuleCode;

/// Finding severity, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Table cannot be audited (structure does not match the module).
    Fatal,
    /// Must be fixed before submission.
    Error,
    /// Should be reviewed.
    Warning,
    /// Operator notice, not a data-quality finding.
    Info,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Self::Fatal, Self::Error, Self::Warning, Self::Info];

    /// Parse severity from a rule file cell.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fatal" | "critical" => Some(Self::Fatal),
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" | "information" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }

    /// True when this severity is at least as severe as `threshold`.
    pub fn at_least(&self, threshold: Severity) -> bool {
        *self <= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What kind of check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Structure,
    Identifier,
    Date,
    CrossColumn,
    Conditional,
    Integrity,
    Compliance,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Structure => "Structure",
            Self::Identifier => "Identifier",
            Self::Date => "Date",
            Self::CrossColumn => "CrossColumn",
            Self::Conditional => "Conditional",
            Self::Integrity => "Integrity",
            Self::Compliance => "Compliance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row a finding points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowRef {
    /// The header row (structural findings).
    Header,
    /// The whole table (notices).
    Table,
    /// Spreadsheet row number: zero-based data index + 2.
    Row(usize),
}

impl RowRef {
    /// Spreadsheet row for a zero-based data row index (header is row 1).
    pub fn data_row(index: usize) -> Self {
        Self::Row(index + 2)
    }

    /// Zero-based data row index, if this points at a data row.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Row(number) => number.checked_sub(2),
            _ => None,
        }
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("Header"),
            Self::Table => f.write_str("-"),
            Self::Row(number) => write!(f, "{number}"),
        }
    }
}

impl Serialize for RowRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Row(number) => serializer.serialize_u64(*number as u64),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for RowRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(number) if number >= 2 => Ok(Self::Row(number as usize)),
            Raw::Number(number) => Err(serde::de::Error::custom(format!(
                "data rows start at 2, got {number}"
            ))),
            Raw::Text(text) if text == "Header" => Ok(Self::Header),
            Raw::Text(text) if text == "-" => Ok(Self::Table),
            Raw::Text(text) => text
                .parse::<usize>()
                .ok()
                .filter(|number| *number >= 2)
                .map(Self::Row)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid row reference '{text}'"))),
        }
    }
}

/// Column a finding points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    /// Table-level finding.
    Table,
    Field(String),
}

impl ColumnRef {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("-"),
            Self::Field(name) => f.write_str(name),
        }
    }
}

impl Serialize for ColumnRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ColumnRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == "-" {
            Self::Table
        } else {
            Self::Field(raw)
        })
    }
}

/// One validation result.
///
/// Field order is the flat record layout downstream consumers expect:
/// `Level, Type, Message, Row, Column, Module`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "Level")]
    pub severity: Severity,
    #[serde(rename = "Type")]
    pub category: Category,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Row")]
    pub row: RowRef,
    #[serde(rename = "Column")]
    pub column: ColumnRef,
    #[serde(rename = "Module")]
    pub module: ModuleCode,
}

impl Finding {
    pub fn new(
        severity: Severity,
        category: Category,
        module: &ModuleCode,
        row: RowRef,
        column: ColumnRef,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            row,
            column,
            module: module.clone(),
        }
    }

    /// Finding about one data cell.
    pub fn cell(
        severity: Severity,
        category: Category,
        module: &ModuleCode,
        row_index: usize,
        column: &str,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            severity,
            category,
            module,
            RowRef::data_row(row_index),
            ColumnRef::field(column),
            message,
        )
    }

    /// Table-level notice (`Row = "-"`, `Column = "-"`).
    pub fn notice(
        severity: Severity,
        category: Category,
        module: &ModuleCode,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            severity,
            category,
            module,
            RowRef::Table,
            ColumnRef::Table,
            message,
        )
    }
}
