use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Register of Information template code, always lower-case `b_NN.NN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleCode(String);

impl ModuleCode {
    /// Parse a module code, accepting any ASCII case.
    pub fn parse(raw: &str) -> Result<Self> {
        let lower = raw.trim().to_ascii_lowercase();
        if is_module_code(&lower) {
            Ok(Self(lower))
        } else {
            Err(ModelError::InvalidModuleCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `b_` + 2 digits + `.` + 2 digits, lower-case only.
fn is_module_code(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 7
        && bytes.starts_with(b"b_")
        && bytes[2].is_ascii_digit()
        && bytes[3].is_ascii_digit()
        && bytes[4] == b'.'
        && bytes[5].is_ascii_digit()
        && bytes[6].is_ascii_digit()
}

impl fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ModuleCode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModuleCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ModuleCode> for String {
    fn from(code: ModuleCode) -> Self {
        code.0
    }
}

/// Semantic type declared for a field in the module schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Free text, accepts any value.
    #[default]
    Text,
    /// 20-character alphanumeric legal-entity identifier.
    Identifier,
    /// Calendar date.
    Date,
    /// Declared numeric. Not enforced yet: validated like `Text`.
    Number,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Identifier => "IDENTIFIER",
            Self::Date => "DATE",
            Self::Number => "NUMBER",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ModelError;

    /// Parse a type label as written in the standards files.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEXT" | "STRING" | "" => Ok(Self::Text),
            "IDENTIFIER" | "LEI" => Ok(Self::Identifier),
            "DATE" => Ok(Self::Date),
            "NUMBER" | "NUMERIC" | "NUM" => Ok(Self::Number),
            _ => Err(ModelError::UnknownFieldType(s.to_string())),
        }
    }
}

/// One field (technical column) of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Technical field identifier, e.g. `c0010`.
    pub id: String,
    pub label: Option<String>,
    pub field_type: FieldType,
    /// Column must be present for the table to pass the structural gate.
    #[serde(default = "default_true")]
    pub expected: bool,
    /// Date field whose past values are reported as expired.
    #[serde(default)]
    pub expiry: bool,
}

fn default_true() -> bool {
    true
}

impl FieldSpec {
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: None,
            field_type,
            expected: true,
            expiry: false,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.expected = false;
        self
    }

    #[must_use]
    pub fn expiry(mut self) -> Self {
        self.expiry = true;
        self
    }
}

/// Schema of one regulatory module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSchema {
    pub code: ModuleCode,
    pub description: String,
    /// Fields in template order.
    pub fields: Vec<FieldSpec>,
}

impl ModuleSchema {
    pub fn new(code: ModuleCode, description: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            code,
            description: description.into(),
            fields,
        }
    }

    /// Field identifiers the structural gate requires, in template order.
    pub fn expected_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|field| field.expected)
            .map(|field| field.id.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        let name = name.trim();
        self.fields
            .iter()
            .find(|field| field.id.eq_ignore_ascii_case(name))
    }

    /// Declared type of `name`; undeclared columns are free text.
    pub fn field_type(&self, name: &str) -> FieldType {
        self.field(name)
            .map(|field| field.field_type)
            .unwrap_or_default()
    }

    pub fn is_expiry(&self, name: &str) -> bool {
        self.field(name).is_some_and(|field| field.expiry)
    }
}
