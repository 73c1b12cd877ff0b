#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest: ManifestHeader,
    #[serde(default)]
    pub notes: Option<ManifestNotes>,
    pub pins: Pins,
    #[serde(default)]
    pub exemptions: Exemptions,
    pub files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub schema: String,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestNotes {
    pub summary: Option<String>,
}

/// Pinned standards release; module schemas are read from `roi/<release>/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pins {
    pub release: String,
}

/// Value vocabularies that exempt a cell from type checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exemptions {
    /// Whole-value placeholders accepted in IDENTIFIER fields (case-insensitive).
    pub identifier_placeholders: Vec<String>,
    /// Reserved identifier prefixes (case-insensitive).
    pub identifier_reserved_prefixes: Vec<String>,
    /// Tokens marking an open-ended DATE (case-insensitive substring).
    pub indefinite_tokens: Vec<String>,
}

impl Default for Exemptions {
    fn default() -> Self {
        Self {
            identifier_placeholders: vec!["not applicable".to_string()],
            identifier_reserved_prefixes: vec!["eba_".to_string()],
            indefinite_tokens: vec![
                "indefinite".to_string(),
                "indeterminate".to_string(),
                "open-ended".to_string(),
            ],
        }
    }
}

impl Exemptions {
    pub fn is_identifier_exempt(&self, value: &str) -> bool {
        let lower = value.trim().to_lowercase();
        self.identifier_placeholders
            .iter()
            .any(|placeholder| lower == placeholder.trim().to_lowercase())
            || self
                .identifier_reserved_prefixes
                .iter()
                .map(|prefix| prefix.trim().to_lowercase())
                .any(|prefix| !prefix.is_empty() && lower.starts_with(&prefix))
    }

    pub fn is_indefinite(&self, value: &str) -> bool {
        let lower = value.to_lowercase();
        self.indefinite_tokens
            .iter()
            .map(|token| token.trim().to_lowercase())
            .any(|token| !token.is_empty() && lower.contains(&token))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    pub sha256: String,
    pub kind: String,
    pub role: String,
    #[serde(default)]
    pub notes: Option<String>,
}
