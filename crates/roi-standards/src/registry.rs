#![deny(unsafe_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::csv::fields::parse_fields_csv;
use crate::csv::modules::parse_modules_csv;
use crate::error::StandardsError;
use crate::hash::sha256_hex;
use crate::manifest::{Exemptions, Manifest, ManifestFile};
use crate::paths::standards_root;
use crate::schema::SchemaRegistry;

pub const MANIFEST_SCHEMA: &str = "roi-audit.standards-manifest";

const REQUIRED_ROLES: &[&str] = &["modules", "fields"];

/// Roles of bundled rule groups share this prefix (`rules.<group>`).
pub const RULES_ROLE_PREFIX: &str = "rules.";

const ALLOWED_KINDS: &[&str] = &["csv", "toml", "md", "other"];

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifySummary {
    pub standards_dir: PathBuf,
    pub manifest_pins: crate::manifest::Pins,
    pub file_count: usize,
    pub module_count: usize,
    pub field_count: usize,
    pub expiry_field_count: usize,
    pub rule_file_count: usize,
}

/// Verified standards bundle: manifest, file list and module schemas.
#[derive(Debug, Clone)]
pub struct StandardsRegistry {
    pub manifest: Manifest,
    pub files: Vec<ManifestFile>,
    pub schemas: SchemaRegistry,
}

impl StandardsRegistry {
    /// Verify every manifest entry against disk, then parse the pinned release.
    pub fn verify_and_load(standards_dir: &Path) -> Result<(Self, VerifySummary), StandardsError> {
        let manifest = load_manifest(&standards_dir.join("manifest.toml"))?;

        validate_manifest(&manifest, standards_dir)?;

        let mut files = manifest.files.clone();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        for file in &files {
            verify_file(standards_dir, file)?;
            debug!(path = %file.path, role = %file.role, "verified standards file");
        }

        let release = manifest.pins.release.as_str();
        let modules = parse_modules_csv(&resolve_role_path(standards_dir, &files, "modules")?)?;
        let fields_path = resolve_role_path(standards_dir, &files, "fields")?;
        let fields = parse_fields_csv(&fields_path)?;
        let field_count = fields.len();
        let expiry_field_count = fields.iter().filter(|field| field.spec.expiry).count();

        let schemas = SchemaRegistry::assemble(release, modules, fields).map_err(|orphan| {
            StandardsError::Csv {
                path: fields_path.clone(),
                message: format!("fields declared for unlisted module {orphan}"),
            }
        })?;

        let summary = VerifySummary {
            standards_dir: standards_dir.to_path_buf(),
            manifest_pins: manifest.pins.clone(),
            file_count: files.len(),
            module_count: schemas.len(),
            field_count,
            expiry_field_count,
            rule_file_count: files
                .iter()
                .filter(|f| f.role.starts_with(RULES_ROLE_PREFIX))
                .count(),
        };

        info!(
            release,
            modules = summary.module_count,
            fields = summary.field_count,
            "standards loaded"
        );

        Ok((
            Self {
                manifest,
                files,
                schemas,
            },
            summary,
        ))
    }

    /// Load from [`standards_root`].
    pub fn load_default() -> Result<Self, StandardsError> {
        Self::verify_and_load(&standards_root()).map(|(registry, _)| registry)
    }

    pub fn exemptions(&self) -> &Exemptions {
        &self.manifest.exemptions
    }

    pub fn release(&self) -> &str {
        &self.manifest.pins.release
    }

    pub fn into_schemas(self) -> SchemaRegistry {
        self.schemas
    }
}

fn load_manifest(path: &Path) -> Result<Manifest, StandardsError> {
    let contents = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| StandardsError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_manifest(manifest: &Manifest, standards_dir: &Path) -> Result<(), StandardsError> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(StandardsError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != 1 {
        return Err(StandardsError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }
    if manifest.pins.release.trim().is_empty() {
        return Err(StandardsError::InvalidManifest {
            message: "pins.release must not be empty".to_string(),
        });
    }

    let release_prefix = format!("roi/{}/", manifest.pins.release);
    let mut roles: BTreeSet<&str> = BTreeSet::new();
    let mut manifest_paths: BTreeSet<String> = BTreeSet::new();

    for file in &manifest.files {
        if !roles.insert(file.role.as_str()) {
            return Err(StandardsError::DuplicateRole {
                role: file.role.clone(),
            });
        }

        if !ALLOWED_KINDS.contains(&file.kind.as_str()) {
            return Err(StandardsError::InvalidManifest {
                message: format!("unsupported kind '{}' for {}", file.kind, file.path),
            });
        }

        if file.sha256.len() != 64 || !file.sha256.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(StandardsError::InvalidSha256 {
                path: PathBuf::from(&file.path),
                message: "sha256 must be 64 hex characters".to_string(),
            });
        }

        let path = manifest_path(&file.path)?;
        if REQUIRED_ROLES.contains(&file.role.as_str()) && !path.starts_with(&release_prefix) {
            return Err(StandardsError::InvalidManifest {
                message: format!(
                    "{} file {} is outside the pinned release directory {release_prefix}",
                    file.role, file.path
                ),
            });
        }
        manifest_paths.insert(path);
    }

    for role in REQUIRED_ROLES {
        if !roles.contains(role) {
            return Err(StandardsError::MissingRole {
                role: role.to_string(),
            });
        }
    }

    let mut on_disk = BTreeSet::new();
    collect_files(standards_dir, "", &mut on_disk)?;
    for path in on_disk {
        if path == "manifest.toml" {
            continue;
        }
        if !manifest_paths.contains(&path) {
            return Err(StandardsError::UnexpectedFile {
                path: standards_dir.join(path),
            });
        }
    }

    Ok(())
}

fn verify_file(standards_dir: &Path, file: &ManifestFile) -> Result<(), StandardsError> {
    let path = standards_dir.join(&file.path);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StandardsError::MissingFile { path });
        }
        Err(e) => return Err(StandardsError::io(path, e)),
    };
    let actual = sha256_hex(&bytes);
    if actual.eq_ignore_ascii_case(&file.sha256) {
        return Ok(());
    }
    Err(StandardsError::Sha256Mismatch {
        path,
        expected: file.sha256.to_ascii_lowercase(),
        actual,
    })
}

fn resolve_role_path(
    standards_dir: &Path,
    files: &[ManifestFile],
    role: &str,
) -> Result<PathBuf, StandardsError> {
    let f = files
        .iter()
        .find(|f| f.role == role)
        .ok_or_else(|| StandardsError::MissingRole {
            role: role.to_string(),
        })?;
    Ok(standards_dir.join(&f.path))
}

/// Canonical `a/b/c` form of a manifest entry: relative, `/`-separated, no `..`.
fn manifest_path(raw: &str) -> Result<String, StandardsError> {
    let invalid = |message: &str| StandardsError::InvalidPath {
        path: PathBuf::from(raw),
        message: message.to_string(),
    };
    if raw.contains('\\') {
        return Err(invalid("manifest path must use '/' separators"));
    }
    if raw.starts_with('/') {
        return Err(invalid("manifest path must be relative"));
    }
    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(invalid("manifest path must not leave the standards directory")),
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(invalid("manifest path is empty"));
    }
    Ok(segments.join("/"))
}

/// Files under `dir` as `/`-joined paths relative to the standards root.
fn collect_files(
    dir: &Path,
    prefix: &str,
    files: &mut BTreeSet<String>,
) -> Result<(), StandardsError> {
    for entry in std::fs::read_dir(dir).map_err(|e| StandardsError::io(dir, e))? {
        let entry = entry.map_err(|e| StandardsError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, &relative, files)?;
        } else if path.is_file() {
            files.insert(relative);
        }
    }
    Ok(())
}
