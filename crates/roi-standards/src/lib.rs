#![deny(unsafe_code)]

pub mod csv;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod paths;
pub mod registry;
pub mod schema;

pub use crate::error::StandardsError;
pub use crate::manifest::{Exemptions, Manifest};
pub use crate::paths::{STANDARDS_ENV_VAR, default_rules_dir, standards_root};
pub use crate::registry::{StandardsRegistry, VerifySummary};
pub use crate::schema::SchemaRegistry;
