pub mod error;
pub mod finding;
pub mod lookup;
pub mod module;
pub mod report;
pub mod table;

pub use error::{ModelError, Result};
pub use finding::{Category, ColumnRef, Finding, RowRef, Severity};
pub use lookup::CaseInsensitiveSet;
pub use module::{FieldSpec, FieldType, ModuleCode, ModuleSchema};
pub use report::{AuditReport, ModuleCounts, ReportSummary};
pub use table::{LabeledTable, Table};
