use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid module code '{0}' (expected b_NN.NN)")]
    InvalidModuleCode(String),
    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),
    #[error("row {row} has {found} cells but the table has {expected} columns")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
