//! CLI library components for the Register of Information auditor.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
