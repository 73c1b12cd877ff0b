//! CLI argument definitions for `roi-audit`.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use roi_model::Severity;

use crate::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "roi-audit",
    version,
    about = "Register of Information auditor - validate DORA RoI submission tables",
    long_about = "Validate Register of Information tables against the pinned standards release.\n\n\
                  Runs field checks, cross-column rules and cross-table referential checks,\n\
                  then writes a consolidated audit report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Standards directory (default: $ROI_STANDARDS_DIR or the bundled standards).
    #[arg(long = "standards-dir", value_name = "DIR", global = true)]
    pub standards_dir: Option<PathBuf>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Audit a folder of Register of Information CSV tables.
    Validate(ValidateArgs),

    /// List the modules of the pinned standards release.
    Modules,

    /// List the rules that would apply to a run.
    Rules(RulesArgs),

    /// Verify the standards manifest and file checksums.
    VerifyStandards,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Folder containing one CSV file per module (file names carry the module code).
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Rule file or directory of rule files replacing the bundled rules.
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Reference date for expiry checks (default: now).
    #[arg(long = "as-of", value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    /// Report format(s) to write.
    #[arg(long = "output", value_enum, default_value = "both")]
    pub output: OutputFormatArg,

    /// Output directory for report files (default: <FOLDER>/audit).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the summary without writing report files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Lowest severity that makes the run exit with status 1.
    #[arg(long = "fail-on", value_enum, default_value = "error")]
    pub fail_on: FailOnArg,
}

#[derive(Parser)]
pub struct RulesArgs {
    /// Rule file or directory of rule files replacing the bundled rules.
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Json,
    Csv,
    Both,
}

impl OutputFormatArg {
    pub fn json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }

    pub fn csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }
}

/// Failure threshold choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailOnArg {
    Fatal,
    Error,
    Warning,
}

impl From<FailOnArg> for Severity {
    fn from(value: FailOnArg) -> Self {
        match value {
            FailOnArg::Fatal => Severity::Fatal,
            FailOnArg::Error => Severity::Error,
            FailOnArg::Warning => Severity::Warning,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl Cli {
    /// Build logging configuration from CLI flags with consistent precedence.
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig {
            level_filter: self.verbosity.tracing_level_filter(),
            ..LogConfig::default()
        };
        config.use_env_filter = !(self.verbosity.is_present() || self.log_level.is_some());
        if let Some(level) = self.log_level {
            config.level_filter = match level {
                LogLevelArg::Error => LevelFilter::ERROR,
                LogLevelArg::Warn => LevelFilter::WARN,
                LogLevelArg::Info => LevelFilter::INFO,
                LogLevelArg::Debug => LevelFilter::DEBUG,
                LogLevelArg::Trace => LevelFilter::TRACE,
            };
        }
        config.format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        };
        config.log_file = self.log_file.clone();
        config.log_data = self.log_data;
        config.with_ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        config
    }
}
