//! Command-line interface for nairi-monitor using clap.
//!
//! Everything else is configured through the environment.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format for log aggregation.
    Json,
}

/// Watches Nairi drop announcements on Discord and forwards threshold alerts.
#[derive(Parser, Debug)]
#[command(name = "nairi-monitor")]
#[command(version)]
#[command(about = "Watches Nairi drop announcements on Discord and forwards threshold alerts")]
pub struct Cli {
    /// YAML rules file replacing the built-in A..E rules.
    #[arg(short = 'r', long = "rules", env = "RULES_FILE")]
    pub rules: Option<PathBuf>,

    /// Validate configuration and exit.
    #[arg(long = "validate")]
    pub validate: bool,

    /// Log format: text or json.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT")]
    pub log_format: LogFormat,
}
