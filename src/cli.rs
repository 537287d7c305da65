//! Command-line arguments.

use clap::{Parser, ValueEnum};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable output for local development.
    Pretty,
    /// One JSON object per line for log aggregation.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "podium", version, about = "Faculty review platform")]
pub struct Args {
    /// Tracing output format
    #[arg(long, value_enum, default_value = "pretty")]
    pub tracing: TracingFormat,
}
