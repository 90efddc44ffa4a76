//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "widecol")]
#[command(author, version, about = "Resolve SQL column references against wide-column table metadata")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to the nearest widecol.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Table metadata file
    #[arg(short, long, global = true, value_name = "FILE", env = "WIDECOL_METADATA")]
    pub metadata: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve every column reference of one SQL statement
    Resolve {
        /// SQL statement
        sql: String,

        /// Dynamic column declared for the statement, e.g. "cf.note VARCHAR(20)"
        #[arg(short, long = "dynamic", value_name = "COLUMN")]
        dynamic: Vec<String>,

        /// Resolve as inside an open transaction
        #[arg(long)]
        no_auto_commit: bool,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Display table metadata
    Tables,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output
    Json,
}
