//! Command-line interface definitions.

use crate::simulate::Mode;
use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Periodic checkpoint actions for a simulated tar run
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: checkpoint.toml, if present)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Fire checkpoint actions every N records (default N: 10)
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "10", require_equals = true)]
    pub checkpoint: Option<u64>,

    /// Action to run at each checkpoint (repeatable, runs in order)
    #[arg(long = "checkpoint-action", value_name = "ACTION")]
    pub checkpoint_action: Vec<String>,

    /// Archive name reported to actions and scripts
    #[arg(short = 'f', long, value_hint = clap::ValueHint::FilePath)]
    pub archive: Option<String>,

    /// Number of records to simulate
    #[arg(short = 'n', long)]
    pub blocks: Option<u64>,

    /// Bytes per record, a multiple of 512
    #[arg(long)]
    pub record_size: Option<u64>,

    /// Simulated operation
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Pause between records, in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,
}
