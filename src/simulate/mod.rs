//! A stand-in archiver that drives checkpoints from the command line.
//!
//! [`SimulatedArchive`] pretends to move fixed-size records through an
//! archive and implements [`Host`] on top of its counters, so every action
//! can be exercised without a real tar implementation behind it.

mod stats;

pub use stats::{deleted_line, human_bytes, stat_line};

use crate::host::{Host, TotalsLabels};
use crate::log;
use crate::terminal::{Sink, StdStream, StdTarget};
use crate::utils::exec::Cmd;
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Bytes per block; the blocking factor is the record size in blocks.
pub const BLOCK_SIZE: u64 = 512;

/// Default record size (a blocking factor of 20).
pub const DEFAULT_RECORD_SIZE: u64 = 20 * BLOCK_SIZE;

/// Shell used for `exec=` actions.
const SHELL: &str = "/bin/sh";

/// Direction of a single checkpoint tick.
const READ: &[bool] = &[false];
const WRITE: &[bool] = &[true];
const REWRITE: &[bool] = &[false, true];

// ============================================================================
// Mode
// ============================================================================

/// What the simulated archiver is doing to the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Reading records, like `tar -t` or `tar -x`.
    Read,
    /// Writing records, like `tar -c`.
    #[default]
    Write,
    /// Reading records and rewriting the survivors, like `tar --delete`.
    Delete,
}

impl Mode {
    /// The `TAR_SUBCOMMAND` value for this mode.
    pub const fn subcommand(self) -> &'static str {
        match self {
            Self::Read => "-t",
            Self::Write => "-c",
            Self::Delete => "--delete",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        })
    }
}

// ============================================================================
// Simulated archive
// ============================================================================

/// Record counters plus the [`Host`] services built on them.
#[derive(Debug)]
pub struct SimulatedArchive {
    archive: String,
    mode: Mode,
    record_size: u64,
    records: u64,
    bytes_read: u64,
    bytes_written: u64,
    start: Instant,
    /// Set by the last `compute_duration`.
    elapsed: Duration,
    errors: usize,
}

impl SimulatedArchive {
    pub fn new(archive: impl Into<String>, mode: Mode, record_size: u64) -> Self {
        Self {
            archive: archive.into(),
            mode,
            record_size,
            records: 0,
            bytes_read: 0,
            bytes_written: 0,
            start: Instant::now(),
            elapsed: Duration::ZERO,
            errors: 0,
        }
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn records(&self) -> u64 {
        self.records
    }

    pub const fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Bytes dropped from the archive; only delete mode drops any.
    pub const fn bytes_deleted(&self) -> u64 {
        match self.mode {
            Mode::Delete => self.bytes_read.saturating_sub(self.bytes_written),
            _ => 0,
        }
    }

    /// Restart the clock used by `compute_duration`.
    pub fn reset_timer(&mut self) {
        self.start = Instant::now();
        self.elapsed = Duration::ZERO;
    }

    /// Move one record and return the checkpoint ticks it causes, as
    /// `is_write` flags in order.
    ///
    /// In delete mode every second record is dropped instead of rewritten.
    pub fn transfer_record(&mut self) -> &'static [bool] {
        self.records += 1;
        match self.mode {
            Mode::Read => {
                self.bytes_read += self.record_size;
                READ
            }
            Mode::Write => {
                self.bytes_written += self.record_size;
                WRITE
            }
            Mode::Delete => {
                self.bytes_read += self.record_size;
                if self.records % 2 == 0 {
                    READ
                } else {
                    self.bytes_written += self.record_size;
                    REWRITE
                }
            }
        }
    }

    /// Number of errors passed to `report_error`.
    pub const fn error_count(&self) -> usize {
        self.errors
    }

    /// 2 once any error was reported, 0 otherwise.
    pub const fn exit_code(&self) -> i32 {
        if self.errors > 0 { 2 } else { 0 }
    }

    /// `TAR_*` variables handed to checkpoint scripts.
    pub fn script_vars(&self, archive: &str, checkpoint: u64) -> Vec<(&'static str, String)> {
        vec![
            ("TAR_VERSION", env!("CARGO_PKG_VERSION").to_string()),
            ("TAR_ARCHIVE", archive.to_string()),
            ("TAR_CHECKPOINT", checkpoint.to_string()),
            (
                "TAR_BLOCKING_FACTOR",
                (self.record_size / BLOCK_SIZE).to_string(),
            ),
            ("TAR_SUBCOMMAND", self.mode.subcommand().to_string()),
            ("TAR_FORMAT", "gnu".to_string()),
        ]
    }

    fn totals_text(&self, labels: &TotalsLabels, separator: char) -> String {
        match self.mode {
            Mode::Read => stat_line(&labels.read, self.bytes_read, self.elapsed),
            Mode::Write => stat_line(&labels.written, self.bytes_written, self.elapsed),
            Mode::Delete => format!(
                "{}{separator}{}{separator}{}",
                stat_line(&labels.read, self.bytes_read, self.elapsed),
                stat_line(&labels.written, self.bytes_written, self.elapsed),
                deleted_line(&labels.deleted, self.bytes_deleted()),
            ),
        }
    }
}

impl Host for SimulatedArchive {
    fn program_name(&self) -> &str {
        env!("CARGO_PKG_NAME")
    }

    fn compute_duration(&mut self) -> Duration {
        self.elapsed = self.start.elapsed();
        self.elapsed
    }

    fn format_totals(
        &mut self,
        out: &mut dyn Sink,
        labels: &TotalsLabels,
        separator: char,
    ) -> io::Result<usize> {
        let text = self.totals_text(labels, separator);
        out.write_all(text.as_bytes())?;
        Ok(text.chars().count())
    }

    fn print_totals(&mut self) -> io::Result<()> {
        let labels = TotalsLabels {
            read: "Total bytes read".into(),
            written: "Total bytes written".into(),
            deleted: "Total bytes deleted".into(),
        };
        let mut err = StdStream::new(StdTarget::Stderr);
        self.format_totals(&mut err, &labels, '\n')?;
        err.write_all(b"\n")?;
        err.flush()
    }

    fn current_archive(&self) -> &str {
        &self.archive
    }

    /// Failures are warnings: the archive keeps going.
    fn exec_checkpoint_script(
        &mut self,
        command: &str,
        archive: &str,
        checkpoint: u64,
    ) -> anyhow::Result<()> {
        let result = Cmd::new(SHELL)
            .args(["-c", command])
            .envs(self.script_vars(archive, checkpoint))
            .run();

        if let Err(e) = result {
            log!("exec"; "warning: checkpoint script `{}`: {:#}", command, e);
        }
        Ok(())
    }

    fn report_error(&mut self, message: &str) {
        self.errors += 1;
        log!("error"; "{}", message);
    }
}

// ============================================================================
// Tests
// ============================================================================
