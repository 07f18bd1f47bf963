//! Checkpoint context: compiled actions plus all run-time state.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──compile_action──► Compiling ──finish_compile──► Running
//!       │                                                            ▲
//!       └──finish_compile (interval set, no actions: implicit echo)──┘
//! ```
//!
//! `finish_compile` blocks the signals of every `wait` action before the
//! context enters `Running`, so no `wait` can run before its signal is
//! blocked. After `finish_compile` the context is sealed, even when it stays
//! `Uninitialized` because checkpoints are disabled: no more actions can be
//! compiled, and only a sealed context accepts ticks.

use crate::action::{Action, Program, parse_action};
use crate::debug;
use crate::error::{CheckpointError, Result};
use crate::signals::SignalSet;
use crate::terminal::{Console, StdConsole, TtySlot};
use std::fmt;

/// Interval used when actions are configured without one.
pub const DEFAULT_INTERVAL: u64 = 10;

/// Compile/run phase of a [`Checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Compiling,
    Running,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Compiling => "compiling",
            Self::Running => "running",
        })
    }
}

/// Owns the action program and everything that changes while it runs.
pub struct Checkpoint {
    pub(crate) phase: Phase,
    /// `finish_compile` has run; ticks are accepted from now on.
    pub(crate) sealed: bool,
    /// Ticks between firings; 0 means checkpointing was not requested.
    pub(crate) interval: u64,
    pub(crate) program: Program,
    pub(crate) signals: SignalSet,
    pub(crate) ticks: u64,
    pub(crate) console: Box<dyn Console>,
    pub(crate) tty: TtySlot,
    /// A carriage return was written to the terminal.
    pub(crate) tty_dirty: bool,
}

impl Checkpoint {
    /// Create a context writing through `console`.
    ///
    /// `interval` is the requested checkpoint rate; pass 0 when the user did
    /// not ask for checkpoints.
    pub fn new(interval: u64, console: Box<dyn Console>) -> Self {
        Self {
            phase: Phase::Uninitialized,
            sealed: false,
            interval,
            program: Program::default(),
            signals: SignalSet::default(),
            ticks: 0,
            console,
            tty: TtySlot::default(),
            tty_dirty: false,
        }
    }

    /// Create a context on the standard streams.
    pub fn with_std_console(interval: u64, listing_to_stderr: bool) -> Self {
        Self::new(interval, Box::new(StdConsole::new(listing_to_stderr)))
    }

    /// Compile one action spec and append it to the program.
    pub fn compile_action(&mut self, spec: &str) -> Result<()> {
        if self.sealed {
            return Err(CheckpointError::Lifecycle {
                operation: "compile checkpoint actions",
                phase: self.phase,
            });
        }

        let action = parse_action(spec)?;
        if let Action::Wait(signal) = &action {
            self.signals.add(*signal);
        }

        debug!("checkpoint"; "compiled action #{}: {}", self.program.len() + 1, spec);
        self.program.push(action);
        self.phase = Phase::Compiling;
        Ok(())
    }

    /// Seal the program and switch to `Running`.
    ///
    /// Safe to call more than once; later calls do nothing.
    pub fn finish_compile(&mut self) -> Result<()> {
        if self.phase == Phase::Uninitialized && self.interval > 0 && self.program.is_empty() {
            // Historical default: `--checkpoint` alone prints "Write checkpoint N"
            self.compile_action("echo")?;
        }

        if self.phase == Phase::Compiling {
            self.signals.block()?;
            if self.interval == 0 {
                self.interval = DEFAULT_INTERVAL;
            }
            self.phase = Phase::Running;
            debug!(
                "checkpoint";
                "{} action(s) every {} record(s)",
                self.program.len(),
                self.interval
            );
        }
        self.sealed = true;
        Ok(())
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether `finish_compile` has run.
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub const fn interval(&self) -> u64 {
        self.interval
    }

    /// Whether checkpoints will fire.
    pub const fn is_enabled(&self) -> bool {
        matches!(self.phase, Phase::Running) && self.interval > 0
    }

    pub const fn program(&self) -> &Program {
        &self.program
    }

    pub const fn signals(&self) -> &SignalSet {
        &self.signals
    }

    /// Number of ticks seen so far; also the current checkpoint number.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl fmt::Debug for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkpoint")
            .field("phase", &self.phase)
            .field("sealed", &self.sealed)
            .field("interval", &self.interval)
            .field("program", &self.program)
            .field("ticks", &self.ticks)
            .field("tty", &self.tty)
            .field("tty_dirty", &self.tty_dirty)
            .finish_non_exhaustive()
    }
}
