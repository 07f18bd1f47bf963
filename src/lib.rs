//! Periodic checkpoint actions for archivers.
//!
//! A [`Checkpoint`] compiles `--checkpoint-action` specs into a program,
//! then runs it every `interval` records on behalf of a [`Host`]:
//!
//! ```ignore
//! let mut cp = Checkpoint::with_std_console(10, false);
//! cp.compile_action("ttyout=%{%H:%M:%S}t %c\r")?;
//! cp.finish_compile()?;
//! for _ in 0..records {
//!     cp.run_tick(true, &mut host)?;
//! }
//! cp.finish();
//! ```

pub mod action;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod logger;
pub mod runtime;
pub mod shutdown;
pub mod signals;
pub mod simulate;
pub mod terminal;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use action::{Action, Program};
pub use checkpoint::{Checkpoint, DEFAULT_INTERVAL, Phase};
pub use error::{CheckpointError, Result};
pub use format::Formatter;
pub use host::{Host, TotalsLabels};
pub use terminal::{Console, Sink, StdConsole};
