//! Output streams used by checkpoint actions.
//!
//! Three destinations exist:
//! - the listing stream (`dot`), normally stdout
//! - the diagnostic stream (`echo`), stderr
//! - the controlling terminal device (`bell`, `ttyout`), opened lazily
//!
//! [`Console`] hands them out so the executor never touches process-wide
//! handles directly.

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};

/// Fallback width when nothing better is known.
pub const DEFAULT_WIDTH: usize = 80;

/// Path of the controlling terminal.
#[cfg(not(windows))]
const TTY_PATH: &str = "/dev/tty";
#[cfg(windows)]
const TTY_PATH: &str = "CONOUT$";

// ============================================================================
// Sink / Console
// ============================================================================

/// A writable stream that may know the width of the terminal behind it.
pub trait Sink: Write {
    /// Window width in columns, if the stream is a terminal.
    fn probe_width(&self) -> Option<usize> {
        None
    }
}

/// Factory for the streams checkpoint actions write to.
pub trait Console {
    /// Stream for listing output (`dot`).
    fn listing(&mut self) -> &mut dyn Sink;

    /// Stream for diagnostics (`echo`).
    fn diagnostics(&mut self) -> &mut dyn Sink;

    /// Open the controlling terminal for writing.
    fn open_tty(&mut self) -> io::Result<Box<dyn Sink>>;
}

// ============================================================================
// Width
// ============================================================================

/// Width of the terminal behind `sink`.
///
/// Order: window-size probe, then `$COLUMNS`, then [`DEFAULT_WIDTH`].
pub fn sink_width(sink: &dyn Sink) -> usize {
    resolve_width(
        sink.probe_width(),
        std::env::var("COLUMNS").ok().as_deref(),
    )
}

/// Pick a width from a probe result and a `COLUMNS` value.
///
/// Zero from either source is ignored.
pub fn resolve_width(probed: Option<usize>, columns: Option<&str>) -> usize {
    if let Some(width) = probed.filter(|&w| w > 0) {
        return width;
    }
    columns
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|&w| w > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Ask the terminal for its size.
fn probe_terminal() -> Option<usize> {
    crossterm::terminal::size()
        .ok()
        .map(|(cols, _rows)| usize::from(cols))
}

// ============================================================================
// Standard streams
// ============================================================================

/// Which standard stream a [`StdStream`] forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdTarget {
    Stdout,
    Stderr,
}

/// Thin owned handle over stdout or stderr.
#[derive(Debug)]
pub struct StdStream(StdTarget);

impl StdStream {
    pub const fn new(target: StdTarget) -> Self {
        Self(target)
    }
}

impl Write for StdStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0 {
            StdTarget::Stdout => io::stdout().write(buf),
            StdTarget::Stderr => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0 {
            StdTarget::Stdout => io::stdout().flush(),
            StdTarget::Stderr => io::stderr().flush(),
        }
    }
}

impl Sink for StdStream {
    fn probe_width(&self) -> Option<usize> {
        let is_tty = match self.0 {
            StdTarget::Stdout => io::stdout().is_terminal(),
            StdTarget::Stderr => io::stderr().is_terminal(),
        };
        if is_tty { probe_terminal() } else { None }
    }
}

/// The controlling terminal device.
#[derive(Debug)]
pub struct TtyDevice(File);

impl TtyDevice {
    pub fn open() -> io::Result<Self> {
        OpenOptions::new().write(true).open(TTY_PATH).map(Self)
    }
}

impl Write for TtyDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl Sink for TtyDevice {
    fn probe_width(&self) -> Option<usize> {
        probe_terminal()
    }
}

/// Console backed by the process's standard streams and `/dev/tty`.
#[derive(Debug)]
pub struct StdConsole {
    listing: StdStream,
    diagnostics: StdStream,
}

impl StdConsole {
    /// Listing goes to stdout, unless the archive itself is written there.
    pub const fn new(listing_to_stderr: bool) -> Self {
        let listing = if listing_to_stderr {
            StdTarget::Stderr
        } else {
            StdTarget::Stdout
        };
        Self {
            listing: StdStream::new(listing),
            diagnostics: StdStream::new(StdTarget::Stderr),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Console for StdConsole {
    fn listing(&mut self) -> &mut dyn Sink {
        &mut self.listing
    }

    fn diagnostics(&mut self) -> &mut dyn Sink {
        &mut self.diagnostics
    }

    fn open_tty(&mut self) -> io::Result<Box<dyn Sink>> {
        Ok(Box::new(TtyDevice::open()?))
    }
}

// ============================================================================
// Lazily opened terminal
// ============================================================================

/// Cached terminal handle: opened on first use, at most once.
#[derive(Default)]
pub enum TtySlot {
    #[default]
    Unopened,
    Open(Box<dyn Sink>),
    /// Opening failed; terminal actions are silently skipped from now on.
    Unavailable,
}

impl TtySlot {
    /// Return the terminal, opening it through `console` on first call.
    pub fn get_or_open(&mut self, console: &mut dyn Console) -> Option<&mut dyn Sink> {
        if matches!(self, Self::Unopened) {
            *self = match console.open_tty() {
                Ok(tty) => Self::Open(tty),
                Err(e) => {
                    crate::debug!("tty"; "cannot open terminal: {}", e);
                    Self::Unavailable
                }
            };
        }
        self.get()
    }

    /// The terminal, only if it is already open.
    pub fn get(&mut self) -> Option<&mut dyn Sink> {
        match self {
            Self::Open(tty) => Some(tty.as_mut()),
            _ => None,
        }
    }

    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// Drop the handle, closing the device.
    pub fn close(&mut self) {
        if let Self::Open(tty) = self {
            tty.flush().ok();
        }
        *self = Self::Unopened;
    }
}

impl std::fmt::Debug for TtySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unopened => f.write_str("Unopened"),
            Self::Open(_) => f.write_str("Open"),
            Self::Unavailable => f.write_str("Unavailable"),
        }
    }
}
