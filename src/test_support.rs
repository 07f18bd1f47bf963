//! In-memory streams and a scripted host for unit tests.

use crate::host::{Host, TotalsLabels};
use crate::terminal::{Console, Sink};
use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

/// Cloneable in-memory sink; clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedSink {
    buf: Rc<RefCell<Vec<u8>>>,
    width: Option<usize>,
}

impl SharedSink {
    pub fn with_width(width: usize) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }

    pub const fn width(&self) -> Option<usize> {
        self.width
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for SharedSink {
    fn probe_width(&self) -> Option<usize> {
        self.width
    }
}

/// Console whose three streams are [`SharedSink`]s.
#[derive(Debug, Clone)]
pub struct MemoryConsole {
    pub listing: SharedSink,
    pub diagnostics: SharedSink,
    pub tty: SharedSink,
    tty_available: bool,
    tty_opens: Rc<Cell<usize>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self {
            listing: SharedSink::default(),
            diagnostics: SharedSink::default(),
            tty: SharedSink::with_width(12),
            tty_available: true,
            tty_opens: Rc::default(),
        }
    }

    pub fn without_tty() -> Self {
        Self {
            tty_available: false,
            ..Self::new()
        }
    }

    pub fn tty_opens(&self) -> usize {
        self.tty_opens.get()
    }
}

impl Console for MemoryConsole {
    fn listing(&mut self) -> &mut dyn Sink {
        &mut self.listing
    }

    fn diagnostics(&mut self) -> &mut dyn Sink {
        &mut self.diagnostics
    }

    fn open_tty(&mut self) -> io::Result<Box<dyn Sink>> {
        self.tty_opens.set(self.tty_opens.get() + 1);
        if self.tty_available {
            Ok(Box::new(self.tty.clone()))
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, "no terminal"))
        }
    }
}

/// Host that records every call.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub elapsed: Duration,
    pub duration_calls: usize,
    pub totals_printed: usize,
    pub errors: Vec<String>,
    pub execs: Vec<(String, String, u64)>,
    pub fail_exec: bool,
}

impl Host for FakeHost {
    fn program_name(&self) -> &str {
        "tar"
    }

    fn compute_duration(&mut self) -> Duration {
        self.duration_calls += 1;
        self.elapsed
    }

    /// Writes `[read|written|deleted]`.
    fn format_totals(
        &mut self,
        out: &mut dyn Sink,
        labels: &TotalsLabels,
        _separator: char,
    ) -> io::Result<usize> {
        let text = format!("[{}|{}|{}]", labels.read, labels.written, labels.deleted);
        out.write_all(text.as_bytes())?;
        Ok(text.chars().count())
    }

    fn print_totals(&mut self) -> io::Result<()> {
        self.totals_printed += 1;
        Ok(())
    }

    fn current_archive(&self) -> &str {
        "test.tar"
    }

    fn exec_checkpoint_script(
        &mut self,
        command: &str,
        archive: &str,
        checkpoint: u64,
    ) -> anyhow::Result<()> {
        self.execs
            .push((command.to_string(), archive.to_string(), checkpoint));
        if self.fail_exec {
            anyhow::bail!("`{command}` exited with status 1");
        }
        Ok(())
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
