//! Running compiled actions at each checkpoint and cleaning up afterwards.

use crate::action::Action;
use crate::checkpoint::{Checkpoint, Phase};
use crate::debug;
use crate::error::{CheckpointError, Result};
use crate::format::Formatter;
use crate::host::Host;
use crate::terminal::{Sink, sink_width};
use std::io::Write;

impl Checkpoint {
    /// Count one record and fire the program on every `interval`-th call.
    ///
    /// Calling this before [`Checkpoint::finish_compile`] is an error. Once
    /// sealed, it does nothing unless checkpoints are enabled.
    pub fn run_tick(&mut self, is_write: bool, host: &mut dyn Host) -> Result<()> {
        if !self.sealed {
            return Err(CheckpointError::Lifecycle {
                operation: "run checkpoint actions",
                phase: self.phase,
            });
        }
        if self.phase != Phase::Running || self.interval == 0 {
            return Ok(());
        }

        self.ticks += 1;
        if self.ticks % self.interval == 0 {
            self.run_actions(is_write, host);
        }
        Ok(())
    }

    /// Walk the program once. A failing action never stops the others.
    fn run_actions(&mut self, is_write: bool, host: &mut dyn Host) {
        let Self {
            program,
            signals,
            ticks,
            console,
            tty,
            tty_dirty,
            ..
        } = self;
        let checkpoint = *ticks;

        for action in program.iter() {
            let outcome: anyhow::Result<()> = match action {
                Action::Dot => put(console.listing(), b"."),

                Action::Bell => match tty.get_or_open(console.as_mut()) {
                    Some(tty) => put(tty, b"\x07"),
                    None => Ok(()),
                },

                Action::Echo => echo(console.diagnostics(), host, is_write, checkpoint, None),

                Action::EchoText(template) => echo(
                    console.diagnostics(),
                    host,
                    is_write,
                    checkpoint,
                    Some(template),
                ),

                Action::TtyOut(template) => match tty.get_or_open(console.as_mut()) {
                    Some(tty) => {
                        let mut fmt = Formatter::new(host, is_write, checkpoint);
                        let rendered = fmt.render(tty, 0, template);
                        if fmt.line_reset() {
                            *tty_dirty = true;
                        }
                        rendered.map(drop).map_err(Into::into)
                    }
                    None => Ok(()),
                },

                Action::Sleep(duration) => {
                    std::thread::sleep(*duration);
                    Ok(())
                }

                Action::Exec(command) => {
                    let archive = host.current_archive().to_string();
                    host.exec_checkpoint_script(command, &archive, checkpoint)
                }

                Action::Totals => {
                    host.compute_duration();
                    host.print_totals().map_err(Into::into)
                }

                Action::Wait(_) => signals.wait().map(drop).map_err(Into::into),
            };

            if let Err(e) = outcome {
                debug!("checkpoint"; "{} action failed at #{}: {:#}", action.name(), checkpoint, e);
            }
        }
    }

    /// Restore the terminal and release it. Call once, at exit.
    ///
    /// Every `ttyout` action that left the cursor mid-line gets the line
    /// blanked; templates are not rendered again.
    pub fn finish(&mut self) {
        if self.interval == 0 {
            return;
        }

        let Self {
            program,
            tty,
            tty_dirty,
            ..
        } = self;

        for action in program.iter() {
            if !matches!(action, Action::TtyOut(_)) || !*tty_dirty {
                continue;
            }
            if let Some(tty) = tty.get()
                && let Err(e) = clear_line(tty)
            {
                debug!("checkpoint"; "failed to clear terminal line: {}", e);
            }
        }

        self.tty.close();
    }
}

/// Write bytes and flush.
fn put(out: &mut dyn Sink, bytes: &[u8]) -> anyhow::Result<()> {
    out.write_all(bytes)?;
    out.flush()?;
    Ok(())
}

/// `program: <message>` followed by a newline.
fn echo(
    out: &mut dyn Sink,
    host: &mut dyn Host,
    is_write: bool,
    checkpoint: u64,
    template: Option<&str>,
) -> anyhow::Result<()> {
    let prefix = format!("{}: ", host.program_name());
    out.write_all(prefix.as_bytes())?;

    let mut fmt = Formatter::new(host, is_write, checkpoint);
    let template = match template {
        Some(template) => template.to_string(),
        None => fmt.default_message(),
    };
    fmt.render(out, prefix.chars().count(), &template)?;

    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Overwrite the current line with spaces and return to column 0.
fn clear_line(tty: &mut dyn Sink) -> std::io::Result<()> {
    let width = sink_width(&*tty);
    write!(tty, "{:width$}\r", "")?;
    tty.flush()
}
