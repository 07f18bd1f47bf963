//! Collaborators supplied by the archiving tool.
//!
//! The checkpoint engine only renders and dispatches. Everything it needs to
//! know about the archive (elapsed time, byte totals, the current archive
//! name) or to do on its behalf (run a script, report an error) goes through
//! [`Host`].

use std::borrow::Cow;
use std::io;
use std::time::Duration;

use crate::terminal::Sink;

/// Default `%T` labels for bytes read, written and deleted.
pub const DEFAULT_TOTALS_LABELS: [&str; 3] = ["R", "W", "D"];

/// Labels for the three totals columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsLabels {
    pub read: String,
    pub written: String,
    pub deleted: String,
}

impl Default for TotalsLabels {
    fn default() -> Self {
        let [read, written, deleted] = DEFAULT_TOTALS_LABELS.map(String::from);
        Self {
            read,
            written,
            deleted,
        }
    }
}

impl TotalsLabels {
    /// Override labels positionally; missing positions keep the defaults.
    pub fn with_overrides(words: Vec<String>) -> Self {
        let mut labels = Self::default();
        let slots = [&mut labels.read, &mut labels.written, &mut labels.deleted];
        for (slot, word) in slots.into_iter().zip(words) {
            *slot = word;
        }
        labels
    }
}

/// Services the host archiver provides to checkpoint actions.
pub trait Host {
    /// Name used to prefix `echo` output.
    fn program_name(&self) -> &str;

    /// Translate a message id. The default returns it unchanged.
    fn localize<'a>(&self, msgid: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(msgid)
    }

    /// Elapsed time since the host last reset its timer.
    fn compute_duration(&mut self) -> Duration;

    /// Write running byte totals to `out`, returning the number of columns
    /// written. Figures are joined by `separator`.
    fn format_totals(
        &mut self,
        out: &mut dyn Sink,
        labels: &TotalsLabels,
        separator: char,
    ) -> io::Result<usize>;

    /// Print the full totals report.
    fn print_totals(&mut self) -> io::Result<()>;

    /// Name of the archive currently being processed.
    fn current_archive(&self) -> &str;

    /// Run `command` and wait for it to finish.
    fn exec_checkpoint_script(
        &mut self,
        command: &str,
        archive: &str,
        checkpoint: u64,
    ) -> anyhow::Result<()>;

    /// Report a recoverable error. Processing continues afterwards.
    fn report_error(&mut self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        let labels = TotalsLabels::default();
        assert_eq!(labels.read, "R");
        assert_eq!(labels.written, "W");
        assert_eq!(labels.deleted, "D");
    }

    #[test]
    fn test_partial_overrides_keep_defaults() {
        let labels = TotalsLabels::with_overrides(vec!["read".into()]);
        assert_eq!(labels.read, "read");
        assert_eq!(labels.written, "W");
        assert_eq!(labels.deleted, "D");

        let labels = TotalsLabels::with_overrides(vec!["in".into(), "out".into()]);
        assert_eq!(labels.written, "out");
        assert_eq!(labels.deleted, "D");
    }
}
