//! Checkpoint status templates.
//!
//! Templates are copied to the output verbatim except for `%` directives.
//! A directive may carry an argument in braces right after the `%`:
//!
//! | Directive   | Output                                                    |
//! |-------------|-----------------------------------------------------------|
//! | `%c`        | the built-in status line ([`DEFAULT_FORMAT`])             |
//! | `%u`        | checkpoint number                                         |
//! | `%s`        | "read" or "write"                                         |
//! | `%d`        | seconds elapsed                                           |
//! | `%{R,W,D}T` | byte totals, optionally relabelled                        |
//! | `%{fmt}t`   | local time, `strftime`-style pattern (default `%c`)       |
//! | `%{N}*`     | spaces up to column N (default: terminal width)           |
//!
//! Unknown directives are echoed as-is. A carriage return resets the
//! column to zero, which is how `ttyout` keeps rewriting one line.

mod labels;

pub use labels::{LabelError, MAX_LABELS, split_labels};

use crate::host::{Host, TotalsLabels};
use crate::terminal::{Sink, sink_width};
use chrono::format::{Item, StrftimeItems};
use chrono::{Local, TimeZone};
use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

/// Status line used by `%c`: timestamp, elapsed seconds, totals, then pad
/// and return to column 0 so the next checkpoint overwrites it.
pub const DEFAULT_FORMAT: &str = "%{%Y-%m-%d %H:%M:%S}t: %ds, %{read,wrote}T%*\r";

/// Message printed by a bare `echo` when writing.
pub const WRITE_CHECKPOINT: &str = "Write checkpoint %u";

/// Message printed by a bare `echo` when reading.
pub const READ_CHECKPOINT: &str = "Read checkpoint %u";

/// Shown by `%t` when the local time cannot be determined.
const TIME_PLACEHOLDER: &str = "????-??-?? ??:??:??";

/// Whether `%c` may still expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nesting {
    Top,
    /// Inside the built-in format; `%c` is printed literally.
    Builtin,
}

/// Renders templates for one checkpoint.
pub struct Formatter<'h> {
    host: &'h mut dyn Host,
    is_write: bool,
    checkpoint: u64,
    line_reset: bool,
}

impl<'h> Formatter<'h> {
    pub fn new(host: &'h mut dyn Host, is_write: bool, checkpoint: u64) -> Self {
        Self {
            host,
            is_write,
            checkpoint,
            line_reset: false,
        }
    }

    /// Whether any rendered template emitted a carriage return.
    pub const fn line_reset(&self) -> bool {
        self.line_reset
    }

    /// The localized default `echo` message for this checkpoint's direction.
    pub fn default_message(&self) -> String {
        let msgid = if self.is_write {
            WRITE_CHECKPOINT
        } else {
            READ_CHECKPOINT
        };
        self.host.localize(msgid).into_owned()
    }

    /// Render `template` onto `out`, starting at `column`.
    ///
    /// Returns the column the cursor ends on. The stream is flushed.
    pub fn render(
        &mut self,
        out: &mut dyn Sink,
        column: usize,
        template: &str,
    ) -> io::Result<usize> {
        let column = self.render_template(out, column, template, Nesting::Top)?;
        out.flush()?;
        Ok(column)
    }

    fn render_template(
        &mut self,
        out: &mut dyn Sink,
        mut column: usize,
        template: &str,
        nesting: Nesting,
    ) -> io::Result<usize> {
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                column = self.literal(out, column, c)?;
                continue;
            }

            let mut arg = None;
            if let Some(after_brace) = chars.as_str().strip_prefix('{') {
                match take_arg(after_brace) {
                    Some(captured) => {
                        chars = captured.rest.chars();
                        arg = Some(captured);
                    }
                    None => {
                        // No closing brace: print "%{" and carry on after it
                        chars.next();
                        out.write_all(b"%{")?;
                        column += 2;
                        continue;
                    }
                }
            }

            let Some(directive) = chars.next() else {
                // Template ends right after the '%'
                out.write_all(b"%")?;
                column += 1;
                if let Some(arg) = arg {
                    write!(out, "{{{}}}", arg.raw)?;
                    column += arg.raw.chars().count() + 2;
                }
                break;
            };

            let arg = arg.map(|a| a.value);
            column = self.directive(out, column, directive, arg.as_deref(), nesting)?;
        }

        Ok(column)
    }

    fn literal(&mut self, out: &mut dyn Sink, column: usize, c: char) -> io::Result<usize> {
        let mut buf = [0u8; 4];
        out.write_all(c.encode_utf8(&mut buf).as_bytes())?;
        if c == '\r' {
            self.line_reset = true;
            Ok(0)
        } else {
            Ok(column + 1)
        }
    }

    fn directive(
        &mut self,
        out: &mut dyn Sink,
        column: usize,
        directive: char,
        arg: Option<&str>,
        nesting: Nesting,
    ) -> io::Result<usize> {
        let column = match directive {
            'c' if nesting == Nesting::Top => {
                self.render_template(out, column, DEFAULT_FORMAT, Nesting::Builtin)?
            }
            'u' => column + emit(out, &self.checkpoint.to_string())?,
            's' => {
                let word = if self.is_write { "write" } else { "read" };
                let word = self.host.localize(word).into_owned();
                column + emit(out, &word)?
            }
            'd' => {
                let secs = self.host.compute_duration().as_secs_f64();
                column + emit(out, &format!("{secs:.0}"))?
            }
            'T' => {
                self.host.compute_duration();
                let labels = self.totals_labels(arg);
                column + self.host.format_totals(out, &labels, ',')?
            }
            't' => column + emit(out, &local_time(arg.unwrap_or("%c")))?,
            '*' => {
                let width = arg
                    .and_then(|a| a.parse::<usize>().ok())
                    .unwrap_or_else(|| sink_width(&*out));
                let pad = width.saturating_sub(column);
                write!(out, "{:pad$}", "")?;
                column + pad
            }
            other => {
                write!(out, "%{other}")?;
                column + 2
            }
        };
        Ok(column)
    }

    /// Labels for `%T`: the argument's words, or the defaults if it is
    /// missing or malformed.
    fn totals_labels(&mut self, arg: Option<&str>) -> TotalsLabels {
        let Some(arg) = arg else {
            return TotalsLabels::default();
        };
        match split_labels(arg) {
            Ok(words) => TotalsLabels::with_overrides(words),
            Err(e) => {
                self.host.report_error(&e.to_string());
                TotalsLabels::default()
            }
        }
    }
}

/// A `{...}` argument: unescaped value, raw text, and what follows `}`.
struct Arg<'a> {
    value: String,
    raw: &'a str,
    rest: &'a str,
}

/// Capture an argument from text just past the opening brace.
///
/// Ends at the first `}` not preceded by a backslash. Returns `None` when
/// there is no closing brace.
fn take_arg(input: &str) -> Option<Arg<'_>> {
    let mut value = String::new();
    let mut chars = input.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '}' => {
                return Some(Arg {
                    value,
                    raw: &input[..i],
                    rest: &input[i + 1..],
                });
            }
            '\\' => match chars.next() {
                Some((_, escaped @ ('}' | '\\'))) => value.push(escaped),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => value.push('\\'),
            },
            c => value.push(c),
        }
    }
    None
}

/// Write `text` and return its width in characters.
fn emit(out: &mut dyn Sink, text: &str) -> io::Result<usize> {
    out.write_all(text.as_bytes())?;
    Ok(text.chars().count())
}

/// Current local time formatted with a `strftime`-style pattern.
///
/// Falls back to a placeholder if the time cannot be converted or the
/// pattern is invalid.
fn local_time(pattern: &str) -> String {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return TIME_PLACEHOLDER.to_string();
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| {
            let secs = i64::try_from(d.as_secs()).ok()?;
            Local.timestamp_opt(secs, d.subsec_nanos()).single()
        });

    match now {
        Some(now) => now.format_with_items(items.into_iter()).to_string(),
        None => TIME_PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeHost, SharedSink};
    use std::time::Duration;

    fn render(template: &str, column: usize, host: &mut FakeHost) -> (String, usize, bool) {
        let mut sink = SharedSink::with_width(20);
        let mut fmt = Formatter::new(host, true, 42);
        let col = fmt.render(&mut sink, column, template).unwrap();
        (sink.contents(), col, fmt.line_reset())
    }

    #[test]
    fn test_literal_text() {
        let (out, col, reset) = render("abc", 0, &mut FakeHost::default());
        assert_eq!(out, "abc");
        assert_eq!(col, 3);
        assert!(!reset);
    }

    #[test]
    fn test_column_starts_from_offset() {
        let (_, col, _) = render("abc", 7, &mut FakeHost::default());
        assert_eq!(col, 10);
    }

    #[test]
    fn test_checkpoint_number() {
        let (out, col, _) = render("%u", 0, &mut FakeHost::default());
        assert_eq!(out, "42");
        assert_eq!(col, 2);
    }

    #[test]
    fn test_operation_word() {
        let mut host = FakeHost::default();
        let (out, _, _) = render("%s", 0, &mut host);
        assert_eq!(out, "write");

        let mut sink = SharedSink::default();
        Formatter::new(&mut host, false, 1)
            .render(&mut sink, 0, "%s")
            .unwrap();
        assert_eq!(sink.contents(), "read");
    }

    #[test]
    fn test_duration_rounds_to_seconds() {
        let mut host = FakeHost::default();
        host.elapsed = Duration::from_millis(2600);
        let (out, col, _) = render("%ds", 0, &mut host);
        assert_eq!(out, "3s");
        assert_eq!(col, 2);
    }

    #[test]
    fn test_explicit_padding() {
        let (out, col, _) = render("%{5}*", 0, &mut FakeHost::default());
        assert_eq!(out, "     ");
        assert_eq!(col, 5);
    }

    #[test]
    fn test_padding_counts_existing_columns() {
        let (out, col, _) = render("ab%{5}*|", 0, &mut FakeHost::default());
        assert_eq!(out, "ab   |");
        assert_eq!(col, 6);
    }

    #[test]
    fn test_no_padding_past_width() {
        let (out, col, _) = render("abcdef%{3}*", 0, &mut FakeHost::default());
        assert_eq!(out, "abcdef");
        assert_eq!(col, 6);
    }

    #[test]
    fn test_padding_defaults_to_terminal_width() {
        let (out, col, _) = render("%*", 0, &mut FakeHost::default());
        assert_eq!(out.len(), 20);
        assert_eq!(col, 20);
    }

    #[test]
    fn test_invalid_width_falls_back_to_terminal() {
        let (out, _, _) = render("%{wide}*", 15, &mut FakeHost::default());
        assert_eq!(out, "     ");
    }

    #[test]
    fn test_width_with_spaces_is_invalid() {
        let (out, col, _) = render("%{ 5 }*", 15, &mut FakeHost::default());
        assert_eq!(out, "     ");
        assert_eq!(col, 20);
    }

    #[test]
    fn test_carriage_return_resets_column() {
        let (out, col, reset) = render("abc\rde", 0, &mut FakeHost::default());
        assert_eq!(out, "abc\rde");
        assert_eq!(col, 2);
        assert!(reset);
    }

    #[test]
    fn test_unknown_directive_passthrough() {
        let (out, col, _) = render("%q%%", 0, &mut FakeHost::default());
        assert_eq!(out, "%q%%");
        assert_eq!(col, 4);
    }

    #[test]
    fn test_trailing_percent() {
        let (out, col, _) = render("100%", 0, &mut FakeHost::default());
        assert_eq!(out, "100%");
        assert_eq!(col, 4);

        let (out, _, _) = render("x%{5}", 0, &mut FakeHost::default());
        assert_eq!(out, "x%{5}");
    }

    #[test]
    fn test_unterminated_argument_is_literal() {
        let (out, col, _) = render("%{5*", 0, &mut FakeHost::default());
        assert_eq!(out, "%{5*");
        assert_eq!(col, 4);
    }

    #[test]
    fn test_escaped_closing_brace_in_argument() {
        let (out, _, _) = render(r"%{a\}b}T", 0, &mut FakeHost::default());
        assert_eq!(out, "[a}b|W|D]");
    }

    #[test]
    fn test_totals_labels() {
        let mut host = FakeHost::default();
        let (out, col, _) = render("%T", 0, &mut host);
        assert_eq!(out, "[R|W|D]");
        assert_eq!(col, 7);

        let (out, _, _) = render("%{in,out}T", 0, &mut host);
        assert_eq!(out, "[in|out|D]");
        assert!(host.errors.is_empty());
    }

    #[test]
    fn test_empty_label_argument_keeps_defaults() {
        let mut host = FakeHost::default();
        let (out, _, _) = render("%{}T", 0, &mut host);
        assert_eq!(out, "[R|W|D]");
        assert!(host.errors.is_empty());
    }

    #[test]
    fn test_too_many_labels_reported_and_defaulted() {
        let mut host = FakeHost::default();
        let (out, _, _) = render("<%{a,b,c,d}T>", 0, &mut host);
        assert_eq!(out, "<[R|W|D]>");
        assert_eq!(host.errors, vec!["too many words in 'a,b,c,d'".to_string()]);
    }

    #[test]
    fn test_totals_recomputes_duration() {
        let mut host = FakeHost::default();
        render("%T", 0, &mut host);
        assert_eq!(host.duration_calls, 1);
    }

    #[test]
    fn test_time_with_pattern() {
        let (out, col, _) = render("%{%Y}t", 0, &mut FakeHost::default());
        assert_eq!(out.len(), 4);
        assert!(out.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(col, 4);
    }

    #[test]
    fn test_time_invalid_pattern_placeholder() {
        let (out, _, _) = render("%{%Q}t", 0, &mut FakeHost::default());
        assert_eq!(out, TIME_PLACEHOLDER);
    }

    #[test]
    fn test_default_format_expands_once() {
        let mut host = FakeHost::default();
        host.elapsed = Duration::from_secs(5);
        let (out, col, reset) = render("%c", 0, &mut host);

        // "YYYY-MM-DD HH:MM:SS: 5s, [read|wrote|D]" padded to 20 is a no-op
        assert!(out.ends_with(": 5s, [read|wrote|D]\r"));
        assert_eq!(col, 0);
        assert!(reset);
    }

    #[test]
    fn test_nested_directive_letter_c_is_literal() {
        let mut host = FakeHost::default();
        let mut sink = SharedSink::default();
        let mut fmt = Formatter::new(&mut host, true, 1);
        let col = fmt
            .render_template(&mut sink, 0, "%c", Nesting::Builtin)
            .unwrap();
        assert_eq!(sink.contents(), "%c");
        assert_eq!(col, 2);
    }

    #[test]
    fn test_default_message() {
        let mut host = FakeHost::default();
        assert_eq!(
            Formatter::new(&mut host, true, 1).default_message(),
            "Write checkpoint %u"
        );
        assert_eq!(
            Formatter::new(&mut host, false, 1).default_message(),
            "Read checkpoint %u"
        );
    }
}
