//! Parsing of action spec strings.

use super::{Action, unquote};
use crate::error::{CheckpointError, Result};
use crate::signals::decode_signal;
use std::time::Duration;

/// Parse one action spec such as `dot`, `echo=%u` or `sleep=5`.
///
/// Keywords without a payload must match exactly (`echo` vs `echo=...`);
/// anything unrecognized is an [`CheckpointError::UnknownAction`].
pub fn parse_action(spec: &str) -> Result<Action> {
    let action = match spec {
        "." | "dot" => Action::Dot,
        "bell" => Action::Bell,
        "echo" => Action::Echo,
        "totals" => Action::Totals,
        _ => {
            let Some((keyword, arg)) = spec.split_once('=') else {
                return Err(CheckpointError::UnknownAction(spec.to_string()));
            };
            match keyword {
                "echo" => Action::EchoText(unquote(arg)),
                "exec" => Action::Exec(unquote(arg)),
                "ttyout" => Action::TtyOut(unquote(arg)),
                "sleep" => Action::Sleep(parse_timeout(spec, arg)?),
                "wait" => Action::Wait(decode_signal(arg)?),
                _ => return Err(CheckpointError::UnknownAction(spec.to_string())),
            }
        }
    };
    Ok(action)
}

/// Seconds for `sleep=N`; the whole spec is echoed back on error.
fn parse_timeout(spec: &str, arg: &str) -> Result<Duration> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CheckpointError::InvalidTimeout(spec.to_string()));
    }
    arg.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| CheckpointError::InvalidTimeout(spec.to_string()))
}
