//! Checkpoint error types.

use crate::checkpoint::Phase;
use thiserror::Error;

/// Errors raised while compiling or driving checkpoint actions.
///
/// The first three variants are configuration errors: the host is expected
/// to report them and stop before any archiving work begins.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("{0}: unknown checkpoint action")]
    UnknownAction(String),

    #[error("{0}: not a valid timeout")]
    InvalidTimeout(String),

    #[error("{0}: unknown signal")]
    UnknownSignal(String),

    /// An operation was invoked in the wrong lifecycle phase.
    #[error("cannot {operation} while checkpoints are {phase}")]
    Lifecycle {
        operation: &'static str,
        phase: Phase,
    },

    #[error("failed to block checkpoint signals: {0}")]
    SignalMask(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CheckpointError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_offending_spec() {
        let err = CheckpointError::UnknownAction("blink".into());
        assert_eq!(err.to_string(), "blink: unknown checkpoint action");

        let err = CheckpointError::InvalidTimeout("sleep=soon".into());
        assert_eq!(err.to_string(), "sleep=soon: not a valid timeout");
    }

    #[test]
    fn test_lifecycle_display() {
        let err = CheckpointError::Lifecycle {
            operation: "run checkpoint actions",
            phase: Phase::Compiling,
        };
        assert_eq!(
            err.to_string(),
            "cannot run checkpoint actions while checkpoints are compiling"
        );
    }
}
