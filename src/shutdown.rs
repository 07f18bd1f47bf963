//! Ctrl+C handling for the simulated run.
//!
//! The first Ctrl+C asks the record loop to stop so the terminal can be
//! restored; a second one exits immediately.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Exit status for a second interrupt (128 + SIGINT).
const INTERRUPTED: i32 = 130;

/// Setup the global Ctrl+C handler. Call once, after the checkpoint
/// program is sealed: the handler thread inherits the signal mask.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if SHUTDOWN.swap(true, Ordering::SeqCst) {
            std::process::exit(INTERRUPTED);
        }
        crate::log!("checkpoint"; "interrupted, finishing...");
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn reset() {
        SHUTDOWN.store(false, Ordering::SeqCst);
    }

    #[test]
    fn test_shutdown_flag() {
        reset();
        assert!(!is_shutdown());

        SHUTDOWN.store(true, Ordering::SeqCst);
        assert!(is_shutdown());

        reset();
        assert!(!is_shutdown());
    }
}
