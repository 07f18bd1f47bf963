//! Signal set for `wait=SIG` actions.
//!
//! Signals named by `wait` actions are collected while compiling and
//! blocked once when compilation finishes. A blocked signal stays pending
//! until [`SignalSet::wait`] consumes it, so a signal that arrives before the
//! executor reaches the `wait` action is never lost.
//!
//! Blocking must happen before the process spawns helper threads: threads
//! inherit the mask at creation, and an unblocked thread would otherwise
//! receive the signal and run its default disposition.

pub use imp::{Signal, SignalSet, decode_signal};

#[cfg(unix)]
mod imp {
    use crate::error::{CheckpointError, Result};
    use nix::sys::signal::{SigSet, SigmaskHow, sigprocmask};
    use std::str::FromStr;

    pub use nix::sys::signal::Signal;

    /// Resolve `USR1`, `SIGUSR1`, `sigusr1` or `10` to a signal.
    pub fn decode_signal(name: &str) -> Result<Signal> {
        let unknown = || CheckpointError::UnknownSignal(name.to_string());
        let trimmed = name.trim();

        if let Ok(number) = trimmed.parse::<i32>() {
            return Signal::try_from(number).map_err(|_| unknown());
        }

        let upper = trimmed.to_ascii_uppercase();
        let full = if upper.starts_with("SIG") {
            upper
        } else {
            format!("SIG{upper}")
        };
        Signal::from_str(&full).map_err(|_| unknown())
    }

    /// Signals referenced by `wait` actions.
    #[derive(Debug, Clone)]
    pub struct SignalSet {
        set: SigSet,
        blocked: bool,
    }

    impl Default for SignalSet {
        fn default() -> Self {
            Self {
                set: SigSet::empty(),
                blocked: false,
            }
        }
    }

    impl SignalSet {
        pub fn add(&mut self, signal: Signal) {
            self.set.add(signal);
        }

        pub fn contains(&self, signal: Signal) -> bool {
            self.set.contains(signal)
        }

        pub fn is_empty(&self) -> bool {
            self.set.iter().next().is_none()
        }

        pub fn signals(&self) -> Vec<Signal> {
            self.set.iter().collect()
        }

        pub const fn is_blocked(&self) -> bool {
            self.blocked
        }

        /// Block every signal in the set. Only the first call has an effect.
        pub fn block(&mut self) -> Result<()> {
            if self.blocked {
                return Ok(());
            }
            sigprocmask(SigmaskHow::SIG_BLOCK, Some(&self.set), None)
                .map_err(|errno| CheckpointError::SignalMask(errno.into()))?;
            self.blocked = true;
            Ok(())
        }

        /// Suspend until any signal of the set is delivered.
        pub fn wait(&self) -> std::io::Result<Signal> {
            self.set.wait().map_err(std::io::Error::from)
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use crate::error::{CheckpointError, Result};

    /// Placeholder: no signal can be named on this platform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Signal {}

    pub fn decode_signal(name: &str) -> Result<Signal> {
        Err(CheckpointError::UnknownSignal(name.to_string()))
    }

    #[derive(Debug, Clone, Default)]
    pub struct SignalSet {
        blocked: bool,
    }

    impl SignalSet {
        pub fn add(&mut self, signal: Signal) {
            match signal {}
        }

        pub fn contains(&self, signal: Signal) -> bool {
            match signal {}
        }

        pub fn is_empty(&self) -> bool {
            true
        }

        pub fn signals(&self) -> Vec<Signal> {
            Vec::new()
        }

        pub const fn is_blocked(&self) -> bool {
            self.blocked
        }

        pub fn block(&mut self) -> Result<()> {
            self.blocked = true;
            Ok(())
        }

        pub fn wait(&self) -> std::io::Result<Signal> {
            Err(std::io::ErrorKind::Unsupported.into())
        }
    }
}
