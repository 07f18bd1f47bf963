//! Checkpoint actions and the compiled program.
//!
//! # Module Structure
//!
//! ```text
//! action/
//! ├── compile    # spec string → Action
//! ├── unquote    # quote stripping and escape resolution
//! └── mod.rs     # Action, Program (this file)
//! ```

mod compile;
mod unquote;

pub use compile::parse_action;
pub use unquote::unquote;

use crate::signals::Signal;
use std::time::Duration;

// ============================================================================
// Action
// ============================================================================

/// One compiled checkpoint action.
///
/// Each variant carries exactly the payload its action needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `.` or `dot`: print a dot to the listing stream.
    Dot,
    /// `bell`: ring the terminal bell.
    Bell,
    /// `echo`: print the default "Write/Read checkpoint N" message.
    Echo,
    /// `echo=TEXT`: print a rendered template to the diagnostic stream.
    EchoText(String),
    /// `ttyout=TEXT`: render a template directly onto the terminal.
    TtyOut(String),
    /// `sleep=N`: pause for N seconds.
    Sleep(Duration),
    /// `exec=COMMAND`: run a command through the host.
    Exec(String),
    /// `totals`: print running byte totals.
    Totals,
    /// `wait=SIG`: suspend until the signal arrives.
    Wait(Signal),
}

impl Action {
    /// Short action name as written in specs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Bell => "bell",
            Self::Echo | Self::EchoText(_) => "echo",
            Self::TtyOut(_) => "ttyout",
            Self::Sleep(_) => "sleep",
            Self::Exec(_) => "exec",
            Self::Totals => "totals",
            Self::Wait(_) => "wait",
        }
    }
}

// ============================================================================
// Program
// ============================================================================

/// Ordered list of actions, in the order they were configured.
///
/// Only the owning checkpoint context can append; everyone else reads.
#[derive(Debug, Default, Clone)]
pub struct Program {
    actions: Vec<Action>,
}

impl Program {
    pub(crate) fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
