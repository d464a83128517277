//! Reported constraint failures.

use std::fmt;

use rustc_hash::FxHashSet;
use tracing::warn;
use tt_ir::Iid;

use crate::kind::{ConstraintKind, Severity};

/// Failures between progress warnings.
const PROGRESS_INTERVAL: usize = 10_000;

/// One failed constraint.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CheckMessage {
    pub message: String,
    /// The statement the constraint was generated for.
    pub iid: Iid,
    /// The function the checked variable belongs to.
    pub function_iid: Option<Iid>,
    pub severity: Severity,
    pub kind: ConstraintKind,
}

impl fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] at {}", self.severity, self.kind, self.iid)?;
        if let Some(function) = self.function_iid {
            write!(f, " in {function}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Messages in report order, each reported once.
#[derive(Default)]
pub(crate) struct MessageLog {
    messages: Vec<CheckMessage>,
    seen: FxHashSet<CheckMessage>,
    errors: usize,
    warnings: usize,
}

impl MessageLog {
    pub(crate) fn report(&mut self, message: CheckMessage) {
        if self.seen.contains(&message) {
            return;
        }
        let (count, label) = match message.severity {
            Severity::Error => (&mut self.errors, "type errors"),
            Severity::Warning => (&mut self.warnings, "type warnings"),
        };
        *count += 1;
        if *count % PROGRESS_INTERVAL == 0 {
            warn!(count = *count, "{label} so far");
        }
        self.seen.insert(message.clone());
        self.messages.push(message);
    }

    pub(crate) fn errors(&self) -> usize {
        self.errors
    }

    pub(crate) fn warnings(&self) -> usize {
        self.warnings
    }

    pub(crate) fn into_messages(self) -> Vec<CheckMessage> {
        self.messages
    }
}

#[cfg(test)]
mod tests;
