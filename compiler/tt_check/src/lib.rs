//! Constraint checking over stabilized trace types.
//!
//! A second pass over the trace reads the environment a replay settled on
//! and generates one constraint per checked operation: object-ness of field
//! access bases, property existence and writability, call and return
//! matching, and the SJS classification and prototype rules. Failing
//! constraints of enabled kinds become deduplicated [`CheckMessage`]s.

mod constraint;
mod kind;
mod message;
mod monitor;

use tracing::debug;
use tt_ir::Trace;
use tt_types::{Environment, TypeLattice};

pub use kind::{ConstraintKind, Severity, UnknownConstraintKind};
pub use message::CheckMessage;

use monitor::Monitor;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckConfig {
    /// Kinds to report; empty reports every kind.
    pub enabled: Vec<ConstraintKind>,
    /// Classification, read-only, abstract-receiver and prototype rules.
    pub sjs_checks: bool,
    /// Report Top properties, callees and returns.
    pub toppy_checks: bool,
}

impl CheckConfig {
    #[must_use]
    pub fn with_sjs_checks(mut self) -> Self {
        self.sjs_checks = true;
        self
    }

    #[must_use]
    pub fn with_toppy_checks(mut self) -> Self {
        self.toppy_checks = true;
        self
    }

    #[must_use]
    pub fn only(mut self, kinds: impl IntoIterator<Item = ConstraintKind>) -> Self {
        self.enabled = kinds.into_iter().collect();
        self
    }

    pub fn is_enabled(&self, kind: ConstraintKind) -> bool {
        self.enabled.is_empty() || self.enabled.contains(&kind)
    }
}

/// Check `trace` against `env`, the environment a replay settled on.
///
/// `inferred` is the environment the replay started from; call arguments
/// are read as the join of both.
#[tracing::instrument(level = "debug", skip_all, fields(
    statements = trace.statements.len(),
    sjs = config.sjs_checks,
))]
pub fn check(
    lattice: &mut TypeLattice,
    trace: &Trace,
    env: &Environment,
    inferred: &Environment,
    config: &CheckConfig,
) -> Vec<CheckMessage> {
    let mut monitor = Monitor::new(lattice, trace, env, inferred, config);
    for statement in &trace.statements {
        monitor.statement(statement);
    }
    let log = monitor.log;
    debug!(
        errors = log.errors(),
        warnings = log.warnings(),
        "type checking finished"
    );
    log.into_messages()
}

#[cfg(test)]
mod tests;
