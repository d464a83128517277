//! Fixpoint replay of a trace over abstracted variables.
//!
//! Starting from the inferred environment (the ascribed types of observed
//! values), the replayer propagates types along the trace's dataflow:
//! writes, field reads and call boundaries. Variables are abstracted per
//! [`PrecisionConfig`]; when abstraction merges variables, writes become
//! weak and the trace is replayed until no stored type changes.

mod abstraction;
mod dataflow;
mod precision;
mod store;

use tracing::{debug, trace};
use tt_ir::Trace;
use tt_types::{Environment, TypeLattice};

pub use abstraction::{
    call_abstraction, CallAbstraction, FunctionEntry, GenericInstantiations, NoCallAbstraction,
    ParameterTypesCallstack, SyntacticCallstack,
};
pub use precision::{CallstackSensitivity, PrecisionConfig, Sensitivity};
pub use store::{AbstractStore, Bookkeeping};

use dataflow::RoundVisitor;

/// Round cap used unless configured otherwise.
pub const DEFAULT_MAX_ROUNDS: u32 = 10_000;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ReplayOptions {
    /// Replaying more rounds than this is a non-termination bug.
    pub max_rounds: u32,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// Outcome of a replay.
#[derive(Clone, Debug)]
pub struct ReplayResult {
    /// The stabilized type of every concrete variable that was written.
    pub environment: Environment,
    /// The environment the replay started from.
    pub inferred: Environment,
    pub rounds: u32,
    pub bookkeeping: Bookkeeping,
}

/// Propagate types through `trace` until the store stabilizes.
///
/// # Panics
/// Panics if the store is still changing after `options.max_rounds`
/// rounds, or if a field read finds an unresolved recursive reference.
#[tracing::instrument(level = "debug", skip_all, fields(
    statements = trace.statements.len(),
    variables = trace.variables.len(),
))]
pub fn replay(
    lattice: &mut TypeLattice,
    trace: &Trace,
    inferred: Environment,
    precision: &PrecisionConfig,
    options: &ReplayOptions,
) -> ReplayResult {
    let mut store = AbstractStore::new(&trace.variables, *precision, call_abstraction(precision));
    let mut rounds = 0;
    loop {
        rounds += 1;
        assert!(
            rounds <= options.max_rounds,
            "non-termination: types still changing after {} replay rounds",
            options.max_rounds
        );
        store.clean();
        let mut visitor = RoundVisitor::new(lattice, &mut store, &inferred);
        for statement in &trace.statements {
            visitor.statement(statement);
        }
        trace!(round = rounds, dirty = store.is_dirty(), "replayed round");
        if !(precision.merges_variables() && store.is_dirty()) {
            break;
        }
    }

    let environment: Environment = trace
        .variables
        .ids()
        .filter_map(|var| store.peek(var).map(|ty| (var, ty)))
        .collect();
    debug!(
        rounds,
        typed = environment.len(),
        abstract_variables = store.abstract_variables().len(),
        "replay reached a fixpoint"
    );
    ReplayResult {
        environment,
        inferred,
        rounds,
        bookkeeping: store.into_bookkeeping(),
    }
}
