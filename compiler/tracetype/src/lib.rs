//! Trace-driven type inference and checking.
//!
//! An [`Analysis`] owns one run's type lattice. Running it over a recorded
//! [`Trace`] and the values observed while recording:
//!
//! 1. ascribes a type to every observed value and joins them per variable
//!    into the inferred environment,
//! 2. replays the trace to a fixpoint under the configured precision,
//! 3. checks the trace against the stabilized environment.
//!
//! Separate analyses share nothing but the string interner and may run on
//! separate threads.

use std::sync::Once;

use tracing::debug;

pub use tt_check::{
    check, CheckConfig, CheckMessage, ConstraintKind, Severity, UnknownConstraintKind,
};
pub use tt_ir::{
    Iid, Name, Observations, ScopeId, SharedInterner, StringInterner, Trace, TraceBuilder, VarId,
    Variable,
};
pub use tt_replay::{
    replay, Bookkeeping, CallstackSensitivity, PrecisionConfig, ReplayOptions, ReplayResult,
    Sensitivity,
};
pub use tt_types::{
    ConfigError, Environment, FunctionLatticeKind, LatticeConfig, ObjectLatticeKind, TupleId,
    TypeLattice, TypePool,
};

/// Everything a run is configured by.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub lattice: LatticeConfig,
    pub precision: PrecisionConfig,
    pub replay: ReplayOptions,
    pub check: CheckConfig,
}

impl AnalysisConfig {
    /// Lattice from configuration names, everything else defaulted.
    pub fn from_lattice_names<'a>(
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            lattice: LatticeConfig::from_names(names)?,
            ..Self::default()
        })
    }
}

/// Outcome of one run.
#[derive(Clone, Debug)]
pub struct AnalysisReport {
    /// Stabilized types of the written variables.
    pub environment: Environment,
    /// Types ascribed from the observed values.
    pub inferred: Environment,
    pub rounds: u32,
    pub bookkeeping: Bookkeeping,
    pub messages: Vec<CheckMessage>,
}

impl AnalysisReport {
    pub fn errors(&self) -> impl Iterator<Item = &CheckMessage> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckMessage> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Warning)
    }
}

/// One analysis run context.
pub struct Analysis {
    lattice: TypeLattice,
    config: AnalysisConfig,
}

impl Analysis {
    pub fn new(interner: SharedInterner, config: AnalysisConfig) -> Self {
        Self {
            lattice: TypeLattice::new(TypePool::new(interner), config.lattice),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The pool the report's types live in.
    pub fn pool(&self) -> &TypePool {
        self.lattice.pool()
    }

    pub fn lattice_mut(&mut self) -> &mut TypeLattice {
        &mut self.lattice
    }

    /// Infer and check the types of `trace`.
    ///
    /// # Panics
    /// Panics if the replay does not reach a fixpoint within the configured
    /// round cap.
    #[tracing::instrument(level = "debug", skip_all, fields(
        statements = trace.statements.len(),
    ))]
    pub fn run(&mut self, trace: &Trace, observations: &Observations) -> AnalysisReport {
        let inferred = self
            .lattice
            .ascribe_observations(&trace.variables, observations);
        let ReplayResult {
            environment,
            inferred,
            rounds,
            bookkeeping,
        } = replay(
            &mut self.lattice,
            trace,
            inferred,
            &self.config.precision,
            &self.config.replay,
        );
        let messages = check(
            &mut self.lattice,
            trace,
            &environment,
            &inferred,
            &self.config.check,
        );
        debug!(
            rounds,
            messages = messages.len(),
            cached_joins = self.lattice.cached_joins(),
            "analysis finished"
        );
        AnalysisReport {
            environment,
            inferred,
            rounds,
            bookkeeping,
            messages,
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=tt_replay=debug` (or
/// any other filter); set `TRACETYPE_LOG_TREE` for indented span trees.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());
        if std::env::var_os("TRACETYPE_LOG_TREE").is_some() {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .init();
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true))
                .init();
        }
    });
}
