//! Trace representation for trace-driven type inference.
//!
//! This crate holds everything the inference engine consumes from the
//! outside world:
//!
//! - [`Name`] / [`StringInterner`]: interned identifiers shared by every run
//! - [`Iid`], [`ScopeId`], [`SourceLocation`]: program points and activations
//! - [`Variable`] / [`VariableTable`]: canonicalized storage locations
//! - [`Trace`]: the statement sequence of one recorded execution
//! - [`Observations`]: the runtime values seen while recording
//!
//! Traces are immutable once built; an analysis run only reads them.

mod iid;
mod interner;
mod name;
mod trace;
mod value;
mod variable;

pub use iid::{Iid, ScopeId, SourceLocation};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use trace::{
    ArgTmps, Expression, Info, PrimitiveKind, Statement, StatementKind, Trace, TraceBuilder,
};
pub use value::{
    CallKind, HeapObject, ObjectKind, ObjectRef, ObservedCall, ObservedHeap, Observations, Value,
};
pub use variable::{CallContext, VarId, Variable, VariableTable};
