//! The trace language.
//!
//! A trace is the linearized record of one program execution: first-order
//! statements over variables, plus `Info` pseudo-statements that mark call
//! boundaries and hints for the next operation.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{Iid, Name, ScopeId, SourceLocation, VarId, Variable, VariableTable};

/// Primitive value kinds produced by literal expressions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveKind {
    Number,
    String,
    Boolean,
    Undefined,
    Null,
}

/// Right-hand sides of writes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expression {
    Read { source: VarId },
    FieldRead { base: VarId, field: Name },
    /// Object allocation with the given prototype.
    New { proto: VarId },
    Primitive(PrimitiveKind),
}

/// Argument temporaries of a call; most calls have few arguments.
pub type ArgTmps = SmallVec<[VarId; 4]>;

/// `Info` pseudo-statements.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Info {
    /// Control entered a function body; `scope` is the new activation.
    FunctionEnter {
        function_tmp: VarId,
        base_tmp: VarId,
        args_tmps: ArgTmps,
        scope: ScopeId,
    },
    /// A call site is about to transfer control.
    FunctionInvocation {
        function_tmp: VarId,
        base_tmp: VarId,
        args_tmps: ArgTmps,
        is_constructor_call: bool,
    },
    /// Control leaves a function body returning `result_tmp`.
    FunctionReturn {
        function_tmp: VarId,
        result_tmp: VarId,
    },
    /// The caller receives the call result into `result_tmp`.
    FunctionResult { result_tmp: VarId },
    Coerce { source_tmp: VarId },
    ForInObject { source_tmp: VarId },
    NextNewIsArray,
    NextNewIsArguments,
    NextNewIsFunction,
    NextNewIsDotPrototype,
    NextFieldAccessIsDynamic,
}

impl Info {
    /// The callee temporary of call-related infos.
    pub fn function_tmp(&self) -> Option<VarId> {
        match self {
            Info::FunctionEnter { function_tmp, .. }
            | Info::FunctionInvocation { function_tmp, .. }
            | Info::FunctionReturn { function_tmp, .. } => Some(*function_tmp),
            _ => None,
        }
    }

    /// The receiver temporary of call-related infos.
    pub fn base_tmp(&self) -> Option<VarId> {
        match self {
            Info::FunctionEnter { base_tmp, .. } | Info::FunctionInvocation { base_tmp, .. } => {
                Some(*base_tmp)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StatementKind {
    Write {
        sink: VarId,
        rhs: Expression,
    },
    FieldWrite {
        base: VarId,
        field: Name,
        rhs: VarId,
        /// The write belongs to an object literal initializer.
        is_initializer: bool,
    },
    Delete {
        base: VarId,
        field: Name,
    },
    Info(Info),
}

/// One trace statement, stamped with the instruction that produced it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Statement {
    pub iid: Iid,
    pub kind: StatementKind,
}

/// An immutable recorded execution.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    pub statements: Vec<Statement>,
    pub variables: VariableTable,
    pub locations: FxHashMap<Iid, SourceLocation>,
}

impl Trace {
    pub fn location(&self, iid: Iid) -> Option<SourceLocation> {
        self.locations.get(&iid).copied()
    }

    /// The enclosing function of the variable a statement is attributed to.
    ///
    /// Writes are attributed to their sink, field writes to the written
    /// value, deletes to the base. Infos belong to no function.
    pub fn function_iid(&self, statement: &Statement) -> Option<Iid> {
        let var = match &statement.kind {
            StatementKind::Write { sink, .. } => *sink,
            StatementKind::FieldWrite { rhs, .. } => *rhs,
            StatementKind::Delete { base, .. } => *base,
            StatementKind::Info(_) => return None,
        };
        self.variables.get(var).function_iid
    }
}

/// Incremental trace construction for producers and tests.
#[derive(Default)]
pub struct TraceBuilder {
    trace: Trace,
    next_iid: u32,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn var(&mut self, variable: Variable) -> VarId {
        self.trace.variables.intern(variable)
    }

    /// A fresh instruction id, distinct from every id handed out before.
    pub fn fresh_iid(&mut self) -> Iid {
        let iid = Iid::from_raw(self.next_iid);
        self.next_iid += 1;
        iid
    }

    pub fn push(&mut self, kind: StatementKind) -> Iid {
        let iid = self.fresh_iid();
        self.push_at(iid, kind);
        iid
    }

    pub fn push_at(&mut self, iid: Iid, kind: StatementKind) {
        self.next_iid = self.next_iid.max(iid.raw() + 1);
        self.trace.statements.push(Statement { iid, kind });
    }

    pub fn write(&mut self, sink: VarId, rhs: Expression) -> Iid {
        self.push(StatementKind::Write { sink, rhs })
    }

    pub fn info(&mut self, info: Info) -> Iid {
        self.push(StatementKind::Info(info))
    }

    pub fn locate(&mut self, iid: Iid, location: SourceLocation) {
        self.trace.locations.insert(iid, location);
    }

    pub fn finish(self) -> Trace {
        self.trace
    }
}
