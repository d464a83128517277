//! Dataflow transfer functions of one replay round.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tt_ir::{Expression, Info, Name, Statement, StatementKind, VarId};
use tt_types::{Environment, TupleId, TypeLattice};

use crate::abstraction::FunctionEntry;
use crate::store::AbstractStore;

/// What an expression contributes to its sink.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Flow {
    /// A value expression: the sink takes its inferred type.
    Inferred,
    /// The read produced no type; recover the sink's inferred type.
    Fallback,
    Value { ty: TupleId, recovered: bool },
}

/// Replays statements against the store. One visitor per round.
pub(crate) struct RoundVisitor<'a, 't> {
    lattice: &'a mut TypeLattice,
    store: &'a mut AbstractStore<'t>,
    inferred: &'a Environment,
    /// Variables whose value is controlled by call boundaries.
    flow_stopping: FxHashSet<VarId>,
    /// Per pending call: the return type of the matched signatures.
    return_types: Vec<Option<TupleId>>,
}

impl<'a, 't> RoundVisitor<'a, 't> {
    pub(crate) fn new(
        lattice: &'a mut TypeLattice,
        store: &'a mut AbstractStore<'t>,
        inferred: &'a Environment,
    ) -> Self {
        Self {
            lattice,
            store,
            inferred,
            flow_stopping: FxHashSet::default(),
            return_types: Vec::new(),
        }
    }

    pub(crate) fn statement(&mut self, statement: &Statement) {
        self.store.set_location(statement.iid);
        match &statement.kind {
            StatementKind::Write { sink, rhs } => self.write(*sink, rhs),
            // Heap effects are captured by the ascribed object types.
            StatementKind::FieldWrite { .. } | StatementKind::Delete { .. } => {}
            StatementKind::Info(info) => self.info(statement, info),
        }
    }

    fn expression(&mut self, expression: &Expression) -> Flow {
        match *expression {
            Expression::Read { source } => {
                let recovered = self.store.is_recovered(source);
                Flow::Value {
                    ty: self.store.read(source),
                    recovered,
                }
            }
            Expression::FieldRead { base, field } => self.field_read(base, field),
            Expression::New { .. } | Expression::Primitive(_) => Flow::Inferred,
        }
    }

    fn field_read(&mut self, base: VarId, field: Name) -> Flow {
        let stored = self.store.read(base);
        let pool = self.lattice.pool();
        // Precision was lost: an object must be here, take the inferred one.
        let tuple = if pool.tuple(stored).is_object() {
            stored
        } else {
            self.inferred.get(base)
        };
        let object = pool.tuple(tuple).object;
        if !object.is_some() {
            return Flow::Fallback;
        }
        let data = pool.object(object);
        let name = pool.abstract_field_name(data, field);
        let Some(property) = data.property(name) else {
            return Flow::Fallback;
        };
        if property != TupleId::TOP && pool.tuple(property).has_recursive_reference() {
            panic!(
                ".{} has an unresolved recursive reference: {}",
                pool.interner().lookup(name),
                pool.format_tuple(property)
            );
        }
        Flow::Value {
            ty: property,
            recovered: false,
        }
    }

    fn write(&mut self, sink: VarId, rhs: &Expression) {
        let flow = self.expression(rhs);
        if self.flow_stopping.contains(&sink) {
            return;
        }
        let ty = match flow {
            Flow::Inferred => self.inferred_type(sink),
            Flow::Fallback => {
                self.store.mark_root_recovered(sink);
                self.inferred_type(sink)
            }
            Flow::Value { ty, recovered } => {
                if recovered {
                    self.store.mark_transitively_recovered(sink);
                }
                Some(ty)
            }
        };
        self.store.write(self.lattice, sink, ty);
    }

    fn inferred_type(&self, var: VarId) -> Option<TupleId> {
        self.inferred
            .contains(var)
            .then(|| self.inferred.get(var))
    }

    /// Call-related infos always read or write their temporaries so those
    /// never count as dead.
    fn info(&mut self, statement: &Statement, info: &Info) {
        match info {
            Info::FunctionResult { result_tmp } => {
                let returned = self.return_types.pop().flatten();
                self.flow_stopping.insert(*result_tmp);
                let ty = match returned {
                    // TODO: instantiate the type parameter instead of
                    // falling back to the observed result.
                    Some(ty) if self.mentions_type_parameter(ty) => self.inferred_type(*result_tmp),
                    returned => returned,
                };
                self.store.write(self.lattice, *result_tmp, ty);
            }
            Info::FunctionEnter {
                function_tmp,
                base_tmp,
                args_tmps,
                scope,
            } => {
                let args: SmallVec<[TupleId; 4]> =
                    args_tmps.iter().map(|&arg| self.inferred.get(arg)).collect();
                let base = self.inferred.get(*base_tmp);
                let function = self
                    .lattice
                    .pool()
                    .function_of(self.inferred.get(*function_tmp))
                    .clone();
                // Map the activation first so its temporaries are abstracted
                // into the new context.
                let entry = FunctionEntry {
                    iid: statement.iid,
                    scope: *scope,
                    function: &function,
                    base,
                    args: &args,
                };
                self.store.calls_mut().enter(self.lattice.pool(), &entry);

                for &tmp in std::iter::once(function_tmp)
                    .chain(std::iter::once(base_tmp))
                    .chain(args_tmps.iter())
                {
                    self.flow_stopping.insert(tmp);
                    let ty = self.inferred_type(tmp);
                    self.store.write(self.lattice, tmp, ty);
                }
            }
            Info::FunctionInvocation {
                function_tmp,
                base_tmp,
                args_tmps,
                is_constructor_call,
            } => {
                let inputs = self.lattice.call_inputs(
                    self.store,
                    self.inferred,
                    *function_tmp,
                    *base_tmp,
                    args_tmps,
                );
                let matched = self.lattice.match_call(
                    &inputs.callee,
                    inputs.base,
                    &inputs.args,
                    *is_constructor_call,
                );
                let returned = self.lattice.return_type(&matched);
                self.return_types.push(returned);
                self.store.calls_mut().call(statement.iid);
            }
            Info::FunctionReturn { result_tmp, .. } => {
                self.store.read(*result_tmp);
                self.store.calls_mut().exit();
            }
            Info::Coerce { .. }
            | Info::ForInObject { .. }
            | Info::NextNewIsArray
            | Info::NextNewIsArguments
            | Info::NextNewIsFunction
            | Info::NextNewIsDotPrototype
            | Info::NextFieldAccessIsDynamic => {}
        }
    }

    /// A type parameter at the top level or in a property of the top-level
    /// object.
    fn mentions_type_parameter(&self, ty: TupleId) -> bool {
        let pool = self.lattice.pool();
        if pool.tuples_equal(ty, TupleId::TOP) {
            return false;
        }
        let data = pool.tuple(ty);
        data.is_type_parameter()
            || (data.is_object()
                && pool
                    .object(data.object)
                    .properties
                    .values()
                    .any(|&property| pool.tuple(property).is_type_parameter()))
    }
}
