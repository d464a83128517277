//! Types of observed runtime values.
//!
//! Ascription turns the values seen while recording into tuple types. It
//! seeds the inferred environment: every unnamed variable starts out with
//! the join of the types of all values it held.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use tt_ir::{HeapObject, ObjectKind, ObjectRef, ObservedHeap, Observations, Value, VariableTable};
use tt_stack::ensure_sufficient_stack;

use crate::env::Environment;
use crate::kinds::{CallKinds, Classification};
use crate::lattice::TypeLattice;
use crate::object::{FunctionType, ObjectData, SingleFunction};
use crate::TupleId;

/// Ascribes values of one observed heap, memoizing per object.
pub struct Ascriber<'h> {
    heap: &'h ObservedHeap,
    memo: FxHashMap<ObjectRef, TupleId>,
    on_stack: FxHashSet<ObjectRef>,
}

impl<'h> Ascriber<'h> {
    pub fn new(heap: &'h ObservedHeap) -> Self {
        Self {
            heap,
            memo: FxHashMap::default(),
            on_stack: FxHashSet::default(),
        }
    }

    pub fn ascribe(&mut self, lattice: &mut TypeLattice, value: Value) -> TupleId {
        match value {
            Value::Undefined => TupleId::UNDEFINED,
            Value::Null => TupleId::NULL,
            Value::Boolean => TupleId::BOOLEAN,
            Value::Number => TupleId::NUMBER,
            Value::String => TupleId::STRING,
            Value::Object(object) => self.object(lattice, object),
        }
    }

    fn object(&mut self, lattice: &mut TypeLattice, object: ObjectRef) -> TupleId {
        if let Some(&tuple) = self.memo.get(&object) {
            return tuple;
        }
        // A back edge: the object is still being ascribed.
        if !self.on_stack.insert(object) {
            return TupleId::OBJECT_TOP;
        }
        let heap = self.heap;
        let tuple = ensure_sufficient_stack(|| self.object_data(lattice, heap.get(object)));
        self.on_stack.remove(&object);
        self.memo.insert(object, tuple);
        tuple
    }

    fn object_data(&mut self, lattice: &mut TypeLattice, observed: &HeapObject) -> TupleId {
        let mut data = ObjectData::new(Classification::of_kind(observed.kind));
        data.is_abstract = observed.is_abstract;
        data.allocation_scope = observed.allocation_scope;

        let mut properties: BTreeMap<_, TupleId> = BTreeMap::new();
        for &(name, value) in &observed.properties {
            let name = lattice.pool().abstract_field_name(&data, name);
            let ty = self.ascribe(lattice, value);
            let joined = match properties.get(&name) {
                Some(&previous) => lattice.lub(previous, ty),
                None => ty,
            };
            properties.insert(name, joined);
        }
        let read_only: BTreeSet<_> = observed
            .read_only
            .iter()
            .copied()
            .filter(|name| properties.contains_key(name))
            .collect();

        if observed.kind == ObjectKind::Function || !observed.calls.is_empty() {
            let signatures: Vec<SingleFunction> = observed
                .calls
                .iter()
                .map(|call| {
                    let base = self.ascribe(lattice, call.base);
                    let args: Vec<TupleId> =
                        call.args.iter().map(|&arg| self.ascribe(lattice, arg)).collect();
                    let result = self.ascribe(lattice, call.result);
                    SingleFunction::new(base, &args, result, CallKinds::of_kind(call.kind))
                })
                .collect();
            // Never called while recording: any signature may apply.
            data.function = if signatures.is_empty() {
                FunctionType::Top
            } else {
                lattice.initial_function_type(&signatures)
            };
        }

        data.properties = properties;
        data.read_only = read_only;
        let object = lattice.pool_mut().make_object(data);
        lattice.pool_mut().object_tuple(object)
    }
}

impl TypeLattice {
    /// The inferred environment: per unnamed variable, the join of the
    /// types of every value observed for it.
    pub fn ascribe_observations(
        &mut self,
        variables: &VariableTable,
        observations: &Observations,
    ) -> Environment {
        let mut ascriber = Ascriber::new(&observations.heap);
        let mut env = Environment::new();
        for var in variables.ids() {
            if variables.get(var).named {
                continue;
            }
            let values = observations.values_of(var);
            if values.is_empty() {
                continue;
            }
            let mut ty = TupleId::BOTTOM;
            for &value in values {
                let ascribed = ascriber.ascribe(self, value);
                ty = self.lub(ty, ascribed);
            }
            env.insert(var, ty);
        }
        debug!(
            variables = env.len(),
            objects = ascriber.memo.len(),
            "ascribed observed values"
        );
        env
    }
}

#[cfg(test)]
mod tests;
