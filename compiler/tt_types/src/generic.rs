//! Generalization of call signatures with a type parameter.
//!
//! Given the signatures observed for one function, look for a *slot* (the
//! receiver, the result, an argument, or a property of one of those) whose
//! type varies across signatures such that replacing every unstable
//! occurrence of that slot's type with a fresh parameter `E` makes all
//! signatures identical. `E` must then occur more than once, otherwise
//! the generalization says nothing the pointwise join would not.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use tt_ir::Name;

use crate::kinds::TypeParam;
use crate::lattice::TypeLattice;
use crate::object::SingleFunction;
use crate::TupleId;

/// Above this many signatures inference is not attempted.
const MAX_SIGNATURES: usize = 100;
/// Property slots are only considered below this many signatures.
const MAX_SIGNATURES_FOR_PROPERTIES: usize = 50;

/// A top-level position of a signature.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Position {
    Base,
    Result,
    Arg(usize),
}

impl Position {
    fn extract(self, f: &SingleFunction) -> TupleId {
        match self {
            Position::Base => f.base,
            Position::Result => f.result,
            Position::Arg(i) => f.args[i],
        }
    }
}

/// A candidate for substitution.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Slot {
    At(Position),
    Property(Position, Name),
}

impl TypeLattice {
    fn slot_type(&self, slot: Slot, f: &SingleFunction) -> TupleId {
        match slot {
            Slot::At(position) => position.extract(f),
            Slot::Property(position, name) => {
                let object = self.pool.object_of(position.extract(f));
                self.pool
                    .object(object)
                    .property(name)
                    .unwrap_or(TupleId::BOTTOM)
            }
        }
    }

    fn all_equal_modulo_undefined(&self, types: &[TupleId]) -> bool {
        match types.split_first() {
            Some((&first, rest)) => rest
                .iter()
                .all(|&t| self.pool.tuples_equal_modulo_undefined(t, first)),
            None => true,
        }
    }

    fn slot_is_stable(&self, signatures: &[SingleFunction], slot: Slot) -> bool {
        let types: Vec<TupleId> = signatures.iter().map(|f| self.slot_type(slot, f)).collect();
        self.all_equal_modulo_undefined(&types)
    }

    /// Properties every signature's object at `position` has, but with
    /// differing types.
    fn unstable_properties(&self, signatures: &[SingleFunction], position: Position) -> Vec<Name> {
        let types: Vec<TupleId> = signatures.iter().map(|f| position.extract(f)).collect();
        if types.iter().any(|&t| !self.pool.tuple(t).is_object()) {
            return Vec::new();
        }
        let objects: Vec<_> = types
            .iter()
            .map(|&t| self.pool.object(self.pool.object_of(t)))
            .collect();
        let names: BTreeSet<Name> = objects
            .iter()
            .flat_map(|o| o.properties.keys().copied())
            .collect();
        names
            .into_iter()
            .filter(|&name| {
                let Some(property_types) = objects
                    .iter()
                    .map(|o| o.property(name))
                    .collect::<Option<Vec<_>>>()
                else {
                    return false;
                };
                !self.all_equal_modulo_undefined(&property_types)
            })
            .collect()
    }

    /// Generalize `signatures` into one signature over type parameter `E`.
    ///
    /// `None` means no useful generalization exists; callers fall back to
    /// the pointwise join.
    pub fn substitute_in_functions(
        &mut self,
        signatures: &[SingleFunction],
    ) -> Option<SingleFunction> {
        if signatures.is_empty() || signatures.len() > MAX_SIGNATURES {
            return None;
        }
        let min_arity = signatures.iter().map(|f| f.args.len()).min().unwrap_or(0);
        let mut positions = vec![Position::Base, Position::Result];
        positions.extend((0..min_arity).map(Position::Arg));

        let mut slots: Vec<Slot> = positions.iter().copied().map(Slot::At).collect();
        if signatures.len() < MAX_SIGNATURES_FOR_PROPERTIES {
            for &position in &positions {
                for name in self.unstable_properties(signatures, position) {
                    slots.push(Slot::Property(position, name));
                }
            }
        }
        slots.reverse();
        slots.retain(|&slot| !self.slot_is_stable(signatures, slot));

        let e = self.type_parameter_e();
        for slot in slots {
            let substituted: Vec<SingleFunction> = signatures
                .iter()
                .map(|f| {
                    let from = self.slot_type(slot, f);
                    self.substitute_in_function(signatures, min_arity, f, from, e)
                })
                .collect();
            let (first, rest) = substituted.split_first()?;
            if rest.iter().all(|s| self.pool.singles_equal(s, first))
                && self.type_parameter_usage_count(first) > 1
            {
                return Some(first.clone());
            }
        }
        None
    }

    /// Replace the unstable occurrences of `from` in `f` with `to`.
    fn substitute_in_function(
        &mut self,
        signatures: &[SingleFunction],
        min_arity: usize,
        f: &SingleFunction,
        from: TupleId,
        to: TupleId,
    ) -> SingleFunction {
        let mut substituted = f.clone();
        if let Some(base) = self.substitute_at(signatures, Position::Base, f, from, to) {
            substituted.base = base;
        }
        for i in 0..min_arity {
            if let Some(arg) = self.substitute_at(signatures, Position::Arg(i), f, from, to) {
                substituted.args[i] = arg;
            }
        }
        if let Some(result) = self.substitute_at(signatures, Position::Result, f, from, to) {
            substituted.result = result;
        }
        substituted
    }

    fn substitute_at(
        &mut self,
        signatures: &[SingleFunction],
        position: Position,
        f: &SingleFunction,
        from: TupleId,
        to: TupleId,
    ) -> Option<TupleId> {
        if self.slot_is_stable(signatures, Slot::At(position)) {
            return None;
        }
        let current = position.extract(f);
        if self.pool.tuples_equal_modulo_undefined(from, current) {
            return Some(to);
        }

        let names = self.unstable_properties(signatures, position);
        let all_match = names.iter().all(|&name| {
            let property = self.slot_type(Slot::Property(position, name), f);
            self.pool.tuples_equal_modulo_undefined(from, property)
        });
        if !all_match {
            return None;
        }
        let mut tuple = current;
        for name in names {
            tuple = self.substitute_property(tuple, name, to);
        }
        Some(tuple)
    }

    /// Copy of the object tuple `tuple` with property `name` set to `to`.
    pub fn substitute_property(&mut self, tuple: TupleId, name: Name, to: TupleId) -> TupleId {
        let mut data = self.pool.tuple(tuple).clone();
        let mut object = self.pool.object(data.object).clone();
        object.properties.insert(name, to);
        data.object = self.pool.make_object(object);
        self.make_tuple(data)
    }

    /// Uses of the most used type parameter in top-level positions and
    /// properties of top-level objects.
    pub fn type_parameter_usage_count(&self, f: &SingleFunction) -> usize {
        let mut top_level = vec![f.base, f.result];
        top_level.extend(f.args.iter().copied());

        let mut occurrences: FxHashMap<Name, usize> = FxHashMap::default();
        let mut count = |t: TupleId| {
            if let TypeParam::Named(name) = self.pool.tuple(t).type_param {
                *occurrences.entry(name).or_default() += 1;
            }
        };
        for &t in &top_level {
            count(t);
            let data = self.pool.tuple(t);
            if data.is_object() {
                for &property in self.pool.object(data.object).properties.values() {
                    count(property);
                }
            }
        }
        occurrences.into_values().max().unwrap_or(0)
    }
}
