//! Structural type equality.
//!
//! Handles are identities, so equal handles are always equal types; this
//! module decides equality for distinct handles by walking the structure.
//! Object graphs may be cyclic: a pair of objects already under comparison
//! is assumed equal (coinductive), and removed from the guard once its
//! comparison finishes.

use rustc_hash::FxHashSet;
use tt_stack::ensure_sufficient_stack;

use crate::object::{FunctionType, SingleFunction};
use crate::pool::TypePool;
use crate::tuple::TupleData;
use crate::{ObjectId, TupleId};

struct Equality<'p> {
    pool: &'p TypePool,
    /// Skip function receivers; a Bottom function equals any function.
    ignore_receivers: bool,
    in_progress: FxHashSet<(ObjectId, ObjectId)>,
}

impl<'p> Equality<'p> {
    fn new(pool: &'p TypePool, ignore_receivers: bool) -> Self {
        Self {
            pool,
            ignore_receivers,
            in_progress: FxHashSet::default(),
        }
    }

    fn tuples(&mut self, t1: TupleId, t2: TupleId) -> bool {
        if t1 == t2 {
            return true;
        }
        let pool = self.pool;
        self.data(pool.tuple(t1), pool.tuple(t2))
    }

    fn data(&mut self, d1: &TupleData, d2: &TupleData) -> bool {
        d1.null == d2.null
            && d1.string == d2.string
            && d1.number == d2.number
            && d1.boolean == d2.boolean
            && d1.undefined == d2.undefined
            && d1.recursive == d2.recursive
            && d1.object_top_due_to_recursion == d2.object_top_due_to_recursion
            && d1.type_param == d2.type_param
            && self.objects(d1.object, d2.object)
    }

    fn objects(&mut self, o1: ObjectId, o2: ObjectId) -> bool {
        if o1 == o2 {
            return true;
        }
        // Sentinels are unique handles.
        if !o1.is_some() || !o2.is_some() {
            return false;
        }
        let pool = self.pool;
        let (a, b) = (pool.object(o1), pool.object(o2));
        if a.properties.len() != b.properties.len()
            || !a.properties.keys().eq(b.properties.keys())
        {
            return false;
        }
        if !self.in_progress.insert((o1, o2)) {
            return true;
        }
        let equal = ensure_sufficient_stack(|| {
            self.functions(&a.function, &b.function)
                && a.classification == b.classification
                && a.read_only == b.read_only
                && a.is_abstract == b.is_abstract
                && a
                    .properties
                    .values()
                    .zip(b.properties.values())
                    .all(|(&p1, &p2)| self.tuples(p1, p2))
        });
        self.in_progress.remove(&(o1, o2));
        equal
    }

    fn functions(&mut self, f1: &FunctionType, f2: &FunctionType) -> bool {
        if self.ignore_receivers
            && (matches!(f1, FunctionType::Bottom) || matches!(f2, FunctionType::Bottom))
        {
            return true;
        }
        match (f1, f2) {
            (FunctionType::Bottom, FunctionType::Bottom) | (FunctionType::Top, FunctionType::Top) => {
                true
            }
            (FunctionType::Single(s1), FunctionType::Single(s2)) => self.singles(s1, s2),
            (FunctionType::Intersection(m1), FunctionType::Intersection(m2)) => {
                // No canonical member order: every member needs some partner.
                m1.len() == m2.len()
                    && m1
                        .iter()
                        .all(|s1| m2.iter().any(|s2| self.singles(s1, s2)))
            }
            _ => false,
        }
    }

    fn singles(&mut self, s1: &SingleFunction, s2: &SingleFunction) -> bool {
        s1.call_kinds == s2.call_kinds
            && s1.args.len() == s2.args.len()
            && (self.ignore_receivers || self.tuples(s1.base, s2.base))
            && self.tuples(s1.result, s2.result)
            && s1
                .args
                .iter()
                .zip(&s2.args)
                .all(|(&a1, &a2)| self.tuples(a1, a2))
    }
}

impl TypePool {
    /// Structural equality of two tuples.
    pub fn tuples_equal(&self, t1: TupleId, t2: TupleId) -> bool {
        Equality::new(self, false).tuples(t1, t2)
    }

    /// Structural equality, disregarding a top-level undefined slot.
    pub fn tuples_equal_modulo_undefined(&self, t1: TupleId, t2: TupleId) -> bool {
        if t1 == t2 {
            return true;
        }
        let d1 = self.tuple(t1).without_undefined();
        let d2 = self.tuple(t2).without_undefined();
        Equality::new(self, false).data(&d1, &d2)
    }

    /// Structural equality that skips function receivers and treats a
    /// missing function type as equal to any function type.
    ///
    /// Used for prototype/instance invariance, where methods are compared
    /// regardless of the object they were observed on.
    pub fn tuples_equal_ignoring_receivers(&self, t1: TupleId, t2: TupleId) -> bool {
        Equality::new(self, true).tuples(t1, t2)
    }

    pub fn objects_equal(&self, o1: ObjectId, o2: ObjectId) -> bool {
        Equality::new(self, false).objects(o1, o2)
    }

    pub fn functions_equal(&self, f1: &FunctionType, f2: &FunctionType) -> bool {
        Equality::new(self, false).functions(f1, f2)
    }

    pub fn singles_equal(&self, s1: &SingleFunction, s2: &SingleFunction) -> bool {
        Equality::new(self, false).singles(s1, s2)
    }
}
