//! The abstract variable store.
//!
//! Concrete trace variables are abstracted according to the precision
//! policy and the call abstraction; types are stored per abstract variable.
//! Writes are strong or weak per variable, and a weak write that changes a
//! stored type marks the store dirty so the replayer runs another round.
//!
//! The store also keeps the bookkeeping the evaluation reports on: read and
//! write locations, variables whose type was recovered from the inferred
//! environment, and reads of types degraded by recursion.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::warn;
use tt_ir::{CallContext, Iid, VarId, Variable, VariableTable};
use tt_types::{TupleId, TypeEnv, TypeLattice};

use crate::abstraction::CallAbstraction;
use crate::precision::PrecisionConfig;

/// Rounds in which one abstract variable took the round's first weak change,
/// after which its type is widened with ObjectTop, forcing the fixpoint to settle.
const MAX_TYPE_CHANGES: u32 = 50;

/// Per-run observations about concrete variables.
#[derive(Clone, Debug, Default)]
pub struct Bookkeeping {
    pub reads: FxHashSet<VarId>,
    pub writes: FxHashSet<VarId>,
    pub read_locations: FxHashMap<VarId, FxHashSet<Iid>>,
    /// The last write of each variable.
    pub write_locations: FxHashMap<VarId, Iid>,
    /// Reads that produced an ObjectTopDueToRecursion-tagged type.
    pub top_due_to_recursion_reads: FxHashMap<VarId, FxHashSet<Iid>>,
    /// Variables directly assigned a type recovered from the inferred
    /// environment.
    pub recovered_roots: FxHashSet<VarId>,
    /// Variables read while holding a (transitively) recovered type.
    pub recovered_uses: FxHashSet<VarId>,
}

impl Bookkeeping {
    /// Variables written but never read, ascending.
    pub fn dead_variables(&self) -> Vec<VarId> {
        let mut dead: Vec<_> = self
            .writes
            .iter()
            .copied()
            .filter(|var| !self.reads.contains(var))
            .collect();
        dead.sort_unstable();
        dead
    }

    /// Variables read at least once, ascending.
    pub fn live_variables(&self) -> Vec<VarId> {
        let mut live: Vec<_> = self.reads.iter().copied().collect();
        live.sort_unstable();
        live
    }

    pub fn locations_with_top_due_to_recursion(&self) -> usize {
        self.top_due_to_recursion_reads.len()
    }
}

pub struct AbstractStore<'t> {
    variables: &'t VariableTable,
    precision: PrecisionConfig,
    calls: Box<dyn CallAbstraction>,

    abstract_variables: VariableTable,
    abstraction: FxHashMap<VarId, VarId>,
    concretes: FxHashMap<VarId, SmallVec<[VarId; 2]>>,

    /// Keyed by abstract variable.
    types: FxHashMap<VarId, TupleId>,
    changes: FxHashMap<VarId, u32>,
    read_abstract: FxHashSet<VarId>,
    transitively_recovered: FxHashSet<VarId>,
    /// Abstract variables whose stored type is ObjectTopDueToRecursion-tagged.
    degraded: FxHashSet<VarId>,

    dirty: bool,
    current: Iid,
    book: Bookkeeping,
}

impl<'t> AbstractStore<'t> {
    pub fn new(
        variables: &'t VariableTable,
        precision: PrecisionConfig,
        calls: Box<dyn CallAbstraction>,
    ) -> Self {
        Self {
            variables,
            precision,
            calls,
            abstract_variables: VariableTable::new(),
            abstraction: FxHashMap::default(),
            concretes: FxHashMap::default(),
            types: FxHashMap::default(),
            changes: FxHashMap::default(),
            read_abstract: FxHashSet::default(),
            transitively_recovered: FxHashSet::default(),
            degraded: FxHashSet::default(),
            dirty: false,
            current: Iid::from_raw(0),
            book: Bookkeeping::default(),
        }
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Start a round.
    pub fn clean(&mut self) {
        self.dirty = false;
    }

    /// The statement subsequent reads and writes are attributed to.
    pub fn set_location(&mut self, iid: Iid) {
        self.current = iid;
    }

    pub fn calls_mut(&mut self) -> &mut dyn CallAbstraction {
        self.calls.as_mut()
    }

    /// The abstract variable standing for `var`.
    pub fn abstract_var(&mut self, var: VarId) -> VarId {
        if let Some(&abstracted) = self.abstraction.get(&var) {
            return abstracted;
        }
        let concrete = self.variables.get(var);
        let kill_context = self.precision.context_insensitive && !concrete.named;
        let context = match concrete.context {
            Some(context) if !kill_context => {
                let mapped = concrete
                    .scope()
                    .and_then(|scope| self.calls.context(scope))
                    .map(CallContext::Abstract);
                Some(mapped.unwrap_or(context))
            }
            _ => None,
        };
        let abstracted = self.abstract_variables.intern(Variable {
            named: concrete.named,
            name: concrete.name,
            iid: concrete.iid,
            function_iid: concrete.function_iid,
            context,
            force_merge: false,
        });
        self.abstraction.insert(var, abstracted);
        self.concretes.entry(abstracted).or_default().push(var);
        abstracted
    }

    /// The concrete variables sharing abstract variable `abstracted`.
    pub fn concretes_of(&self, abstracted: VarId) -> &[VarId] {
        self.concretes
            .get(&abstracted)
            .map(|vars| vars.as_slice())
            .unwrap_or_default()
    }

    pub fn abstract_variables(&self) -> &VariableTable {
        &self.abstract_variables
    }

    /// Write `ty` to `var`, joining with the stored type on weak updates.
    pub fn write(&mut self, lattice: &mut TypeLattice, var: VarId, ty: Option<TupleId>) {
        self.book.write_locations.insert(var, self.current);
        self.book.writes.insert(var);
        let Some(mut ty) = ty else {
            return;
        };
        let abstracted = self.abstract_var(var);
        let concrete = self.variables.get(var);
        let weak = self
            .precision
            .is_weak_update(concrete.named, concrete.force_merge);

        match self.types.get(&abstracted).copied() {
            Some(old) => {
                if weak {
                    ty = lattice.lub(ty, old);
                }
                if lattice.pool().tuples_equal(ty, old) {
                    return;
                }
                // Only the first weak change of a round counts towards the
                // widening limit.
                if weak && !self.dirty {
                    let changes = self.changes.entry(abstracted).or_default();
                    *changes += 1;
                    if *changes > MAX_TYPE_CHANGES {
                        if *changes == MAX_TYPE_CHANGES + 1 {
                            warn!(
                                variable = ?abstracted,
                                "type keeps changing across rounds, widening with ObjectTop"
                            );
                        }
                        ty = lattice.lub(ty, TupleId::OBJECT_TOP);
                    }
                }
                if weak {
                    self.dirty = true;
                }
            }
            None => {
                // An earlier read saw nothing; the reader must be replayed.
                if self.read_abstract.contains(&abstracted) {
                    self.dirty = true;
                }
            }
        }

        if lattice.pool().tuple(ty).is_object_top_due_to_recursion() {
            self.degraded.insert(abstracted);
        } else {
            self.degraded.remove(&abstracted);
        }
        self.types.insert(abstracted, ty);
    }

    /// Read `var`, recording the read. Bottom if nothing was written yet.
    pub fn read(&mut self, var: VarId) -> TupleId {
        self.book
            .read_locations
            .entry(var)
            .or_default()
            .insert(self.current);
        self.book.reads.insert(var);
        if self.is_recovered(var) {
            self.book.recovered_uses.insert(var);
        }
        let abstracted = self.abstract_var(var);
        self.read_abstract.insert(abstracted);
        if self.degraded.contains(&abstracted) {
            self.book
                .top_due_to_recursion_reads
                .entry(var)
                .or_default()
                .insert(self.current);
        }
        self.types
            .get(&abstracted)
            .copied()
            .unwrap_or(TupleId::BOTTOM)
    }

    /// The stored type of `var` without recording a read.
    pub fn peek(&self, var: VarId) -> Option<TupleId> {
        let abstracted = self.abstraction.get(&var)?;
        self.types.get(abstracted).copied()
    }

    pub fn mark_root_recovered(&mut self, var: VarId) {
        self.book.recovered_roots.insert(var);
        self.mark_transitively_recovered(var);
    }

    pub fn mark_transitively_recovered(&mut self, var: VarId) {
        let abstracted = self.abstract_var(var);
        self.transitively_recovered.insert(abstracted);
    }

    pub fn is_recovered(&mut self, var: VarId) -> bool {
        let abstracted = self.abstract_var(var);
        self.transitively_recovered.contains(&abstracted)
    }

    pub fn bookkeeping(&self) -> &Bookkeeping {
        &self.book
    }

    pub fn into_bookkeeping(self) -> Bookkeeping {
        self.book
    }
}

impl TypeEnv for AbstractStore<'_> {
    fn read(&mut self, var: VarId) -> TupleId {
        AbstractStore::read(self, var)
    }
}

#[cfg(test)]
mod tests;
