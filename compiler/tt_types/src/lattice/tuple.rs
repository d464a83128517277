//! The tuple join.
//!
//! Slots join independently, except the object and recursive-reference
//! slots which are joined as a pair: merging two concrete objects may run
//! into a cycle, and the cycle is answered with a recursive-reference
//! placeholder instead of recursing further.

use tracing::warn;
use tt_stack::ensure_sufficient_stack;

use super::{Direction, TypeLattice};
use crate::kinds::{Flat, RecursionIds, RecursiveRef, TypeParam};
use crate::tuple::TupleData;
use crate::{ObjectId, TupleId};

impl TypeLattice {
    pub(crate) fn lub_in(&mut self, dir: Direction, t1: TupleId, t2: TupleId) -> TupleId {
        let (bot, top) = match dir {
            Direction::Join => (TupleId::BOTTOM, TupleId::TOP),
            Direction::Meet => (TupleId::TOP, TupleId::BOTTOM),
        };
        if let Some(cached) = self.caches[dir.index()].get(t1, t2) {
            return cached;
        }
        if self.pool.tuples_equal(t1, t2) {
            return t1;
        }
        if t1 == bot {
            return t2;
        }
        if t2 == bot {
            return t1;
        }
        if t1 == top || t2 == top {
            return top;
        }

        let d1 = self.pool.tuple(t1).clone();
        let d2 = self.pool.tuple(t2).clone();
        if self.config.sjs_ascription {
            if d1.is_undefined() || d1.is_null() {
                return t2;
            }
            if d2.is_undefined() || d2.is_null() {
                return t1;
            }
        }

        let mut data = self.join_slots(dir, &d1, &d2);
        if dir == Direction::Meet {
            restore_recursive_pair(&mut data, &d1, &d2);
        }
        if data.recursive == RecursiveRef::Top && data != TupleData::TOP {
            warn!("resolving ambiguous recursive reference merge with ObjectTop");
            data.recursive = RecursiveRef::Bottom;
            data.object = ObjectId::TOP;
            data.object_top_due_to_recursion = Flat::Top;
        }

        let mut result = self.make_tuple(data);
        if dir == Direction::Join
            && self.config.multi_kinds_yield_top()
            && self.real_kind_count(result) > 1
        {
            result = TupleId::TOP;
        }

        if result != t1 && self.pool.tuples_equal(result, t1) {
            result = t1;
        } else if result != t2 && self.pool.tuples_equal(result, t2) {
            result = t2;
        }

        if self.is_settled() {
            self.caches[dir.index()].offer(t1, t2, result);
        }
        result
    }

    /// No merge is in flight, so results cannot be backpatched later.
    fn is_settled(&self) -> bool {
        self.guards.iter().all(|guard| guard.is_empty()) && self.recursive.is_idle()
    }

    /// Kinds counted against union types: object-like (object, recursive
    /// reference, null) as one, plus number, string and boolean.
    /// Undefined is free.
    fn real_kind_count(&self, tuple: TupleId) -> usize {
        let data = self.pool.tuple(tuple);
        let object_like = data.is_object() || data.has_recursive_reference() || data.is_null();
        [
            object_like,
            data.number.is_top(),
            data.string.is_top(),
            data.boolean.is_top(),
        ]
        .into_iter()
        .filter(|&present| present)
        .count()
    }

    fn join_slots(&mut self, dir: Direction, d1: &TupleData, d2: &TupleData) -> TupleData {
        let (object, recursive) = if d1.object.is_some() && d2.object.is_some() {
            self.join_object_pair(dir, d1, d2)
        } else {
            (
                join_simple_object(dir, d1.object, d2.object),
                join_recursive(dir, &d1.recursive, &d2.recursive),
            )
        };
        TupleData {
            object,
            null: join_flat(dir, d1.null, d2.null),
            string: join_flat(dir, d1.string, d2.string),
            number: join_flat(dir, d1.number, d2.number),
            boolean: join_flat(dir, d1.boolean, d2.boolean),
            undefined: join_flat(dir, d1.undefined, d2.undefined),
            recursive,
            object_top_due_to_recursion: join_flat(
                dir,
                d1.object_top_due_to_recursion,
                d2.object_top_due_to_recursion,
            ),
            type_param: join_type_param(dir, d1.type_param, d2.type_param),
        }
    }

    /// Join two concrete objects under the recursion guard.
    fn join_object_pair(
        &mut self,
        dir: Direction,
        d1: &TupleData,
        d2: &TupleData,
    ) -> (ObjectId, RecursiveRef) {
        let key = (d1.object, d2.object);
        let recursive = join_recursive(dir, &d1.recursive, &d2.recursive);
        if let Some(&id) = self.guards[dir.index()].get(&key) {
            // Cycle: stand in for the merge of this pair. The id must
            // survive a meet, so it is always united in.
            let placeholder =
                join_recursive(Direction::Join, &RecursiveRef::single(id), &recursive);
            return (ObjectId::BOTTOM, placeholder);
        }

        let id = self.recursive.prepare();
        self.guards[dir.index()].insert(key, id);
        let merged = ensure_sufficient_stack(|| self.lub_object(key.0, key.1));
        let removed = self.guards[dir.index()].remove(&key);
        assert!(
            removed.is_some(),
            "recursion guard lost the entry for object pair {key:?}"
        );
        self.resolve_recursive(dir, id, merged);
        (merged, recursive)
    }

    /// Backpatch every placeholder of merge `id` with the merged object.
    ///
    /// Patching joins objects, which can register further placeholders
    /// for the same id, so this repeats until none are left.
    fn resolve_recursive(&mut self, dir: Direction, id: u32, object: ObjectId) {
        loop {
            let placeholders = self.recursive.take(id);
            if placeholders.is_empty() {
                break;
            }
            for tuple in placeholders {
                let data = self.pool.without_recursive_id(tuple, id);
                let has_object = data.is_object();
                self.pool.patch_tuple(tuple, data);
                let resolved = if has_object {
                    let wrapped = self.pool.object_tuple(object);
                    let joined = self.lub_in(dir, tuple, wrapped);
                    self.pool.object_of(joined)
                } else {
                    object
                };
                let mut data = self.pool.tuple(tuple).clone();
                data.object = resolved;
                self.pool.patch_tuple(tuple, data);
            }
        }
        self.recursive.finish(id);
    }
}

/// In a meet, an object met with a placeholder would vanish; keep both.
fn restore_recursive_pair(data: &mut TupleData, d1: &TupleData, d2: &TupleData) {
    let lost_object = !data.is_object();
    let lost_recursive = !data.has_recursive_reference();
    if lost_object {
        if d1.has_recursive_reference() && d2.is_object() {
            data.object = d2.object;
        }
        if d2.has_recursive_reference() && d1.is_object() {
            data.object = d1.object;
        }
    }
    if lost_recursive {
        if d1.has_recursive_reference() && d2.is_object() {
            data.recursive = d1.recursive.clone();
        }
        if d2.has_recursive_reference() && d1.is_object() {
            data.recursive = d2.recursive.clone();
        }
    }
}

fn join_flat(dir: Direction, f1: Flat, f2: Flat) -> Flat {
    let top = match dir {
        Direction::Join => f1.is_top() || f2.is_top(),
        Direction::Meet => f1.is_top() && f2.is_top(),
    };
    if top {
        Flat::Top
    } else {
        Flat::Bottom
    }
}

/// Object slots where at least one side is a sentinel.
fn join_simple_object(dir: Direction, o1: ObjectId, o2: ObjectId) -> ObjectId {
    let (bot, top) = match dir {
        Direction::Join => (ObjectId::BOTTOM, ObjectId::TOP),
        Direction::Meet => (ObjectId::TOP, ObjectId::BOTTOM),
    };
    if o1 == bot {
        o2
    } else if o2 == bot {
        o1
    } else {
        debug_assert!(o1 == top || o2 == top, "concrete object pair outside the guard");
        top
    }
}

fn join_recursive(dir: Direction, r1: &RecursiveRef, r2: &RecursiveRef) -> RecursiveRef {
    let (bot, top) = match dir {
        Direction::Join => (RecursiveRef::Bottom, RecursiveRef::Top),
        Direction::Meet => (RecursiveRef::Top, RecursiveRef::Bottom),
    };
    if r1 == r2 {
        return r1.clone();
    }
    if *r1 == bot {
        return r2.clone();
    }
    if *r2 == bot {
        return r1.clone();
    }
    match (r1, r2) {
        (RecursiveRef::Some(ids1), RecursiveRef::Some(ids2)) => {
            let mut ids: RecursionIds = ids1.iter().chain(ids2).copied().collect();
            ids.sort_unstable();
            ids.dedup();
            RecursiveRef::Some(ids)
        }
        _ => top,
    }
}

fn join_type_param(dir: Direction, p1: TypeParam, p2: TypeParam) -> TypeParam {
    let (bot, top) = match dir {
        Direction::Join => (TypeParam::Bottom, TypeParam::Top),
        Direction::Meet => (TypeParam::Top, TypeParam::Bottom),
    };
    if p1 == p2 {
        p1
    } else if p1 == bot {
        p2
    } else if p2 == bot {
        p1
    } else {
        top
    }
}
