//! Object and property joins.

use std::collections::{BTreeMap, BTreeSet};

use super::{Direction, ObjectLatticeKind, TypeLattice};
use crate::object::ObjectData;
use crate::{ObjectId, TupleId};

impl TypeLattice {
    /// Join two objects.
    ///
    /// Only properties present (and not Bottom) on both sides survive;
    /// a property whose join is Bottom is dropped as well.
    pub fn lub_object(&mut self, o1: ObjectId, o2: ObjectId) -> ObjectId {
        if o1 == o2 {
            return o1;
        }
        if o1 == ObjectId::BOTTOM {
            return o2;
        }
        if o2 == ObjectId::BOTTOM {
            return o1;
        }
        if o1 == ObjectId::TOP || o2 == ObjectId::TOP {
            return ObjectId::TOP;
        }
        if self.pool.objects_equal(o1, o2) {
            return o1;
        }

        let a = self.pool.object(o1).clone();
        let b = self.pool.object(o2).clone();
        if self.config.sjs_ascription && a.is_abstract != b.is_abstract {
            return ObjectId::TOP;
        }

        let mut properties = BTreeMap::new();
        for (&name, &p1) in &a.properties {
            let Some(&p2) = b.properties.get(&name) else {
                continue;
            };
            if p1 == TupleId::BOTTOM || p2 == TupleId::BOTTOM {
                continue;
            }
            let merged = if self.pool.tuples_equal(p1, p2) {
                p1
            } else {
                self.lub_property(p1, p2)
            };
            if merged != TupleId::BOTTOM {
                properties.insert(name, merged);
            }
        }

        let function = self.lub_function(&a.function, &b.function);
        let read_only: BTreeSet<_> = a
            .read_only
            .union(&b.read_only)
            .filter(|name| properties.contains_key(*name))
            .copied()
            .collect();
        let allocation_scope = if a.allocation_scope == b.allocation_scope {
            a.allocation_scope
        } else {
            None
        };
        let merged = self.pool.make_object(ObjectData {
            properties,
            function,
            classification: a.classification | b.classification,
            read_only,
            is_abstract: a.is_abstract || b.is_abstract,
            allocation_scope,
        });

        if self.pool.objects_equal(merged, o1) {
            o1
        } else if self.pool.objects_equal(merged, o2) {
            o2
        } else if self.pool.objects_equal(merged, ObjectId::TOP) {
            ObjectId::TOP
        } else {
            merged
        }
    }

    /// Join two distinct property types.
    fn lub_property(&mut self, p1: TupleId, p2: TupleId) -> TupleId {
        match self.config.object {
            ObjectLatticeKind::FieldEquality => {
                if self.pool.tuples_equal(p1, p2) {
                    p1
                } else {
                    TupleId::BOTTOM
                }
            }
            ObjectLatticeKind::FieldLubUnderSubtyping => {
                let dir = if self.config.union_types {
                    Direction::Join
                } else {
                    Direction::Meet
                };
                self.lub_in(dir, p1, p2)
            }
        }
    }
}
