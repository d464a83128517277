//! Per-run arena of tuple and object types.
//!
//! The pool owns every tuple and object created during one analysis run.
//! Handles are only meaningful for the pool that minted them.
//!
//! Construction normalizes: data equal to a pre-interned constant returns
//! the constant's handle, so `BOTTOM`/`TOP` and the single-kind constants
//! can be recognized by comparing handles.

use tt_ir::{Name, SharedInterner, StringInterner};

use crate::kinds::{Classification, RecursiveRef, TypeKind};
use crate::object::{FunctionType, ObjectData};
use crate::tuple::TupleData;
use crate::{ObjectId, TupleId};

/// Pre-interned single-kind tuples, in handle order starting at `NUMBER`.
const CONSTANT_KINDS: [TypeKind; 9] = [
    TypeKind::Number,
    TypeKind::String,
    TypeKind::Boolean,
    TypeKind::Undefined,
    TypeKind::Null,
    TypeKind::Object,
    TypeKind::RecursiveReference,
    TypeKind::ObjectTopDueToRecursion,
    TypeKind::TypeParameter,
];

pub struct TypePool {
    interner: SharedInterner,
    tuples: Vec<TupleData>,
    objects: Vec<ObjectData>,
}

impl TypePool {
    pub fn new(interner: SharedInterner) -> Self {
        let mut tuples = Vec::with_capacity(256);
        tuples.push(TupleData::BOTTOM);
        tuples.push(TupleData::TOP);
        tuples.extend(CONSTANT_KINDS.iter().map(|&kind| TupleData::single_top(kind)));
        debug_assert_eq!(tuples.len(), TupleId::PRE_INTERNED as usize);

        let mut objects = Vec::with_capacity(64);
        objects.push(ObjectData::bottom());
        objects.push(ObjectData::top());
        debug_assert_eq!(objects.len(), ObjectId::PRE_INTERNED as usize);

        Self {
            interner,
            tuples,
            objects,
        }
    }

    #[inline]
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    #[inline]
    pub fn shared_interner(&self) -> &SharedInterner {
        &self.interner
    }

    #[inline]
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    #[inline]
    pub fn tuple(&self, id: TupleId) -> &TupleData {
        &self.tuples[id.index()]
    }

    #[inline]
    pub fn object(&self, id: ObjectId) -> &ObjectData {
        &self.objects[id.index()]
    }

    pub fn tuple_count(&self) -> usize {
        self.tuples.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Allocate a tuple, reusing a pre-interned constant for its shape.
    ///
    /// # Panics
    /// Panics if the pool exceeds `u32::MAX` tuples.
    pub fn make_tuple(&mut self, data: TupleData) -> TupleId {
        if let Some(constant) = Self::constant_for(&data) {
            return constant;
        }
        let raw = u32::try_from(self.tuples.len())
            .unwrap_or_else(|_| panic!("type pool exceeded u32::MAX tuples"));
        self.tuples.push(data);
        TupleId::from_raw(raw)
    }

    /// Allocate an object; sentinel-shaped data returns the sentinel.
    ///
    /// # Panics
    /// Panics if the pool exceeds `u32::MAX` objects.
    pub fn make_object(&mut self, data: ObjectData) -> ObjectId {
        if data == self.objects[ObjectId::BOTTOM.index()] {
            return ObjectId::BOTTOM;
        }
        if data == self.objects[ObjectId::TOP.index()] {
            return ObjectId::TOP;
        }
        let raw = u32::try_from(self.objects.len())
            .unwrap_or_else(|_| panic!("type pool exceeded u32::MAX objects"));
        self.objects.push(data);
        ObjectId::from_raw(raw)
    }

    /// Reserve an object handle whose data is supplied later by
    /// [`define_object`](Self::define_object), so cyclic object graphs
    /// can be built. Until defined the object has no properties.
    ///
    /// # Panics
    /// Panics if the pool exceeds `u32::MAX` objects.
    pub fn reserve_object(&mut self) -> ObjectId {
        let raw = u32::try_from(self.objects.len())
            .unwrap_or_else(|_| panic!("type pool exceeded u32::MAX objects"));
        self.objects.push(ObjectData::new(Classification::OBJECT));
        ObjectId::from_raw(raw)
    }

    /// # Panics
    /// Panics if `id` is a sentinel.
    pub fn define_object(&mut self, id: ObjectId, data: ObjectData) {
        assert!(id.is_some(), "cannot redefine sentinel object {id:?}");
        self.objects[id.index()] = data;
    }

    fn constant_for(data: &TupleData) -> Option<TupleId> {
        if *data == TupleData::BOTTOM {
            return Some(TupleId::BOTTOM);
        }
        if *data == TupleData::TOP {
            return Some(TupleId::TOP);
        }
        CONSTANT_KINDS
            .iter()
            .position(|&kind| *data == TupleData::single_top(kind))
            .map(|offset| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "offset is below CONSTANT_KINDS.len()"
                )]
                let offset = offset as u32;
                TupleId::from_raw(TupleId::NUMBER.raw() + offset)
            })
    }

    /// The tuple holding only `object`.
    pub fn object_tuple(&mut self, object: ObjectId) -> TupleId {
        self.make_tuple(TupleData::with_object(object))
    }

    /// The tuple holding only the named type parameter.
    pub fn type_parameter(&mut self, name: Name) -> TupleId {
        self.make_tuple(TupleData::with_type_param(name))
    }

    #[inline]
    pub fn object_of(&self, tuple: TupleId) -> ObjectId {
        self.tuple(tuple).object
    }

    /// Function type of the tuple's object; Bottom for non-objects.
    #[inline]
    pub fn function_of(&self, tuple: TupleId) -> &FunctionType {
        &self.object(self.object_of(tuple)).function
    }

    #[inline]
    pub fn is_function(&self, tuple: TupleId) -> bool {
        !matches!(self.function_of(tuple), FunctionType::Bottom)
    }

    /// Replace a tuple's data in place.
    ///
    /// Only the recursive-merge backpatching may call this: it rewrites
    /// placeholder tuples created during the merge that is being resolved.
    pub(crate) fn patch_tuple(&mut self, id: TupleId, data: TupleData) {
        debug_assert!(
            id.raw() >= TupleId::PRE_INTERNED,
            "attempted to patch pre-interned tuple {id:?}"
        );
        self.tuples[id.index()] = data;
    }

    /// Copy of `tuple` with `id` removed from its recursive reference.
    pub(crate) fn without_recursive_id(&self, tuple: TupleId, id: u32) -> TupleData {
        let mut data = self.tuple(tuple).clone();
        if let RecursiveRef::Some(ids) = &mut data.recursive {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                data.recursive = RecursiveRef::Bottom;
            }
        }
        data
    }
}

impl std::fmt::Debug for TypePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypePool")
            .field("tuples", &self.tuples.len())
            .field("objects", &self.objects.len())
            .finish_non_exhaustive()
    }
}
