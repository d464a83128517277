//! Tuple type data.
//!
//! A tuple type is a fixed-slot record, one slot per [`TypeKind`]. The data
//! derives `Eq`/`Hash` at handle granularity: two tuples compare equal here
//! only when their object slots hold the same [`ObjectId`]. Structural
//! equality through objects lives in [`crate::equality`].

use tt_ir::Name;

use crate::kinds::{Flat, RecursiveRef, TypeKind, TypeParam};
use crate::ObjectId;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TupleData {
    pub object: ObjectId,
    pub null: Flat,
    pub string: Flat,
    pub number: Flat,
    pub boolean: Flat,
    pub undefined: Flat,
    pub recursive: RecursiveRef,
    pub object_top_due_to_recursion: Flat,
    pub type_param: TypeParam,
}

impl TupleData {
    pub const BOTTOM: Self = Self {
        object: ObjectId::BOTTOM,
        null: Flat::Bottom,
        string: Flat::Bottom,
        number: Flat::Bottom,
        boolean: Flat::Bottom,
        undefined: Flat::Bottom,
        recursive: RecursiveRef::Bottom,
        object_top_due_to_recursion: Flat::Bottom,
        type_param: TypeParam::Bottom,
    };

    pub const TOP: Self = Self {
        object: ObjectId::TOP,
        null: Flat::Top,
        string: Flat::Top,
        number: Flat::Top,
        boolean: Flat::Top,
        undefined: Flat::Top,
        recursive: RecursiveRef::Top,
        object_top_due_to_recursion: Flat::Bottom,
        type_param: TypeParam::Top,
    };

    /// The tuple with only `kind` set to its Top element.
    pub fn single_top(kind: TypeKind) -> Self {
        let mut data = Self::BOTTOM;
        match kind {
            TypeKind::Object => data.object = ObjectId::TOP,
            TypeKind::Null => data.null = Flat::Top,
            TypeKind::String => data.string = Flat::Top,
            TypeKind::Number => data.number = Flat::Top,
            TypeKind::Boolean => data.boolean = Flat::Top,
            TypeKind::Undefined => data.undefined = Flat::Top,
            TypeKind::RecursiveReference => data.recursive = RecursiveRef::Top,
            TypeKind::ObjectTopDueToRecursion => data.object_top_due_to_recursion = Flat::Top,
            TypeKind::TypeParameter => data.type_param = TypeParam::Top,
        }
        data
    }

    pub fn with_object(object: ObjectId) -> Self {
        Self {
            object,
            ..Self::BOTTOM
        }
    }

    pub fn with_type_param(name: Name) -> Self {
        Self {
            type_param: TypeParam::Named(name),
            ..Self::BOTTOM
        }
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        self.object != ObjectId::BOTTOM
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.null.is_top()
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.undefined.is_top()
    }

    #[inline]
    pub fn is_type_parameter(&self) -> bool {
        self.type_param != TypeParam::Bottom
    }

    #[inline]
    pub fn is_object_top_due_to_recursion(&self) -> bool {
        self.object_top_due_to_recursion.is_top()
    }

    /// Carries an unresolved recursive reference.
    #[inline]
    pub fn has_recursive_reference(&self) -> bool {
        self.recursive != RecursiveRef::Bottom
    }

    /// Whether `kind` holds anything but Bottom.
    pub fn has(&self, kind: TypeKind) -> bool {
        match kind {
            TypeKind::Object => self.is_object(),
            TypeKind::Null => self.null.is_top(),
            TypeKind::String => self.string.is_top(),
            TypeKind::Number => self.number.is_top(),
            TypeKind::Boolean => self.boolean.is_top(),
            TypeKind::Undefined => self.undefined.is_top(),
            TypeKind::RecursiveReference => self.has_recursive_reference(),
            TypeKind::ObjectTopDueToRecursion => self.object_top_due_to_recursion.is_top(),
            TypeKind::TypeParameter => self.is_type_parameter(),
        }
    }

    /// Copy with the undefined slot cleared.
    #[must_use]
    pub fn without_undefined(&self) -> Self {
        Self {
            undefined: Flat::Bottom,
            ..self.clone()
        }
    }
}

impl Default for TupleData {
    fn default() -> Self {
        Self::BOTTOM
    }
}
