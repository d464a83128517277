//! Per-slot element types of a tuple and the flag sets objects and
//! functions carry.

use bitflags::bitflags;
use smallvec::SmallVec;
use tt_ir::{CallKind, Name, ObjectKind};

/// The slots of a tuple type, in slot order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeKind {
    Object,
    Null,
    String,
    Number,
    Boolean,
    Undefined,
    RecursiveReference,
    ObjectTopDueToRecursion,
    TypeParameter,
}

/// Element of a two-point lattice.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Flat {
    Bottom,
    Top,
}

impl Flat {
    #[inline]
    pub const fn is_top(self) -> bool {
        matches!(self, Flat::Top)
    }
}

/// Ids of the in-progress merges a placeholder tuple stands in for.
pub type RecursionIds = SmallVec<[u32; 2]>;

/// The recursive-reference slot.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum RecursiveRef {
    Bottom,
    Top,
    /// Sorted, duplicate-free.
    Some(RecursionIds),
}

impl RecursiveRef {
    pub fn single(id: u32) -> Self {
        let mut ids = RecursionIds::new();
        ids.push(id);
        RecursiveRef::Some(ids)
    }
}

/// The type-parameter slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeParam {
    Bottom,
    Top,
    Named(Name),
}

bitflags! {
    /// Object classification, used by the classification-access checks.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct Classification: u8 {
        /// Structural object with statically known fields.
        const OBJECT = 1 << 0;
        const ARRAY = 1 << 1;
        const MAP = 1 << 2;
        const ARGUMENTS = 1 << 3;
        const FUNCTION = 1 << 4;
    }
}

impl Classification {
    /// Classification of `ObjectTop`.
    pub const TOP: Self = Self::OBJECT.union(Self::ARRAY).union(Self::MAP);

    pub fn of_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Plain => Self::OBJECT,
            ObjectKind::Array => Self::ARRAY,
            ObjectKind::Map => Self::MAP,
            ObjectKind::Arguments => Self::ARGUMENTS,
            ObjectKind::Function => Self::FUNCTION,
        }
    }
}

bitflags! {
    /// How a signature has been invoked.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct CallKinds: u8 {
        const CONSTRUCTOR = 1 << 0;
        const FUNCTION = 1 << 1;
        const METHOD = 1 << 2;
    }
}

impl CallKinds {
    pub fn of_kind(kind: CallKind) -> Self {
        match kind {
            CallKind::Constructor => Self::CONSTRUCTOR,
            CallKind::Function => Self::FUNCTION,
            CallKind::Method => Self::METHOD,
        }
    }
}
