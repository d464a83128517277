//! Handles into the type pool.
//!
//! Tuples and objects live in per-run arenas and are referenced by 32-bit
//! handles. Handle equality is *identity*: two structurally equal tuples
//! allocated separately have different handles. Recursion guards and the
//! join cache key on handles, never on structure.
//!
//! The sentinels every lattice needs are pre-interned at fixed indices so
//! that Bottom/Top checks are a single comparison.

use std::fmt;

/// Handle of a tuple type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct TupleId(u32);

impl TupleId {
    /// No information: every slot Bottom.
    pub const BOTTOM: Self = Self(0);
    /// Fully unknown: every slot Top except `ObjectTopDueToRecursion`.
    pub const TOP: Self = Self(1);

    // Single-kind convenience constants.
    pub const NUMBER: Self = Self(2);
    pub const STRING: Self = Self(3);
    pub const BOOLEAN: Self = Self(4);
    pub const UNDEFINED: Self = Self(5);
    pub const NULL: Self = Self(6);
    pub const OBJECT_TOP: Self = Self(7);
    pub const RECURSIVE_REFERENCE_TOP: Self = Self(8);
    pub const OBJECT_TOP_DUE_TO_RECURSION: Self = Self(9);
    pub const TYPE_PARAMETER_TOP: Self = Self(10);

    /// Number of pre-interned tuples.
    pub const PRE_INTERNED: u32 = 11;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::BOTTOM => write!(f, "TupleId(BOTTOM)"),
            Self::TOP => write!(f, "TupleId(TOP)"),
            other => write!(f, "TupleId({})", other.0),
        }
    }
}

/// Handle of an object type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    /// No object observed.
    pub const BOTTOM: Self = Self(0);
    /// Any object.
    pub const TOP: Self = Self(1);

    pub const PRE_INTERNED: u32 = 2;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// A structured object, neither sentinel.
    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 >= Self::PRE_INTERNED
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::BOTTOM => write!(f, "ObjectId(BOTTOM)"),
            Self::TOP => write!(f, "ObjectId(TOP)"),
            other => write!(f, "ObjectId({})", other.0),
        }
    }
}
