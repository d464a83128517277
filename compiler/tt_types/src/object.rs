//! Object and function type data.

use std::collections::{BTreeMap, BTreeSet};

use smallvec::SmallVec;
use tt_ir::{Name, ScopeId};

use crate::kinds::{CallKinds, Classification};
use crate::TupleId;

/// Argument types of a signature.
pub type ArgTypes = SmallVec<[TupleId; 4]>;

/// One call signature.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SingleFunction {
    pub base: TupleId,
    pub args: ArgTypes,
    pub result: TupleId,
    pub call_kinds: CallKinds,
}

impl SingleFunction {
    pub fn new(base: TupleId, args: &[TupleId], result: TupleId, call_kinds: CallKinds) -> Self {
        Self {
            base,
            args: args.iter().copied().collect(),
            result,
            call_kinds,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum FunctionType {
    /// Not callable.
    Bottom,
    /// Callable with any signature.
    Top,
    Single(SingleFunction),
    /// Overloaded: every member is a valid signature.
    Intersection(Vec<SingleFunction>),
}

impl FunctionType {
    /// The signatures a call may match, flattened.
    pub fn signatures(&self) -> &[SingleFunction] {
        match self {
            FunctionType::Bottom | FunctionType::Top => &[],
            FunctionType::Single(single) => std::slice::from_ref(single),
            FunctionType::Intersection(members) => members,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectData {
    pub properties: BTreeMap<Name, TupleId>,
    pub function: FunctionType,
    pub classification: Classification,
    /// Always a subset of the property names.
    pub read_only: BTreeSet<Name>,
    pub is_abstract: bool,
    /// Activation the object was allocated in; `None` for global code.
    pub allocation_scope: Option<ScopeId>,
}

impl ObjectData {
    pub fn new(classification: Classification) -> Self {
        Self {
            properties: BTreeMap::new(),
            function: FunctionType::Bottom,
            classification,
            read_only: BTreeSet::new(),
            is_abstract: false,
            allocation_scope: None,
        }
    }

    pub(crate) fn bottom() -> Self {
        Self::new(Classification::empty())
    }

    pub(crate) fn top() -> Self {
        Self {
            function: FunctionType::Top,
            ..Self::new(Classification::TOP)
        }
    }

    #[must_use]
    pub fn with_property(mut self, name: Name, ty: TupleId) -> Self {
        self.properties.insert(name, ty);
        self
    }

    #[must_use]
    pub fn with_function(mut self, function: FunctionType) -> Self {
        self.function = function;
        self
    }

    #[inline]
    pub fn property(&self, name: Name) -> Option<TupleId> {
        self.properties.get(&name).copied()
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        self.function != FunctionType::Bottom
    }
}
