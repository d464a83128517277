//! Type environments: variable to tuple maps.

use rustc_hash::FxHashMap;
use tt_ir::VarId;

use crate::TupleId;

/// Anything a call's inputs can be read from.
pub trait TypeEnv {
    /// The type of `var`; Bottom when nothing is known.
    fn read(&mut self, var: VarId) -> TupleId;
}

/// A plain, immutable-once-built environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    types: FxHashMap<VarId, TupleId>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, var: VarId) -> TupleId {
        self.types.get(&var).copied().unwrap_or(TupleId::BOTTOM)
    }

    #[inline]
    pub fn contains(&self, var: VarId) -> bool {
        self.types.contains_key(&var)
    }

    pub fn insert(&mut self, var: VarId, ty: TupleId) {
        self.types.insert(var, ty);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Entries in ascending variable order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, TupleId)> + '_ {
        let mut entries: Vec<_> = self.types.iter().map(|(&var, &ty)| (var, ty)).collect();
        entries.sort_unstable_by_key(|&(var, _)| var);
        entries.into_iter()
    }
}

impl TypeEnv for Environment {
    fn read(&mut self, var: VarId) -> TupleId {
        self.get(var)
    }
}

impl TypeEnv for &Environment {
    fn read(&mut self, var: VarId) -> TupleId {
        self.get(var)
    }
}

impl FromIterator<(VarId, TupleId)> for Environment {
    fn from_iter<I: IntoIterator<Item = (VarId, TupleId)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}
