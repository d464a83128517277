//! Storage locations and their canonical handles.
//!
//! A [`Variable`] describes a storage location structurally. The
//! [`VariableTable`] canonicalizes variables: structurally equal variables
//! are interned once and referred to by a [`VarId`], so maps keyed by
//! variables hash a single `u32`.

use rustc_hash::FxHashMap;

use crate::{Iid, Name, ScopeId};

/// Canonical handle of a [`Variable`] within one [`VariableTable`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The activation a variable belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CallContext {
    /// The concrete call count of the enclosing function invocation.
    Count(u32),
    /// A context id assigned by a call-stack abstraction.
    Abstract(u32),
}

/// A storage location.
///
/// Named variables are source-level variables. Unnamed variables are
/// synthetic temporaries introduced by the trace language (call arguments,
/// results, intermediate values), identified by their allocation site.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Variable {
    pub named: bool,
    pub name: Option<Name>,
    pub iid: Option<Iid>,
    pub function_iid: Option<Iid>,
    pub context: Option<CallContext>,
    /// Always widen on write, regardless of the precision policy.
    pub force_merge: bool,
}

impl Variable {
    /// A source-level variable, optionally scoped to a function.
    pub fn named(name: Name, function_iid: Option<Iid>) -> Self {
        Self {
            named: true,
            name: Some(name),
            iid: None,
            function_iid,
            context: None,
            force_merge: false,
        }
    }

    /// A temporary allocated at `iid`.
    pub fn temporary(iid: Iid, function_iid: Option<Iid>) -> Self {
        Self {
            named: false,
            name: None,
            iid: Some(iid),
            function_iid,
            context: None,
            force_merge: false,
        }
    }

    #[must_use]
    pub fn in_call(mut self, call_count: u32) -> Self {
        self.context = Some(CallContext::Count(call_count));
        self
    }

    #[must_use]
    pub fn merged(mut self) -> Self {
        self.force_merge = true;
        self
    }

    /// The concrete activation this variable lives in, if any.
    pub fn scope(&self) -> Option<ScopeId> {
        match (self.function_iid, self.context) {
            (Some(function), Some(CallContext::Count(call))) => Some(ScopeId::new(function, call)),
            _ => None,
        }
    }
}

/// Interning table for variables.
#[derive(Clone, Debug, Default)]
pub struct VariableTable {
    variables: Vec<Variable>,
    ids: FxHashMap<Variable, VarId>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `variable`, returning the existing handle for a structurally
    /// equal variable if there is one.
    ///
    /// # Panics
    /// Panics if the table exceeds `u32::MAX` variables.
    pub fn intern(&mut self, variable: Variable) -> VarId {
        if let Some(&id) = self.ids.get(&variable) {
            return id;
        }
        let raw = u32::try_from(self.variables.len())
            .unwrap_or_else(|_| panic!("variable table exceeded u32::MAX entries"));
        let id = VarId(raw);
        self.variables.push(variable.clone());
        self.ids.insert(variable, id);
        id
    }

    /// Look up the handle of an already interned variable.
    pub fn lookup(&self, variable: &Variable) -> Option<VarId> {
        self.ids.get(variable).copied()
    }

    #[inline]
    pub fn get(&self, id: VarId) -> &Variable {
        &self.variables[id.index()]
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// All handles in interning order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.variables.len()).map(|i| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "intern() guarantees the length fits in u32"
            )]
            VarId(i as u32)
        })
    }
}

#[cfg(test)]
mod tests;
