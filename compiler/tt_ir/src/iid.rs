//! Instruction ids, call scopes and source locations.

use std::fmt;

use crate::Name;

/// Instruction id: the identity of one instrumented program point.
///
/// Every statement of a trace carries the id of the source operation that
/// produced it. Function ids are the instruction ids of the function
/// literals, so the same type doubles as a function identity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Iid(u32);

impl Iid {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Iid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for Iid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One invocation of one function: `(function iid, call count)`.
///
/// Variables local to an invocation carry its call count; the pair
/// identifies the activation they belong to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ScopeId {
    pub function: Iid,
    pub call: u32,
}

impl ScopeId {
    pub const fn new(function: Iid, call: u32) -> Self {
        Self { function, call }
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.function, self.call)
    }
}

/// Source position of an instruction, as reported by the instrumentation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SourceLocation {
    pub file: Name,
    pub line: u32,
    pub column: u32,
}
