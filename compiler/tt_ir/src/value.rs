//! Runtime values observed while the trace was recorded.
//!
//! These are the input of type ascription: every unnamed variable of a trace
//! is seeded with the join of the types of the values it held.

use rustc_hash::FxHashMap;

use crate::{Name, ScopeId, VarId};

/// Handle of an object in an [`ObservedHeap`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ObjectRef(u32);

impl ObjectRef {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// An observed value. Primitive payloads are irrelevant to typing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Value {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object(ObjectRef),
}

/// Kind of an observed object, as reported by the instrumentation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum ObjectKind {
    #[default]
    Plain,
    Array,
    Map,
    Arguments,
    Function,
}

/// How an observed call invoked its callee.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CallKind {
    Constructor,
    Function,
    Method,
}

/// One observed invocation of a function object.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObservedCall {
    pub base: Value,
    pub args: Vec<Value>,
    pub result: Value,
    pub kind: CallKind,
}

/// Snapshot of one heap object.
#[derive(Clone, Debug, Default)]
pub struct HeapObject {
    pub kind: ObjectKind,
    pub properties: Vec<(Name, Value)>,
    pub read_only: Vec<Name>,
    pub calls: Vec<ObservedCall>,
    pub is_abstract: bool,
    /// Activation the object was allocated in; `None` for global code.
    pub allocation_scope: Option<ScopeId>,
}

impl HeapObject {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_property(mut self, name: Name, value: Value) -> Self {
        self.properties.push((name, value));
        self
    }

    #[must_use]
    pub fn with_call(mut self, call: ObservedCall) -> Self {
        self.calls.push(call);
        self
    }
}

/// All objects observed during recording.
#[derive(Clone, Debug, Default)]
pub struct ObservedHeap {
    objects: Vec<HeapObject>,
}

impl ObservedHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    /// Panics if the heap exceeds `u32::MAX` objects.
    pub fn alloc(&mut self, object: HeapObject) -> ObjectRef {
        let raw = u32::try_from(self.objects.len())
            .unwrap_or_else(|_| panic!("observed heap exceeded u32::MAX objects"));
        self.objects.push(object);
        ObjectRef(raw)
    }

    #[inline]
    pub fn get(&self, object: ObjectRef) -> &HeapObject {
        &self.objects[object.0 as usize]
    }

    /// Replace an object after allocation, for building cyclic heaps.
    pub fn set(&mut self, object: ObjectRef, data: HeapObject) {
        self.objects[object.0 as usize] = data;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// The heap plus, per variable, every value it held.
#[derive(Clone, Debug, Default)]
pub struct Observations {
    pub heap: ObservedHeap,
    pub values: FxHashMap<VarId, Vec<Value>>,
}

impl Observations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, var: VarId, value: Value) {
        self.values.entry(var).or_default().push(value);
    }

    pub fn values_of(&self, var: VarId) -> &[Value] {
        self.values.get(&var).map_or(&[], Vec::as_slice)
    }
}
