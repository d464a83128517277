//! Call-stack abstractions.
//!
//! A call abstraction watches calls as they are replayed and assigns every
//! concrete activation ([`ScopeId`]) an abstract context id. Temporaries of
//! activations mapped to the same context share one abstract variable.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tt_ir::{Iid, ScopeId};
use tt_types::{FunctionType, SingleFunction, TupleId, TypePool};

use crate::precision::{PrecisionConfig, Sensitivity};

/// A function entry as seen by a call abstraction.
#[derive(Copy, Clone, Debug)]
pub struct FunctionEntry<'a> {
    pub iid: Iid,
    pub scope: ScopeId,
    pub function: &'a FunctionType,
    pub base: TupleId,
    pub args: &'a [TupleId],
}

/// Maps activations to abstract contexts while monitoring calls.
pub trait CallAbstraction {
    /// The abstract context of `scope`; `None` keeps the concrete one.
    fn context(&self, scope: ScopeId) -> Option<u32>;

    /// A call site is about to transfer control.
    fn call(&mut self, _iid: Iid) {}

    /// Control entered a function.
    fn enter(&mut self, pool: &TypePool, entry: &FunctionEntry<'_>);

    /// Control returned from a function.
    fn exit(&mut self) {}
}

/// The call abstraction selected by `precision`.
pub fn call_abstraction(precision: &PrecisionConfig) -> Box<dyn CallAbstraction> {
    let Some(callstack) = precision.callstack else {
        return Box::new(NoCallAbstraction);
    };
    match callstack.sensitivity {
        Sensitivity::CallSite => Box::new(SyntacticCallstack::new(callstack.height)),
        Sensitivity::ParameterValues => Box::new(ParameterTypesCallstack::new(callstack.height)),
        Sensitivity::GenericParameterInstantiations => {
            Box::new(GenericInstantiations::default())
        }
    }
}

fn next_id(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("call contexts exceeded u32::MAX"))
}

/// The innermost `height` frames of `stack`.
fn window<T>(stack: &[T], height: Option<usize>) -> &[T] {
    match height {
        Some(k) if stack.len() > k => &stack[stack.len() - k..],
        _ => stack,
    }
}

/// Every activation keeps its own context.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoCallAbstraction;

impl CallAbstraction for NoCallAbstraction {
    fn context(&self, _scope: ScopeId) -> Option<u32> {
        None
    }

    fn enter(&mut self, _pool: &TypePool, _entry: &FunctionEntry<'_>) {}
}

/// Activations reached through the same chain of call sites share a
/// context (k-CFA style).
#[derive(Clone, Debug, Default)]
pub struct SyntacticCallstack {
    height: Option<usize>,
    stack: Vec<Iid>,
    stack_ids: FxHashMap<Vec<Iid>, u32>,
    contexts: FxHashMap<ScopeId, u32>,
}

impl SyntacticCallstack {
    pub fn new(height: Option<usize>) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }
}

impl CallAbstraction for SyntacticCallstack {
    fn context(&self, scope: ScopeId) -> Option<u32> {
        self.contexts.get(&scope).copied()
    }

    fn call(&mut self, iid: Iid) {
        self.stack.push(iid);
    }

    fn enter(&mut self, _pool: &TypePool, entry: &FunctionEntry<'_>) {
        let key = window(&self.stack, self.height).to_vec();
        let fresh = next_id(self.stack_ids.len());
        let id = *self.stack_ids.entry(key).or_insert(fresh);
        self.contexts.insert(entry.scope, id);
    }

    fn exit(&mut self) {
        self.stack.pop();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Frame {
    iid: Iid,
    parameters: SmallVec<[TupleId; 4]>,
}

/// Activations share a context when their innermost frames entered the
/// same functions with structurally equal parameter types.
#[derive(Clone, Debug, Default)]
pub struct ParameterTypesCallstack {
    height: Option<usize>,
    stack: Vec<Frame>,
    /// Per entered function: representative frame windows and their ids.
    representatives: FxHashMap<Iid, Vec<(Vec<Frame>, u32)>>,
    contexts: FxHashMap<ScopeId, u32>,
    next: u32,
}

impl ParameterTypesCallstack {
    pub fn new(height: Option<usize>) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }
}

fn frames_equal(pool: &TypePool, a: &Frame, b: &Frame) -> bool {
    a.iid == b.iid
        && a.parameters.len() == b.parameters.len()
        && a.parameters
            .iter()
            .zip(&b.parameters)
            .all(|(&p, &q)| pool.tuples_equal(p, q))
}

impl CallAbstraction for ParameterTypesCallstack {
    fn context(&self, scope: ScopeId) -> Option<u32> {
        self.contexts.get(&scope).copied()
    }

    fn enter(&mut self, pool: &TypePool, entry: &FunctionEntry<'_>) {
        self.stack.push(Frame {
            iid: entry.iid,
            parameters: entry.args.iter().copied().collect(),
        });
        let frames = window(&self.stack, self.height);
        let candidates = self.representatives.entry(entry.iid).or_default();
        let found = candidates
            .iter()
            .find(|(candidate, _)| {
                candidate.len() == frames.len()
                    && candidate
                        .iter()
                        .zip(frames)
                        .all(|(c, f)| frames_equal(pool, c, f))
            })
            .map(|&(_, id)| id);
        let id = if let Some(id) = found {
            id
        } else {
            let id = self.next;
            self.next += 1;
            candidates.push((frames.to_vec(), id));
            id
        };
        self.contexts.insert(entry.scope, id);
    }

    fn exit(&mut self) {
        self.stack.pop();
    }
}

/// Activations of a generic function share a context per instantiation of
/// its type parameter; other activations share one context per function
/// entry point.
#[derive(Clone, Debug, Default)]
pub struct GenericInstantiations {
    labels: FxHashMap<String, u32>,
    names: Vec<String>,
    contexts: FxHashMap<ScopeId, u32>,
}

impl GenericInstantiations {
    /// The label of context `id`, e.g. `#4 w. E as Number`.
    pub fn label(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }
}

/// The actual type bound to the callee's type parameter, if any position
/// of the declared signature is one.
fn instantiation(
    pool: &TypePool,
    declared: &SingleFunction,
    base: TupleId,
    args: &[TupleId],
) -> Option<TupleId> {
    let mut pairs = vec![(declared.base, base)];
    pairs.extend(declared.args.iter().copied().zip(args.iter().copied()));

    let mut property_pairs = Vec::new();
    for &(declared, actual) in &pairs {
        let (declared, actual) = (pool.tuple(declared), pool.tuple(actual));
        if !declared.is_object() || !actual.is_object() {
            continue;
        }
        let actual = pool.object(actual.object);
        for (&name, &property) in &pool.object(declared.object).properties {
            property_pairs.push((property, actual.property(name).unwrap_or(TupleId::BOTTOM)));
        }
    }
    pairs.extend(property_pairs);

    pairs
        .into_iter()
        .find(|&(declared, _)| {
            pool.tuple(declared).is_type_parameter() && !pool.tuples_equal(declared, TupleId::TOP)
        })
        .map(|(_, actual)| actual)
}

impl CallAbstraction for GenericInstantiations {
    fn context(&self, scope: ScopeId) -> Option<u32> {
        self.contexts.get(&scope).copied()
    }

    fn enter(&mut self, pool: &TypePool, entry: &FunctionEntry<'_>) {
        let instantiated = match entry.function {
            FunctionType::Single(single) => instantiation(pool, single, entry.base, entry.args),
            FunctionType::Bottom | FunctionType::Top | FunctionType::Intersection(_) => None,
        };
        let label = match instantiated {
            Some(ty) => format!("{} w. E as {}", entry.iid, pool.format_tuple(ty)),
            None => entry.iid.to_string(),
        };
        let id = if let Some(&id) = self.labels.get(&label) {
            id
        } else {
            let id = next_id(self.names.len());
            self.names.push(label.clone());
            self.labels.insert(label, id);
            id
        };
        self.contexts.insert(entry.scope, id);
    }
}
