use pretty_assertions::assert_eq;
use tt_ir::{CallKind, Iid, ObservedCall, ScopeId, StringInterner, Variable};

use super::*;
use crate::lattice::{FunctionLatticeKind, LatticeConfig};
use crate::pool::TypePool;

fn lattice() -> TypeLattice {
    TypeLattice::new(
        TypePool::new(StringInterner::shared()),
        LatticeConfig::default(),
    )
}

// ── Values ──────────────────────────────────────────────────────────

#[test]
fn primitives_ascribe_to_their_kind() {
    let mut lattice = lattice();
    let heap = ObservedHeap::new();
    let mut ascriber = Ascriber::new(&heap);
    assert_eq!(ascriber.ascribe(&mut lattice, Value::Number), TupleId::NUMBER);
    assert_eq!(ascriber.ascribe(&mut lattice, Value::String), TupleId::STRING);
    assert_eq!(ascriber.ascribe(&mut lattice, Value::Boolean), TupleId::BOOLEAN);
    assert_eq!(ascriber.ascribe(&mut lattice, Value::Null), TupleId::NULL);
    assert_eq!(
        ascriber.ascribe(&mut lattice, Value::Undefined),
        TupleId::UNDEFINED
    );
}

#[test]
fn objects_ascribe_structurally() {
    let mut lattice = lattice();
    let (x, label) = (lattice.pool().name("x"), lattice.pool().name("label"));
    let mut heap = ObservedHeap::new();
    let mut observed = HeapObject::new(ObjectKind::Plain)
        .with_property(x, Value::Number)
        .with_property(label, Value::String);
    observed.read_only = vec![label, lattice.pool().name("missing")];
    observed.allocation_scope = Some(ScopeId::new(Iid::from_raw(3), 1));
    let object = heap.alloc(observed);

    let tuple = Ascriber::new(&heap).ascribe(&mut lattice, Value::Object(object));
    let pool = lattice.pool();
    assert_eq!(pool.format_tuple(tuple), "{label: String, x: Number}");
    let data = pool.object(pool.object_of(tuple));
    assert_eq!(data.classification, Classification::OBJECT);
    assert_eq!(data.read_only.iter().copied().collect::<Vec<_>>(), vec![label]);
    assert_eq!(data.allocation_scope, Some(ScopeId::new(Iid::from_raw(3), 1)));
}

#[test]
fn array_elements_share_one_summary_property() {
    let mut lattice = lattice();
    let mut heap = ObservedHeap::new();
    let array = heap.alloc(
        HeapObject::new(ObjectKind::Array)
            .with_property(lattice.pool().name("0"), Value::Number)
            .with_property(lattice.pool().name("1"), Value::Undefined),
    );
    let tuple = Ascriber::new(&heap).ascribe(&mut lattice, Value::Object(array));
    assert_eq!(
        lattice.pool().format_tuple(tuple),
        "~Array<(Number,Undefined)>"
    );
}

#[test]
fn back_edges_ascribe_to_object_top() {
    let mut lattice = lattice();
    let next = lattice.pool().name("next");
    let mut heap = ObservedHeap::new();
    let node = heap.alloc(HeapObject::new(ObjectKind::Plain));
    heap.set(
        node,
        HeapObject::new(ObjectKind::Plain).with_property(next, Value::Object(node)),
    );
    let tuple = Ascriber::new(&heap).ascribe(&mut lattice, Value::Object(node));
    assert_eq!(lattice.pool().format_tuple(tuple), "{next: Object_⊤}");
}

#[test]
fn shared_objects_are_ascribed_once() {
    let mut lattice = lattice();
    let (a, b) = (lattice.pool().name("a"), lattice.pool().name("b"));
    let mut heap = ObservedHeap::new();
    let shared = heap.alloc(HeapObject::new(ObjectKind::Plain));
    let holder = heap.alloc(
        HeapObject::new(ObjectKind::Plain)
            .with_property(a, Value::Object(shared))
            .with_property(b, Value::Object(shared)),
    );
    let tuple = Ascriber::new(&heap).ascribe(&mut lattice, Value::Object(holder));
    let pool = lattice.pool();
    let data = pool.object(pool.object_of(tuple));
    assert_eq!(data.property(a), data.property(b));
}

// ── Functions ───────────────────────────────────────────────────────

#[test]
fn uncalled_functions_accept_any_call() {
    let mut lattice = lattice();
    let mut heap = ObservedHeap::new();
    let function = heap.alloc(HeapObject::new(ObjectKind::Function));
    let tuple = Ascriber::new(&heap).ascribe(&mut lattice, Value::Object(function));
    assert_eq!(*lattice.pool().function_of(tuple), FunctionType::Top);
}

#[test]
fn observed_calls_become_signatures() {
    let mut lattice = TypeLattice::new(
        TypePool::new(StringInterner::shared()),
        LatticeConfig::simple_subtyping(FunctionLatticeKind::GenericOrLub),
    );
    let mut heap = ObservedHeap::new();
    let identity = heap.alloc(
        HeapObject::new(ObjectKind::Function)
            .with_call(ObservedCall {
                base: Value::Undefined,
                args: vec![Value::Number],
                result: Value::Number,
                kind: CallKind::Function,
            })
            .with_call(ObservedCall {
                base: Value::Undefined,
                args: vec![Value::String],
                result: Value::String,
                kind: CallKind::Function,
            }),
    );
    let tuple = Ascriber::new(&heap).ascribe(&mut lattice, Value::Object(identity));
    let function = lattice.pool().function_of(tuple).clone();
    assert_eq!(
        lattice.pool().format_function(&function),
        "(E) -> E @ Undefined"
    );
}

// ── Environments ────────────────────────────────────────────────────

#[test]
fn unnamed_variables_join_their_values() {
    let mut lattice = lattice();
    let mut variables = VariableTable::new();
    let tmp = variables.intern(Variable::temporary(Iid::from_raw(1), None));
    let named = variables.intern(Variable::named(lattice.pool().name("x"), None));
    let unseen = variables.intern(Variable::temporary(Iid::from_raw(2), None));

    let mut observations = Observations::new();
    observations.observe(tmp, Value::Number);
    observations.observe(tmp, Value::Undefined);
    observations.observe(named, Value::String);

    let env = lattice.ascribe_observations(&variables, &observations);
    assert_eq!(env.len(), 1);
    assert_eq!(lattice.pool().format_tuple(env.get(tmp)), "(Number,Undefined)");
    assert_eq!(env.get(named), TupleId::BOTTOM);
    assert!(!env.contains(unseen));
}
