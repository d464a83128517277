use pretty_assertions::assert_eq;
use tt_ir::{Name, ScopeId, StringInterner};
use tt_types::{FunctionLatticeKind, LatticeConfig, TypePool};

use super::*;
use crate::abstraction::{call_abstraction, FunctionEntry};
use crate::precision::Sensitivity;

fn lattice() -> TypeLattice {
    TypeLattice::new(
        TypePool::new(StringInterner::shared()),
        LatticeConfig::simple_subtyping_with_union(FunctionLatticeKind::Intersection),
    )
}

struct Fixture {
    lattice: TypeLattice,
    variables: VariableTable,
    named: VarId,
    first_call: VarId,
    second_call: VarId,
}

/// A named variable plus one temporary in two activations of function #10.
fn fixture() -> Fixture {
    let lattice = lattice();
    let mut variables = VariableTable::new();
    let named = variables.intern(Variable::named(lattice.pool().name("x"), None));
    let tmp = Variable::temporary(Iid::from_raw(3), Some(Iid::from_raw(10)));
    let first_call = variables.intern(tmp.clone().in_call(1));
    let second_call = variables.intern(tmp.in_call(2));
    Fixture {
        lattice,
        variables,
        named,
        first_call,
        second_call,
    }
}

fn store(variables: &VariableTable, precision: PrecisionConfig) -> AbstractStore<'_> {
    AbstractStore::new(variables, precision, call_abstraction(&precision))
}

// ── Abstraction ─────────────────────────────────────────────────────

#[test]
fn activations_stay_apart_by_default() {
    let f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default());
    assert_ne!(store.abstract_var(f.first_call), store.abstract_var(f.second_call));
}

#[test]
fn context_insensitivity_merges_activations() {
    let f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default().with_context_insensitive());
    let merged = store.abstract_var(f.first_call);
    assert_eq!(store.abstract_var(f.second_call), merged);
    assert_eq!(store.concretes_of(merged), &[f.first_call, f.second_call]);
    assert_eq!(store.abstract_variables().get(merged).context, None);
}

#[test]
fn call_abstraction_maps_activations() {
    let f = fixture();
    let precision = PrecisionConfig::default().with_callstack(Sensitivity::CallSite, None);
    let mut store = store(&f.variables, precision);
    for call in [1, 2] {
        let entry = FunctionEntry {
            iid: Iid::from_raw(11),
            scope: ScopeId::new(Iid::from_raw(10), call),
            function: &tt_types::FunctionType::Top,
            base: TupleId::UNDEFINED,
            args: &[],
        };
        store.calls_mut().enter(f.lattice.pool(), &entry);
    }
    let merged = store.abstract_var(f.first_call);
    assert_eq!(store.abstract_var(f.second_call), merged);
    assert_eq!(
        store.abstract_variables().get(merged).context,
        Some(CallContext::Abstract(0))
    );
}

// ── Updates ─────────────────────────────────────────────────────────

#[test]
fn strong_updates_overwrite() {
    let mut f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default());
    store.write(&mut f.lattice, f.named, Some(TupleId::NUMBER));
    store.write(&mut f.lattice, f.named, Some(TupleId::STRING));
    assert_eq!(store.read(f.named), TupleId::STRING);
    assert!(!store.is_dirty());
}

#[test]
fn weak_updates_join_and_mark_dirty() {
    let mut f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default().with_flow_insensitive());
    store.write(&mut f.lattice, f.named, Some(TupleId::NUMBER));
    assert!(!store.is_dirty());
    store.write(&mut f.lattice, f.named, Some(TupleId::STRING));
    assert!(store.is_dirty());
    let ty = store.read(f.named);
    assert_eq!(f.lattice.pool().format_tuple(ty), "(String,Number)");

    store.clean();
    store.write(&mut f.lattice, f.named, Some(TupleId::NUMBER));
    assert!(!store.is_dirty());
}

#[test]
fn forced_merges_are_weak_even_when_flow_sensitive() {
    let mut f = fixture();
    let merged = f
        .variables
        .intern(Variable::temporary(Iid::from_raw(4), None).merged());
    let mut store = store(&f.variables, PrecisionConfig::default());
    store.write(&mut f.lattice, merged, Some(TupleId::NUMBER));
    store.write(&mut f.lattice, merged, Some(TupleId::STRING));
    assert!(store.is_dirty());
    let ty = store.read(merged);
    assert_eq!(f.lattice.pool().format_tuple(ty), "(String,Number)");
}

#[test]
fn first_write_after_a_read_marks_dirty() {
    let mut f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default());
    assert_eq!(store.read(f.named), TupleId::BOTTOM);
    store.write(&mut f.lattice, f.named, Some(TupleId::NUMBER));
    assert!(store.is_dirty());
}

#[test]
fn missing_types_are_not_written() {
    let mut f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default());
    store.write(&mut f.lattice, f.named, None);
    assert_eq!(store.peek(f.named), None);
    assert!(store.bookkeeping().writes.contains(&f.named));
}

/// An object with the properties `names[dropped..]`, all numbers.
fn object_without(lattice: &mut TypeLattice, names: &[Name], dropped: usize) -> TupleId {
    let mut data = tt_types::ObjectData::new(tt_types::Classification::OBJECT);
    for &name in &names[dropped..] {
        data = data.with_property(name, TupleId::NUMBER);
    }
    let pool = lattice.pool_mut();
    let object = pool.make_object(data);
    pool.object_tuple(object)
}

fn property_names(f: &Fixture) -> Vec<Name> {
    (0..=MAX_TYPE_CHANGES + 10)
        .map(|i| f.lattice.pool().name(&format!("p{i}")))
        .collect()
}

#[test]
fn endless_changes_across_rounds_widen_with_object_top() {
    let mut f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default().with_flow_insensitive());
    let names = property_names(&f);
    // Each round's write lacks one more property, so every join narrows
    // the stored object and counts as that round's change.
    for dropped in 0..=MAX_TYPE_CHANGES as usize + 1 {
        let ty = object_without(&mut f.lattice, &names, dropped);
        store.write(&mut f.lattice, f.named, Some(ty));
        store.clean();
    }
    let widened = store.peek(f.named).unwrap_or(TupleId::BOTTOM);
    assert!(f.lattice.pool().tuples_equal(widened, TupleId::OBJECT_TOP));
}

#[test]
fn many_changes_within_one_round_do_not_widen() {
    let mut f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default().with_flow_insensitive());
    let names = property_names(&f);
    for dropped in 0..=MAX_TYPE_CHANGES as usize + 10 {
        let ty = object_without(&mut f.lattice, &names, dropped);
        store.write(&mut f.lattice, f.named, Some(ty));
    }
    assert!(store.is_dirty());
    let stored = store.peek(f.named).unwrap_or(TupleId::BOTTOM);
    assert_eq!(f.lattice.pool().format_tuple(stored), "{p60: Number}");
}

// ── Bookkeeping ─────────────────────────────────────────────────────

#[test]
fn reads_and_writes_are_located() {
    let mut f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default());
    store.set_location(Iid::from_raw(1));
    store.write(&mut f.lattice, f.named, Some(TupleId::NUMBER));
    store.write(&mut f.lattice, f.first_call, Some(TupleId::NUMBER));
    store.set_location(Iid::from_raw(2));
    store.read(f.named);

    let book = store.into_bookkeeping();
    assert_eq!(book.write_locations.get(&f.named), Some(&Iid::from_raw(1)));
    assert!(book.read_locations[&f.named].contains(&Iid::from_raw(2)));
    assert_eq!(book.live_variables(), vec![f.named]);
    assert_eq!(book.dead_variables(), vec![f.first_call]);
}

#[test]
fn recovery_propagates_through_abstract_variables() {
    let f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default().with_context_insensitive());
    store.mark_root_recovered(f.first_call);
    assert!(store.is_recovered(f.second_call));
    store.read(f.second_call);

    let book = store.bookkeeping();
    assert!(book.recovered_roots.contains(&f.first_call));
    assert!(!book.recovered_roots.contains(&f.second_call));
    assert!(book.recovered_uses.contains(&f.second_call));
}

#[test]
fn reads_of_recursion_degraded_types_are_counted() {
    let mut f = fixture();
    let mut store = store(&f.variables, PrecisionConfig::default());
    store.write(&mut f.lattice, f.named, Some(TupleId::OBJECT_TOP_DUE_TO_RECURSION));
    store.set_location(Iid::from_raw(9));
    store.read(f.named);
    assert_eq!(store.bookkeeping().locations_with_top_due_to_recursion(), 1);
}
