use pretty_assertions::assert_eq;

use super::*;
use crate::StringInterner;

#[test]
fn structurally_equal_variables_share_a_handle() {
    let interner = StringInterner::new();
    let mut table = VariableTable::new();
    let x = interner.intern("x");

    let a = table.intern(Variable::named(x, Some(Iid::from_raw(3))));
    let b = table.intern(Variable::named(x, Some(Iid::from_raw(3))));
    let c = table.intern(Variable::named(x, None));

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(table.len(), 2);
}

#[test]
fn call_count_distinguishes_temporaries() {
    let mut table = VariableTable::new();
    let f = Some(Iid::from_raw(1));
    let first = table.intern(Variable::temporary(Iid::from_raw(9), f).in_call(0));
    let second = table.intern(Variable::temporary(Iid::from_raw(9), f).in_call(1));

    assert_ne!(first, second);
    assert_eq!(
        table.get(second).scope(),
        Some(ScopeId::new(Iid::from_raw(1), 1))
    );
}

#[test]
fn abstract_context_has_no_concrete_scope() {
    let mut var = Variable::temporary(Iid::from_raw(2), Some(Iid::from_raw(1)));
    var.context = Some(CallContext::Abstract(4));
    assert_eq!(var.scope(), None);
}

#[test]
fn lookup_finds_only_interned_variables() {
    let mut table = VariableTable::new();
    let tmp = Variable::temporary(Iid::from_raw(5), None);
    assert_eq!(table.lookup(&tmp), None);
    let id = table.intern(tmp.clone());
    assert_eq!(table.lookup(&tmp), Some(id));
    assert_eq!(table.ids().collect::<Vec<_>>(), vec![id]);
}
