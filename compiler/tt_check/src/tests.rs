use pretty_assertions::assert_eq;
use tt_ir::{Expression, Iid, StringInterner, TraceBuilder, Variable};
use tt_types::{LatticeConfig, TupleId, TypePool};

use super::*;

#[test]
fn empty_enabled_set_reports_every_kind() {
    let config = CheckConfig::default();
    assert!(ConstraintKind::ALL.iter().all(|&kind| config.is_enabled(kind)));

    let config = config.only([ConstraintKind::IsObject]);
    assert!(config.is_enabled(ConstraintKind::IsObject));
    assert!(!config.is_enabled(ConstraintKind::IsNotTop));
}

#[test]
fn defaults_leave_sjs_and_toppy_checks_off() {
    let config = CheckConfig::default();
    assert!(!config.sjs_checks);
    assert!(!config.toppy_checks);
    let config = config.with_sjs_checks().with_toppy_checks();
    assert!(config.sjs_checks && config.toppy_checks);
}

#[test]
fn disabled_kinds_are_not_reported() {
    let mut lattice = TypeLattice::new(
        TypePool::new(StringInterner::shared()),
        LatticeConfig::default(),
    );
    let field = lattice.pool().name("a");
    let mut builder = TraceBuilder::new();
    let base = builder.var(Variable::temporary(Iid::from_raw(1), None));
    let sink = builder.var(Variable::temporary(Iid::from_raw(2), None));
    builder.write(sink, Expression::FieldRead { base, field });
    let trace = builder.finish();
    let env: Environment = [(base, TupleId::TOP)].into_iter().collect();

    let all = check(&mut lattice, &trace, &env, &Environment::new(), &CheckConfig::default());
    let kinds: Vec<_> = all.iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![ConstraintKind::IsNotTop, ConstraintKind::PropertyExists]
    );

    let config = CheckConfig::default().only([ConstraintKind::PropertyExists]);
    let filtered = check(&mut lattice, &trace, &env, &Environment::new(), &config);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].kind, ConstraintKind::PropertyExists);
    assert_eq!(filtered[0].severity, Severity::Error);
}
