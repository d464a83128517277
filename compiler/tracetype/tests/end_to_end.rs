//! Whole-pipeline tests: ascription, replay and checking over small
//! hand-built traces.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use tracetype::{
    init_tracing, Analysis, AnalysisConfig, CheckConfig, ConstraintKind, FunctionLatticeKind,
    Iid, LatticeConfig, Observations, Severity, StringInterner, TraceBuilder, TupleId, VarId,
    Variable,
};
use tt_ir::{Expression, HeapObject, ObjectKind, PrimitiveKind, Value};

fn temp(builder: &mut TraceBuilder, raw: u32) -> VarId {
    builder.var(Variable::temporary(Iid::from_raw(raw), None))
}

// -- Configuration --

#[test]
fn lattice_names_select_the_configuration() {
    let config =
        AnalysisConfig::from_lattice_names(["ObjectFieldLubUnderSubtyping", "FunctionIntersection"])
            .unwrap();
    assert_eq!(config, AnalysisConfig::default());

    let config = AnalysisConfig::from_lattice_names([
        "ObjectFieldEquality",
        "FunctionPointwiseLub",
        "UnionTypes",
    ])
    .unwrap();
    assert_eq!(
        config.lattice,
        LatticeConfig {
            union_types: true,
            ..LatticeConfig::full_intersection(FunctionLatticeKind::PointwiseLub)
        }
    );

    assert!(AnalysisConfig::from_lattice_names(["FunctionIntersection"]).is_err());
}

#[test]
fn tracing_can_be_initialized_repeatedly() {
    init_tracing();
    init_tracing();
}

// -- Runs --

#[test]
fn observed_objects_flow_into_named_variables() {
    let interner = StringInterner::shared();
    let mut analysis = Analysis::new(interner, AnalysisConfig::default());
    let a = analysis.pool().name("a");
    let o_name = analysis.pool().name("o");

    let mut builder = TraceBuilder::new();
    let proto = temp(&mut builder, 99);
    let allocated = temp(&mut builder, 100);
    let o = builder.var(Variable::named(o_name, None));
    let read = temp(&mut builder, 101);
    builder.write(allocated, Expression::New { proto });
    builder.write(o, Expression::Read { source: allocated });
    builder.write(read, Expression::FieldRead { base: o, field: a });
    let trace = builder.finish();

    let mut observations = Observations::new();
    let object = observations
        .heap
        .alloc(HeapObject::new(ObjectKind::Plain).with_property(a, Value::Number));
    observations.observe(allocated, Value::Object(object));
    observations.observe(read, Value::Number);

    let report = analysis.run(&trace, &observations);
    assert_eq!(report.rounds, 1);
    assert_eq!(
        analysis.pool().format_tuple(report.environment.get(o)),
        "{a: Number}"
    );
    assert_eq!(report.environment.get(read), TupleId::NUMBER);
    assert!(report.messages.is_empty(), "{:?}", report.messages);
}

#[test]
fn reading_a_field_of_a_number_is_reported() {
    let interner = StringInterner::shared();
    let mut analysis = Analysis::new(interner, AnalysisConfig::default());
    let a = analysis.pool().name("a");
    let x_name = analysis.pool().name("x");

    let mut builder = TraceBuilder::new();
    let number = temp(&mut builder, 100);
    let x = builder.var(Variable::named(x_name, None));
    let read = temp(&mut builder, 101);
    builder.write(number, Expression::Primitive(PrimitiveKind::Number));
    builder.write(x, Expression::Read { source: number });
    let iid = builder.write(read, Expression::FieldRead { base: x, field: a });
    let trace = builder.finish();

    let mut observations = Observations::new();
    observations.observe(number, Value::Number);
    observations.observe(read, Value::Undefined);

    let report = analysis.run(&trace, &observations);
    assert_eq!(report.environment.get(x), TupleId::NUMBER);
    assert_eq!(report.environment.get(read), TupleId::UNDEFINED);

    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].iid, iid);
    assert_eq!(errors[0].kind, ConstraintKind::IsObject);
    assert_eq!(errors[0].severity, Severity::Error);
    assert_eq!(errors[0].message, "Is not an object type");
    assert_eq!(report.warnings().count(), 0);
}

#[test]
fn disabled_constraint_kinds_are_silent() {
    let interner = StringInterner::shared();
    let config = AnalysisConfig {
        check: CheckConfig::default().only([ConstraintKind::PropertyExists]),
        ..AnalysisConfig::default()
    };
    let mut analysis = Analysis::new(interner, config);
    let a = analysis.pool().name("a");

    let mut builder = TraceBuilder::new();
    let number = temp(&mut builder, 100);
    let read = temp(&mut builder, 101);
    builder.write(number, Expression::Primitive(PrimitiveKind::Number));
    builder.write(read, Expression::FieldRead { base: number, field: a });
    let trace = builder.finish();

    let mut observations = Observations::new();
    observations.observe(number, Value::Number);

    let report = analysis.run(&trace, &observations);
    assert!(report.messages.is_empty(), "{:?}", report.messages);
}
