use pretty_assertions::assert_eq;
use tt_ir::StringInterner;

use super::*;
use crate::kinds::{CallKinds, Classification};
use crate::lattice::LatticeConfig;
use crate::object::ObjectData;
use crate::pool::TypePool;

fn lattice() -> TypeLattice {
    TypeLattice::new(
        TypePool::new(StringInterner::shared()),
        LatticeConfig::default(),
    )
}

fn point(lattice: &mut TypeLattice, properties: &[(&str, TupleId)]) -> TupleId {
    let pool = lattice.pool_mut();
    let mut data = ObjectData::new(Classification::OBJECT);
    for &(name, ty) in properties {
        data = data.with_property(pool.name(name), ty);
    }
    let id = pool.make_object(data);
    pool.object_tuple(id)
}

fn sig(base: TupleId, args: &[TupleId], result: TupleId) -> SingleFunction {
    SingleFunction::new(base, args, result, CallKinds::FUNCTION)
}

// ── Assignment compatibility ────────────────────────────────────────

#[test]
fn primitives_are_compatible_with_themselves_and_undefined() {
    let mut lattice = lattice();
    assert!(lattice.is_assignment_compatible(TupleId::NUMBER, TupleId::NUMBER));
    assert!(lattice.is_assignment_compatible(TupleId::NUMBER, TupleId::UNDEFINED));
    assert!(!lattice.is_assignment_compatible(TupleId::NUMBER, TupleId::STRING));
    assert!(!lattice.is_assignment_compatible(TupleId::BOTTOM, TupleId::NUMBER));
}

#[test]
fn type_parameters_accept_anything() {
    let mut lattice = lattice();
    let e = lattice.type_parameter_e();
    assert!(lattice.is_assignment_compatible(e, TupleId::STRING));
    assert!(lattice.is_assignment_compatible(e, TupleId::TOP));
}

#[test]
fn null_and_objects_are_interchangeable() {
    let mut lattice = lattice();
    let p = point(&mut lattice, &[("x", TupleId::NUMBER)]);
    assert!(lattice.is_assignment_compatible(p, TupleId::NULL));
    assert!(lattice.is_assignment_compatible(TupleId::NULL, p));
    assert!(!lattice.is_assignment_compatible(TupleId::NUMBER, TupleId::NULL));
}

#[test]
fn objects_are_compatible_under_width_subtyping() {
    let mut lattice = lattice();
    let narrow = point(&mut lattice, &[("x", TupleId::NUMBER)]);
    let wide = point(&mut lattice, &[("x", TupleId::NUMBER), ("y", TupleId::STRING)]);
    assert!(lattice.is_assignment_compatible(narrow, wide));
    assert!(!lattice.is_assignment_compatible(wide, narrow));
}

// ── Matching ────────────────────────────────────────────────────────

#[test]
fn top_callee_matches_anything() {
    let mut lattice = lattice();
    let call = lattice.match_call(&FunctionType::Top, TupleId::NUMBER, &[TupleId::STRING], false);
    assert_eq!(
        call,
        CallMatch {
            matches: vec![],
            is_top: true
        }
    );
    assert!(call.is_successful());
    assert_eq!(lattice.return_type(&call), Some(TupleId::TOP));
}

#[test]
fn bottom_callee_matches_nothing() {
    let mut lattice = lattice();
    let call = lattice.match_call(&FunctionType::Bottom, TupleId::BOTTOM, &[], false);
    assert!(!call.is_successful());
    assert_eq!(lattice.return_type(&call), None);
}

#[test]
fn receiver_checked_only_for_non_constructor_calls() {
    let mut lattice = lattice();
    let receiver = point(&mut lattice, &[("x", TupleId::NUMBER)]);
    let callee = FunctionType::Single(sig(receiver, &[], TupleId::STRING));

    let call = lattice.match_call(&callee, TupleId::NUMBER, &[], false);
    assert!(call.matches.is_empty());
    assert!(!call.is_successful());

    let construct = lattice.match_call(&callee, TupleId::NUMBER, &[], true);
    assert_eq!(construct.matches.len(), 1);
    assert_eq!(lattice.return_type(&construct), Some(TupleId::STRING));
}

#[test]
fn arity_must_match_exactly() {
    let mut lattice = lattice();
    let callee = FunctionType::Single(sig(TupleId::BOTTOM, &[TupleId::NUMBER], TupleId::STRING));
    let short = lattice.match_call(&callee, TupleId::BOTTOM, &[], false);
    assert!(short.matches.is_empty());
    let long = lattice.match_call(
        &callee,
        TupleId::BOTTOM,
        &[TupleId::NUMBER, TupleId::NUMBER],
        false,
    );
    assert!(long.matches.is_empty());
}

#[test]
fn intersections_select_compatible_members() {
    let mut lattice = lattice();
    let callee = FunctionType::Intersection(vec![
        sig(TupleId::BOTTOM, &[TupleId::NUMBER], TupleId::STRING),
        sig(TupleId::BOTTOM, &[TupleId::STRING], TupleId::NUMBER),
        sig(TupleId::BOTTOM, &[TupleId::NUMBER], TupleId::UNDEFINED),
    ]);
    let call = lattice.match_call(&callee, TupleId::BOTTOM, &[TupleId::NUMBER], false);
    assert_eq!(call.matches.len(), 2);
    let result = lattice.return_type(&call).unwrap_or(TupleId::BOTTOM);
    assert_eq!(lattice.pool().format_tuple(result), "(String,Undefined)");
}

// ── Inputs ──────────────────────────────────────────────────────────

#[test]
fn inputs_join_arguments_with_inferred_types() {
    let mut lattice = lattice();
    let single = sig(TupleId::BOTTOM, &[TupleId::NUMBER], TupleId::STRING);
    let function = {
        let pool = lattice.pool_mut();
        let id = pool.make_object(
            ObjectData::new(Classification::FUNCTION)
                .with_function(FunctionType::Single(single.clone())),
        );
        pool.object_tuple(id)
    };
    let (f, base, arg) = (VarId::from_raw(0), VarId::from_raw(1), VarId::from_raw(2));
    let mut env: Environment = [(f, function), (base, TupleId::NULL), (arg, TupleId::NUMBER)]
        .into_iter()
        .collect();
    let inferred: Environment = [(arg, TupleId::UNDEFINED)].into_iter().collect();

    let inputs = lattice.call_inputs(&mut env, &inferred, f, base, &[arg]);
    assert_eq!(inputs.callee, FunctionType::Single(single));
    assert_eq!(inputs.base, TupleId::NULL);
    assert_eq!(
        lattice.pool().format_tuple(inputs.args[0]),
        "(Number,Undefined)"
    );
}

#[test]
fn inputs_of_non_functions_have_a_bottom_callee() {
    let mut lattice = lattice();
    let (f, base) = (VarId::from_raw(0), VarId::from_raw(1));
    let mut env: Environment = [(f, TupleId::NUMBER)].into_iter().collect();
    let inputs = lattice.call_inputs(&mut env, &Environment::new(), f, base, &[]);
    assert_eq!(inputs.callee, FunctionType::Bottom);
    assert_eq!(inputs.base, TupleId::BOTTOM);
}
