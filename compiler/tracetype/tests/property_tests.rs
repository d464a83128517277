//! Property-based tests for the tuple lattices.
//!
//! Random tuple types are built from small shape trees and joined under
//! every lattice configuration, checking:
//! 1. Bottom is the identity and Top absorbs, on handles
//! 2. Idempotence: `lub(x, x)` returns `x` itself
//! 3. Commutativity, up to structural equality, outside SJS ascription
//!
//! SJS ascription is not commutative: a join with undefined or null keeps
//! the other operand, so `lub(Undefined, Null)` is `Null` while
//! `lub(Null, Undefined)` is `Undefined`.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use tracetype::{FunctionLatticeKind, LatticeConfig, StringInterner, TupleId, TypeLattice, TypePool};
use tt_types::{CallKinds, Classification, FunctionType, ObjectData, SingleFunction};

// -- Shape Generation Strategies --

/// A recipe for a tuple type.
#[derive(Clone, Debug)]
enum Shape {
    Leaf(TupleId),
    Object(Vec<(u8, Shape)>),
    Function(Box<Shape>, Box<Shape>),
    Join(Box<Shape>, Box<Shape>),
}

fn leaf_strategy() -> impl Strategy<Value = Shape> {
    prop::sample::select(vec![
        TupleId::BOTTOM,
        TupleId::TOP,
        TupleId::NUMBER,
        TupleId::STRING,
        TupleId::BOOLEAN,
        TupleId::UNDEFINED,
        TupleId::NULL,
        TupleId::OBJECT_TOP,
    ])
    .prop_map(Shape::Leaf)
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec((0u8..4, inner.clone()), 0..4).prop_map(Shape::Object),
            (inner.clone(), inner.clone())
                .prop_map(|(arg, result)| Shape::Function(Box::new(arg), Box::new(result))),
            (inner.clone(), inner).prop_map(|(a, b)| Shape::Join(Box::new(a), Box::new(b))),
        ]
    })
}

fn function_strategy() -> impl Strategy<Value = FunctionLatticeKind> {
    prop::sample::select(vec![
        FunctionLatticeKind::Intersection,
        FunctionLatticeKind::PointwiseLub,
        FunctionLatticeKind::GenericOrLub,
    ])
}

fn config_strategy() -> impl Strategy<Value = LatticeConfig> {
    presets(0..4)
}

/// Configurations whose joins commute: every preset but SJS.
fn commutative_config_strategy() -> impl Strategy<Value = LatticeConfig> {
    presets(0..3)
}

fn presets(range: std::ops::Range<u8>) -> impl Strategy<Value = LatticeConfig> {
    (function_strategy(), range).prop_map(|(function, preset)| match preset {
        0 => LatticeConfig::full_intersection(function),
        1 => LatticeConfig::simple_subtyping(function),
        2 => LatticeConfig::simple_subtyping_with_union(function),
        _ => LatticeConfig::sjs(function),
    })
}

fn build(lattice: &mut TypeLattice, shape: &Shape) -> TupleId {
    match shape {
        Shape::Leaf(ty) => *ty,
        Shape::Object(properties) => {
            let mut data = ObjectData::new(Classification::OBJECT);
            for (index, property) in properties {
                let ty = build(lattice, property);
                let name = lattice.pool().name(&format!("p{index}"));
                data = data.with_property(name, ty);
            }
            let pool = lattice.pool_mut();
            let id = pool.make_object(data);
            pool.object_tuple(id)
        }
        Shape::Function(arg, result) => {
            let arg = build(lattice, arg);
            let result = build(lattice, result);
            let signature =
                SingleFunction::new(TupleId::UNDEFINED, &[arg], result, CallKinds::FUNCTION);
            let data = ObjectData::new(Classification::FUNCTION)
                .with_function(FunctionType::Single(signature));
            let pool = lattice.pool_mut();
            let id = pool.make_object(data);
            pool.object_tuple(id)
        }
        Shape::Join(a, b) => {
            let a = build(lattice, a);
            let b = build(lattice, b);
            lattice.lub(a, b)
        }
    }
}

fn lattice(config: LatticeConfig) -> TypeLattice {
    TypeLattice::new(TypePool::new(StringInterner::shared()), config)
}

// -- Properties --

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_bottom_is_the_identity(config in config_strategy(), shape in shape_strategy()) {
        let mut lattice = lattice(config);
        let x = build(&mut lattice, &shape);
        prop_assert_eq!(lattice.lub(TupleId::BOTTOM, x), x);
        prop_assert_eq!(lattice.lub(x, TupleId::BOTTOM), x);
    }

    #[test]
    fn prop_top_absorbs(config in config_strategy(), shape in shape_strategy()) {
        let mut lattice = lattice(config);
        let x = build(&mut lattice, &shape);
        prop_assert_eq!(lattice.lub(TupleId::TOP, x), TupleId::TOP);
        prop_assert_eq!(lattice.lub(x, TupleId::TOP), TupleId::TOP);
    }

    #[test]
    fn prop_joins_are_idempotent_on_handles(
        config in config_strategy(),
        shape in shape_strategy(),
    ) {
        let mut lattice = lattice(config);
        let x = build(&mut lattice, &shape);
        prop_assert_eq!(lattice.lub(x, x), x);
    }

    #[test]
    fn prop_joins_commute(
        config in commutative_config_strategy(),
        a in shape_strategy(),
        b in shape_strategy(),
    ) {
        let mut lattice = lattice(config);
        let a = build(&mut lattice, &a);
        let b = build(&mut lattice, &b);
        let ab = lattice.lub(a, b);
        let ba = lattice.lub(b, a);
        prop_assert!(
            lattice.pool().tuples_equal(ab, ba),
            "{} vs {}",
            lattice.pool().format_tuple(ab),
            lattice.pool().format_tuple(ba)
        );
    }

    #[test]
    fn prop_sjs_joins_keep_the_defined_operand(
        function in function_strategy(),
        shape in shape_strategy(),
    ) {
        let mut lattice = lattice(LatticeConfig::sjs(function));
        let x = build(&mut lattice, &shape);
        prop_assume!(![TupleId::BOTTOM, TupleId::TOP, TupleId::UNDEFINED, TupleId::NULL]
            .contains(&x));
        prop_assert_eq!(lattice.lub(TupleId::UNDEFINED, x), x);
        prop_assert_eq!(lattice.lub(x, TupleId::NULL), x);
    }
}
