//! Tuple types and their lattices.
//!
//! A *tuple type* describes every runtime shape a storage location was
//! seen holding: one slot per kind (object, null, string, number, boolean,
//! undefined, plus bookkeeping slots for recursive merges and type
//! parameters). Tuples and objects live in a per-run [`TypePool`] and are
//! addressed by [`TupleId`] / [`ObjectId`] handles.
//!
//! The [`TypeLattice`] owns the pool for one analysis run and implements:
//!
//! - the tuple, object, property and function joins, selected by
//!   [`LatticeConfig`]
//! - merging of cyclic object graphs through recursive-reference
//!   placeholders that are backpatched once a merge completes
//! - generalization of call signatures over a type parameter
//! - assignment compatibility and call matching ([`CallMatch`])
//! - ascription of observed runtime values ([`Ascriber`])

mod ascribe;
mod callee;
mod compat;
mod env;
mod equality;
mod field;
mod format;
mod generic;
mod idx;
mod kinds;
mod lattice;
mod object;
mod pool;
mod tuple;

pub use ascribe::Ascriber;
pub use callee::{CallInputs, CallMatch};
pub use env::{Environment, TypeEnv};
pub use field::{is_abstract_field, is_integral_name, ARRAY_FIELD, MAP_FIELD};
pub use format::{TypeFormatter, BOTTOM_SYMBOL, TOP_SYMBOL};
pub use idx::{ObjectId, TupleId};
pub use kinds::{CallKinds, Classification, Flat, RecursionIds, RecursiveRef, TypeKind, TypeParam};
pub use lattice::{
    CompleteLattice, ConfigError, FunctionLatticeKind, LatticeConfig, ObjectLatticeKind,
    TypeLattice,
};
pub use object::{ArgTypes, FunctionType, ObjectData, SingleFunction};
pub use pool::TypePool;
pub use tuple::TupleData;

// Handles are hashed and copied everywhere; keep them one word.
mod size_asserts {
    use super::{ObjectId, TupleId};
    const _: () = assert!(std::mem::size_of::<TupleId>() == 4);
    const _: () = assert!(std::mem::size_of::<ObjectId>() == 4);
}
