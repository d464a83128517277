//! The type lattice of one analysis run.
//!
//! Tuple, object, property and function joins are mutually recursive: a
//! tuple join merges objects, an object join merges properties (tuples)
//! and function types, and function joins merge argument and result
//! tuples. All of them are methods of one [`TypeLattice`] that owns the
//! type pool and every piece of mutable join state: memo caches, the
//! recursion guards, the recursive-merge manager and the base-widening
//! counter. Strategies are selected by matching on [`LatticeConfig`].

mod cache;
mod config;
mod function;
mod object;
mod recursive;
mod tuple;

use rustc_hash::FxHashMap;
use tt_ir::Name;

pub use config::{ConfigError, FunctionLatticeKind, LatticeConfig, ObjectLatticeKind};

use crate::kinds::RecursiveRef;
use crate::pool::TypePool;
use crate::tuple::TupleData;
use crate::{ObjectId, TupleId};
use cache::LubCache;
use recursive::RecursiveManager;

/// A join semilattice with distinguished extremes.
pub trait CompleteLattice<T> {
    fn top(&self) -> T;
    fn bot(&self) -> T;
    fn lub(&mut self, t1: T, t2: T) -> T;
}

/// Which way the tuple lattice is oriented.
///
/// `Meet` swaps Top and Bottom of every primitive and type-parameter slot.
/// It is the property lattice of `FieldLubUnderSubtyping` without union
/// types: conflicting primitive property kinds meet to Bottom and the
/// property is dropped, while nested objects are still joined.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum Direction {
    Join,
    Meet,
}

impl Direction {
    #[inline]
    const fn index(self) -> usize {
        match self {
            Direction::Join => 0,
            Direction::Meet => 1,
        }
    }
}

pub struct TypeLattice {
    pub(crate) pool: TypePool,
    config: LatticeConfig,
    caches: [LubCache; 2],
    /// Object pairs whose merge is in progress, with the merge id.
    guards: [FxHashMap<(ObjectId, ObjectId), u32>; 2],
    recursive: RecursiveManager,
    /// Distinct-receiver joins so far in pointwise function joins.
    base_widenings: u32,
    /// Name of the type parameter introduced by generic inference.
    type_parameter_name: Name,
}

impl TypeLattice {
    pub fn new(pool: TypePool, config: LatticeConfig) -> Self {
        let type_parameter_name = pool.name("E");
        Self {
            pool,
            config,
            caches: [LubCache::default(), LubCache::default()],
            guards: [FxHashMap::default(), FxHashMap::default()],
            recursive: RecursiveManager::default(),
            base_widenings: 0,
            type_parameter_name,
        }
    }

    #[inline]
    pub fn pool(&self) -> &TypePool {
        &self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut TypePool {
        &mut self.pool
    }

    pub fn into_pool(self) -> TypePool {
        self.pool
    }

    #[inline]
    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    /// Join two tuples.
    pub fn lub(&mut self, t1: TupleId, t2: TupleId) -> TupleId {
        self.lub_in(Direction::Join, t1, t2)
    }

    /// Join any number of tuples, starting from Bottom.
    pub fn lub_all(&mut self, tuples: impl IntoIterator<Item = TupleId>) -> TupleId {
        tuples
            .into_iter()
            .fold(TupleId::BOTTOM, |acc, t| self.lub(acc, t))
    }

    /// Allocate a tuple, registering it if it is a recursive placeholder.
    pub fn make_tuple(&mut self, data: TupleData) -> TupleId {
        let ids = match &data.recursive {
            RecursiveRef::Some(ids) => Some(ids.clone()),
            RecursiveRef::Bottom | RecursiveRef::Top => None,
        };
        let id = self.pool.make_tuple(data);
        if let Some(ids) = ids {
            self.recursive.register(id, &ids);
        }
        id
    }

    /// The tuple of the type parameter generic inference introduces.
    pub fn type_parameter_e(&mut self) -> TupleId {
        let name = self.type_parameter_name;
        self.pool.type_parameter(name)
    }

    /// Number of memoized joins, for run summaries.
    pub fn cached_joins(&self) -> usize {
        self.caches.iter().map(LubCache::len).sum()
    }
}

impl CompleteLattice<TupleId> for TypeLattice {
    fn top(&self) -> TupleId {
        TupleId::TOP
    }

    fn bot(&self) -> TupleId {
        TupleId::BOTTOM
    }

    fn lub(&mut self, t1: TupleId, t2: TupleId) -> TupleId {
        TypeLattice::lub(self, t1, t2)
    }
}

impl std::fmt::Debug for TypeLattice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeLattice")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
