//! Lattice configuration.

use thiserror::Error;

/// How properties of merged objects are joined.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ObjectLatticeKind {
    /// A property survives a merge only if both sides agree exactly.
    FieldEquality,
    /// Properties are joined; without union types, conflicting primitive
    /// kinds drop the property instead of widening it to Top.
    FieldLubUnderSubtyping,
}

/// How function types of merged objects are joined.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FunctionLatticeKind {
    /// Keep every signature; merge results of equal inputs.
    Intersection,
    /// Collapse to one signature joined position by position.
    PointwiseLub,
    /// Generalize to a type-parameterized signature, else pointwise.
    GenericOrLub,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LatticeConfig {
    pub object: ObjectLatticeKind,
    pub function: FunctionLatticeKind,
    /// Allow tuples that mix several real kinds. When off, such joins
    /// collapse to Top.
    pub union_types: bool,
    /// Joins with undefined or null keep the other operand, and abstract
    /// objects never merge with concrete ones.
    pub sjs_ascription: bool,
}

impl LatticeConfig {
    pub const fn full_intersection(function: FunctionLatticeKind) -> Self {
        Self {
            object: ObjectLatticeKind::FieldEquality,
            function,
            union_types: false,
            sjs_ascription: false,
        }
    }

    pub const fn simple_subtyping(function: FunctionLatticeKind) -> Self {
        Self {
            object: ObjectLatticeKind::FieldLubUnderSubtyping,
            function,
            union_types: false,
            sjs_ascription: false,
        }
    }

    pub const fn simple_subtyping_with_union(function: FunctionLatticeKind) -> Self {
        Self {
            union_types: true,
            ..Self::simple_subtyping(function)
        }
    }

    pub const fn sjs(function: FunctionLatticeKind) -> Self {
        Self {
            sjs_ascription: true,
            ..Self::simple_subtyping(function)
        }
    }

    /// Parse a configuration from lattice names.
    ///
    /// Exactly one object kind and one function kind are required;
    /// `UnionTypes` may appear any number of times.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        let mut object = None;
        let mut function = None;
        let mut union_types = false;
        for name in names {
            match name {
                "ObjectFieldEquality" => set_once(&mut object, ObjectLatticeKind::FieldEquality, name)?,
                "ObjectFieldLubUnderSubtyping" => {
                    set_once(&mut object, ObjectLatticeKind::FieldLubUnderSubtyping, name)?;
                }
                "FunctionIntersection" => {
                    set_once(&mut function, FunctionLatticeKind::Intersection, name)?;
                }
                "FunctionPointwiseLub" => {
                    set_once(&mut function, FunctionLatticeKind::PointwiseLub, name)?;
                }
                "FunctionGenericTypeParameterOrLub" => {
                    set_once(&mut function, FunctionLatticeKind::GenericOrLub, name)?;
                }
                "UnionTypes" => union_types = true,
                other => return Err(ConfigError::UnknownLattice(other.to_owned())),
            }
        }
        Ok(Self {
            object: object.ok_or(ConfigError::MissingObjectKind)?,
            function: function.ok_or(ConfigError::MissingFunctionKind)?,
            union_types,
            sjs_ascription: false,
        })
    }

    /// Joins touching more than one real kind collapse to Top.
    #[inline]
    pub const fn multi_kinds_yield_top(&self) -> bool {
        !self.union_types
    }
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self::simple_subtyping(FunctionLatticeKind::Intersection)
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, name: &str) -> Result<(), ConfigError> {
    if slot.is_some() {
        return Err(ConfigError::Duplicate(name.to_owned()));
    }
    *slot = Some(value);
    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("lattice category already specified when reading `{0}`")]
    Duplicate(String),
    #[error("no such lattice configuration: `{0}`")]
    UnknownLattice(String),
    #[error("object lattice kind not specified")]
    MissingObjectKind,
    #[error("function lattice kind not specified")]
    MissingFunctionKind,
}
