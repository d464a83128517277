//! Constraint kinds and message severities.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The property a constraint checks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ConstraintKind {
    IsNotTop,
    IsObject,
    IsFunction,
    PropertyExists,
    IsAssignmentCompatible,
    IsSuccessfulCall,
    IsSuccessfulReturn,
    IsNotClassifiedAsObject,
    PropertyIsWritable,
    IsClassificationValidAccess,
    PrototypePropertyInvariance,
    PrototypalAssignment,
    IsAbstractObject,
    IsNotTopFunctionCall,
    IsNotTopFunctionReturn,
    IsNotTopPropertyWrite,
    IsNotTopPropertyRead,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 17] = [
        ConstraintKind::IsNotTop,
        ConstraintKind::IsObject,
        ConstraintKind::IsFunction,
        ConstraintKind::PropertyExists,
        ConstraintKind::IsAssignmentCompatible,
        ConstraintKind::IsSuccessfulCall,
        ConstraintKind::IsSuccessfulReturn,
        ConstraintKind::IsNotClassifiedAsObject,
        ConstraintKind::PropertyIsWritable,
        ConstraintKind::IsClassificationValidAccess,
        ConstraintKind::PrototypePropertyInvariance,
        ConstraintKind::PrototypalAssignment,
        ConstraintKind::IsAbstractObject,
        ConstraintKind::IsNotTopFunctionCall,
        ConstraintKind::IsNotTopFunctionReturn,
        ConstraintKind::IsNotTopPropertyWrite,
        ConstraintKind::IsNotTopPropertyRead,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ConstraintKind::IsNotTop => "IsNotTop",
            ConstraintKind::IsObject => "IsObject",
            ConstraintKind::IsFunction => "IsFunction",
            ConstraintKind::PropertyExists => "PropertyExists",
            ConstraintKind::IsAssignmentCompatible => "IsAssignmentCompatible",
            ConstraintKind::IsSuccessfulCall => "IsSuccessfulCall",
            ConstraintKind::IsSuccessfulReturn => "IsSuccessfulReturn",
            ConstraintKind::IsNotClassifiedAsObject => "IsNotClassifiedAsObject",
            ConstraintKind::PropertyIsWritable => "PropertyIsWritable",
            ConstraintKind::IsClassificationValidAccess => "IsClassificationValidAccess",
            ConstraintKind::PrototypePropertyInvariance => "PrototypePropertyInvariance",
            ConstraintKind::PrototypalAssignment => "PrototypalAssignment",
            ConstraintKind::IsAbstractObject => "IsAbstractObject",
            ConstraintKind::IsNotTopFunctionCall => "IsNotTopFunctionCall",
            ConstraintKind::IsNotTopFunctionReturn => "IsNotTopFunctionReturn",
            ConstraintKind::IsNotTopPropertyWrite => "IsNotTopPropertyWrite",
            ConstraintKind::IsNotTopPropertyRead => "IsNotTopPropertyRead",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("no such constraint kind: `{0}`")]
pub struct UnknownConstraintKind(pub String);

impl FromStr for ConstraintKind {
    type Err = UnknownConstraintKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConstraintKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownConstraintKind(s.to_owned()))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}
