//! Constraints and their failure messages.

use tt_ir::{Name, ScopeId};
use tt_types::{
    Classification, FunctionType, ObjectId, RecursiveRef, SingleFunction, TupleData, TupleId,
    TypeLattice, TypePool,
};

use crate::kind::ConstraintKind;

/// A checkable property of the stabilized types.
#[derive(Clone, Debug)]
pub(crate) enum Constraint {
    /// Not Top, ignoring the recursive-reference slot.
    IsNotTop(TupleId),
    IsNotTopFunction(FunctionType),
    /// An object, or null or undefined.
    IsObject(TupleId),
    IsFunction(TupleId),
    /// Checked with the abstracted field name.
    PropertyExists { object: ObjectId, field: Name },
    /// Checked with the concrete field name.
    PropertyIsWritable { object: ObjectId, field: Name },
    IsNotClassifiedAsObject(ObjectId),
    ClassificationAccess {
        object: ObjectId,
        field: Name,
        dynamic: bool,
        is_initializer: bool,
    },
    IsNotAbstractReceiver(ObjectId),
    IsAssignmentCompatible {
        to: TupleId,
        from: TupleId,
        message: String,
    },
    IsSuccessfulCall {
        args: Vec<TupleId>,
        matches: usize,
        is_top: bool,
        callee: FunctionType,
    },
    IsSuccessfulReturn {
        returned: TupleId,
        allowed: Vec<TupleId>,
    },
    PrototypeProperties {
        instance: TupleId,
        prototype: TupleId,
    },
    /// `None` scopes are global code.
    LocalPrototypalAssignment {
        allocation: Option<ScopeId>,
        current: Option<ScopeId>,
    },
    OverridingPrototypalAssignment {
        current: TupleId,
        assigned: TupleId,
    },
    NonToppyCall {
        callee: FunctionType,
        enabled: bool,
    },
    NonToppyReturn {
        allowed: Vec<TupleId>,
        enabled: bool,
    },
    NonToppyPropertyWrite {
        property: TupleId,
        enabled: bool,
    },
    NonToppyPropertyRead {
        property: TupleId,
        enabled: bool,
    },
}

impl Constraint {
    pub(crate) fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::IsNotTop(_) | Constraint::IsNotTopFunction(_) => ConstraintKind::IsNotTop,
            Constraint::IsObject(_) => ConstraintKind::IsObject,
            Constraint::IsFunction(_) => ConstraintKind::IsFunction,
            Constraint::PropertyExists { .. } => ConstraintKind::PropertyExists,
            Constraint::PropertyIsWritable { .. } => ConstraintKind::PropertyIsWritable,
            Constraint::IsNotClassifiedAsObject(_) => ConstraintKind::IsNotClassifiedAsObject,
            Constraint::ClassificationAccess { .. } => ConstraintKind::IsClassificationValidAccess,
            Constraint::IsNotAbstractReceiver(_) => ConstraintKind::IsAbstractObject,
            Constraint::IsAssignmentCompatible { .. } => ConstraintKind::IsAssignmentCompatible,
            Constraint::IsSuccessfulCall { .. } => ConstraintKind::IsSuccessfulCall,
            Constraint::IsSuccessfulReturn { .. } => ConstraintKind::IsSuccessfulReturn,
            Constraint::PrototypeProperties { .. } => ConstraintKind::PrototypePropertyInvariance,
            Constraint::LocalPrototypalAssignment { .. }
            | Constraint::OverridingPrototypalAssignment { .. } => {
                ConstraintKind::PrototypalAssignment
            }
            Constraint::NonToppyCall { .. } => ConstraintKind::IsNotTopFunctionCall,
            Constraint::NonToppyReturn { .. } => ConstraintKind::IsNotTopFunctionReturn,
            Constraint::NonToppyPropertyWrite { .. } => ConstraintKind::IsNotTopPropertyWrite,
            Constraint::NonToppyPropertyRead { .. } => ConstraintKind::IsNotTopPropertyRead,
        }
    }

    /// `Err` carries the failure message.
    pub(crate) fn check(&self, lattice: &mut TypeLattice) -> Result<(), String> {
        let pool = lattice.pool();
        let holds = match self {
            Constraint::IsNotTop(ty) => !is_top_modulo_recursion(pool.tuple(*ty)),
            Constraint::IsNotTopFunction(function) => *function != FunctionType::Top,
            Constraint::IsObject(ty) => {
                let data = pool.tuple(*ty);
                data.is_object() || data.is_null() || data.is_undefined()
            }
            Constraint::IsFunction(ty) => pool.is_function(*ty),
            Constraint::PropertyExists { object, field } => {
                pool.is_abstract_field_name(*field)
                    || pool.object(*object).properties.contains_key(field)
            }
            Constraint::PropertyIsWritable { object, field } => {
                !pool.object(*object).read_only.contains(field)
            }
            Constraint::IsNotClassifiedAsObject(object) => !pool
                .object(*object)
                .classification
                .contains(Classification::OBJECT),
            Constraint::ClassificationAccess {
                object,
                field,
                dynamic,
                is_initializer,
            } => {
                let classification = pool.object(*object).classification;
                let array_field = pool.is_abstract_field_name(*field);
                return match access_violation(classification, *dynamic, *is_initializer, array_field)
                {
                    Some(message) => Err(message.to_owned()),
                    None => Ok(()),
                };
            }
            Constraint::IsNotAbstractReceiver(object) => !pool.object(*object).is_abstract,
            Constraint::IsAssignmentCompatible { to, from, .. } => {
                lattice.is_assignment_compatible(*to, *from)
            }
            Constraint::IsSuccessfulCall { matches, is_top, .. } => *is_top || *matches > 0,
            Constraint::IsSuccessfulReturn { returned, allowed } => allowed
                .iter()
                .any(|&to| lattice.is_assignment_compatible(to, *returned)),
            Constraint::PrototypeProperties {
                instance,
                prototype,
            } => prototype_properties_invariant(pool, *instance, *prototype),
            Constraint::LocalPrototypalAssignment {
                allocation,
                current,
            } => allocation == current,
            Constraint::OverridingPrototypalAssignment { current, assigned } => {
                pool.tuples_equal(*current, TupleId::OBJECT_TOP)
                    || pool.tuples_equal(*current, *assigned)
            }
            Constraint::NonToppyCall { callee, enabled } => !enabled || !is_toppy(pool, callee),
            Constraint::NonToppyReturn { allowed, enabled } => {
                !enabled || !allowed.iter().any(|&ty| pool.tuples_equal(ty, TupleId::TOP))
            }
            Constraint::NonToppyPropertyWrite { property, enabled }
            | Constraint::NonToppyPropertyRead { property, enabled } => {
                !enabled || !pool.tuples_equal(*property, TupleId::TOP)
            }
        };
        if holds {
            Ok(())
        } else {
            Err(self.failure_message(lattice))
        }
    }

    fn failure_message(&self, lattice: &mut TypeLattice) -> String {
        let pool = lattice.pool();
        match self {
            Constraint::IsNotTop(_) => "Should not be Top".to_owned(),
            Constraint::IsNotTopFunction(_) => "Should not be the Top function".to_owned(),
            Constraint::IsObject(_) => "Is not an object type".to_owned(),
            Constraint::IsFunction(_) => "Is not a function type".to_owned(),
            Constraint::PropertyExists { object, field } => {
                let field = pool.interner().lookup(*field);
                let object = lattice.pool_mut().object_tuple(*object);
                format!(
                    ".{field} does not exist on object {}",
                    lattice.pool().format_tuple(object)
                )
            }
            Constraint::PropertyIsWritable { field, .. } => {
                format!(".{} is read-only", pool.interner().lookup(*field))
            }
            Constraint::IsNotClassifiedAsObject(_) => "Is classified as an SJS-Object!".to_owned(),
            // Reported directly by `check`.
            Constraint::ClassificationAccess { .. } => String::new(),
            Constraint::IsNotAbstractReceiver(_) => "Abstract receiver!".to_owned(),
            Constraint::IsAssignmentCompatible { message, .. } => message.clone(),
            Constraint::IsSuccessfulCall { args, callee, .. } => {
                let args: Vec<String> = args.iter().map(|&arg| pool.format_tuple(arg)).collect();
                format!(
                    "Function call does not match any signatures: ({}) against {}",
                    args.join(", "),
                    pool.format_function(callee)
                )
            }
            Constraint::IsSuccessfulReturn { .. } => {
                "Function call return does not match any signatures".to_owned()
            }
            Constraint::PrototypeProperties { .. } => {
                "Instance property types are not invariant wrt. the prototype properties"
                    .to_owned()
            }
            Constraint::LocalPrototypalAssignment { .. } => {
                "Invalid .prototype assignment: rhs is not prototypal (local)".to_owned()
            }
            Constraint::OverridingPrototypalAssignment { .. } => {
                "Invalid .prototype assignment: rhs is not prototypal (overriding)".to_owned()
            }
            Constraint::NonToppyCall { .. } => "Calling Toppy-function".to_owned(),
            Constraint::NonToppyReturn { .. } => "Returning in toppy-function".to_owned(),
            Constraint::NonToppyPropertyWrite { .. } => "Writing to Top-property".to_owned(),
            Constraint::NonToppyPropertyRead { .. } => "Reading Top-property".to_owned(),
        }
    }
}

fn is_top_modulo_recursion(data: &TupleData) -> bool {
    let mut data = data.clone();
    data.recursive = RecursiveRef::Top;
    data == TupleData::TOP
}

/// The first classification whose access rules `field` breaks.
fn access_violation(
    classification: Classification,
    dynamic: bool,
    is_initializer: bool,
    array_field: bool,
) -> Option<&'static str> {
    if classification.contains(Classification::ARGUMENTS) && !is_initializer {
        return Some("arguments array usage not allowed");
    }
    if classification.contains(Classification::OBJECT) && dynamic {
        return Some("Dynamic access to fields not allowed for SJS-structural-objects");
    }
    if classification.contains(Classification::MAP) && !dynamic {
        return Some("Static access to fields not allowed for SJS-maps");
    }
    if classification.contains(Classification::ARRAY) && dynamic && !array_field {
        return Some("Dynamic access to non-integral fields not allowed for SJS-arrays");
    }
    None
}

/// A callee whose receiver or some argument is Top.
fn is_toppy(pool: &TypePool, callee: &FunctionType) -> bool {
    match callee {
        FunctionType::Top => true,
        FunctionType::Single(SingleFunction { base, args, .. }) => std::iter::once(base)
            .chain(args.iter())
            .any(|&ty| pool.tuples_equal(ty, TupleId::TOP)),
        FunctionType::Bottom | FunctionType::Intersection(_) => false,
    }
}

/// Instance properties shadowing prototype properties keep their types.
///
/// Undefined on either side is ignored, as is null against an object.
/// Function receivers are not compared.
fn prototype_properties_invariant(pool: &TypePool, instance: TupleId, prototype: TupleId) -> bool {
    let prototype = pool.tuple(prototype);
    if !prototype.is_object() {
        return true;
    }
    let instance = pool.object(pool.tuple(instance).object);
    let prototype = pool.object(prototype.object);
    let dot_prototype = pool.name("prototype");
    instance.properties.iter().all(|(&name, &own)| {
        if name == dot_prototype || pool.is_abstract_field_name(name) {
            return true;
        }
        let Some(inherited) = prototype.property(name) else {
            return true;
        };
        let null_against_object =
            |a: TupleId, b: TupleId| pool.tuples_equal(a, TupleId::NULL) && pool.tuple(b).is_object();
        pool.tuples_equal(inherited, TupleId::UNDEFINED)
            || pool.tuples_equal(own, TupleId::UNDEFINED)
            || null_against_object(inherited, own)
            || null_against_object(own, inherited)
            || pool.tuples_equal_ignoring_receivers(inherited, own)
    })
}
