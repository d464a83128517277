//! Field-name abstraction.
//!
//! Arrays and maps are typed by one summary property each instead of one
//! property per concrete key: integral names on arrays become `[*]`, every
//! name on a map becomes `{*}`.

use tt_ir::Name;

use crate::kinds::Classification;
use crate::object::ObjectData;
use crate::pool::TypePool;

/// Summary property of array elements.
pub const ARRAY_FIELD: &str = "[*]";
/// Summary property of map values.
pub const MAP_FIELD: &str = "{*}";

pub fn is_integral_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_abstract_field(name: &str) -> bool {
    name == ARRAY_FIELD || name == MAP_FIELD
}

impl TypePool {
    /// The property name a field access on `object` resolves to.
    pub fn abstract_field_name(&self, object: &ObjectData, field: Name) -> Name {
        let classification = object.classification;
        if classification.contains(Classification::ARRAY)
            && is_integral_name(self.interner().lookup(field))
        {
            return self.name(ARRAY_FIELD);
        }
        if classification.contains(Classification::MAP)
            && !classification.contains(Classification::OBJECT)
        {
            return self.name(MAP_FIELD);
        }
        field
    }

    pub fn is_abstract_field_name(&self, field: Name) -> bool {
        is_abstract_field(self.interner().lookup(field))
    }
}
