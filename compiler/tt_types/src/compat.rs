//! Assignment compatibility.

use crate::lattice::TypeLattice;
use crate::TupleId;

impl TypeLattice {
    /// Whether a value of type `rhs` may flow into a location of type `lhs`.
    ///
    /// `lhs` is first widened locally: undefined is always accepted, null
    /// is accepted by objects, and objects are accepted by a bare null.
    /// Then `rhs` is compatible iff joining it into `lhs` changes nothing.
    pub fn is_assignment_compatible(&mut self, lhs: TupleId, rhs: TupleId) -> bool {
        if self.pool.tuple(lhs).is_type_parameter() {
            return true;
        }
        let rhs_data = self.pool.tuple(rhs).clone();

        let mut lhs = self.lub(lhs, TupleId::UNDEFINED);
        if self.pool.tuple(lhs).is_object() && rhs_data.is_null() {
            lhs = self.lub(lhs, TupleId::NULL);
        }
        let lhs_data = self.pool.tuple(lhs);
        if lhs_data.is_null() && !lhs_data.is_object() && rhs_data.is_object() {
            let object = self.pool.object_tuple(rhs_data.object);
            lhs = self.lub(lhs, object);
        }

        let joined = self.lub(lhs, rhs);
        self.pool.tuples_equal(joined, lhs)
    }
}
