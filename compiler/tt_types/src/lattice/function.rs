//! Function type joins.

use tracing::debug;

use super::{FunctionLatticeKind, TypeLattice};
use crate::object::{ArgTypes, FunctionType, SingleFunction};
use crate::TupleId;

/// Distinct-receiver joins allowed per run before pointwise joins give up.
const MAX_BASE_WIDENINGS: u32 = 100;

impl TypeLattice {
    /// Join two function types with the configured strategy.
    pub fn lub_function(&mut self, f1: &FunctionType, f2: &FunctionType) -> FunctionType {
        match (f1, f2) {
            _ if f1 == f2 => f1.clone(),
            (FunctionType::Bottom, other) | (other, FunctionType::Bottom) => other.clone(),
            (FunctionType::Top, _) | (_, FunctionType::Top) => FunctionType::Top,
            _ => match self.config.function {
                FunctionLatticeKind::Intersection => {
                    let mut members = f1.signatures().to_vec();
                    for single in f2.signatures() {
                        self.add_signature(&mut members, single.clone());
                    }
                    FunctionType::Intersection(members)
                }
                FunctionLatticeKind::PointwiseLub => {
                    self.pointwise_all(f1.signatures().iter().chain(f2.signatures()))
                }
                FunctionLatticeKind::GenericOrLub => {
                    let signatures: Vec<SingleFunction> = f1
                        .signatures()
                        .iter()
                        .chain(f2.signatures())
                        .cloned()
                        .collect();
                    self.generic_or_pointwise(&signatures)
                }
            },
        }
    }

    /// The function type of a value observed with these call signatures.
    pub fn initial_function_type(&mut self, signatures: &[SingleFunction]) -> FunctionType {
        if signatures.is_empty() {
            return FunctionType::Bottom;
        }
        match self.config.function {
            FunctionLatticeKind::Intersection => {
                let mut members = Vec::with_capacity(signatures.len());
                for single in signatures {
                    self.add_signature(&mut members, single.clone());
                }
                FunctionType::Intersection(members)
            }
            FunctionLatticeKind::PointwiseLub => self.pointwise_all(signatures.iter()),
            FunctionLatticeKind::GenericOrLub => self.generic_or_pointwise(signatures),
        }
    }

    /// Base and argument types are pairwise structurally equal.
    pub fn same_base_and_args(&self, s1: &SingleFunction, s2: &SingleFunction) -> bool {
        s1.args.len() == s2.args.len()
            && self.pool.tuples_equal(s1.base, s2.base)
            && s1
                .args
                .iter()
                .zip(&s2.args)
                .all(|(&a1, &a2)| self.pool.tuples_equal(a1, a2))
    }

    /// Add a signature to an intersection. A member with the same inputs
    /// absorbs it by joining results and call kinds.
    fn add_signature(&mut self, members: &mut Vec<SingleFunction>, single: SingleFunction) {
        if members.iter().any(|m| self.pool.singles_equal(m, &single)) {
            return;
        }
        match members
            .iter()
            .position(|m| self.same_base_and_args(m, &single))
        {
            Some(index) => {
                let result = self.lub(members[index].result, single.result);
                let call_kinds = members[index].call_kinds | single.call_kinds;
                members[index] = SingleFunction {
                    result,
                    call_kinds,
                    ..single
                };
            }
            None => members.push(single),
        }
    }

    fn generic_or_pointwise(&mut self, signatures: &[SingleFunction]) -> FunctionType {
        match self.substitute_in_functions(signatures) {
            Some(generic) => FunctionType::Single(generic),
            None => self.pointwise_all(signatures.iter()),
        }
    }

    fn pointwise_all<'a>(
        &mut self,
        signatures: impl IntoIterator<Item = &'a SingleFunction>,
    ) -> FunctionType {
        let mut acc: Option<SingleFunction> = None;
        for single in signatures {
            acc = Some(match acc {
                None => single.clone(),
                Some(joined) => match self.pointwise(&joined, single) {
                    Some(joined) => joined,
                    None => return FunctionType::Top,
                },
            });
        }
        acc.map_or(FunctionType::Bottom, FunctionType::Single)
    }

    /// Join two signatures position by position. A missing argument joins
    /// as undefined. `None` when the run has widened receivers too often.
    fn pointwise(&mut self, s1: &SingleFunction, s2: &SingleFunction) -> Option<SingleFunction> {
        if s1 == s2 {
            return Some(s1.clone());
        }
        let arity = s1.args.len().max(s2.args.len());
        let mut args = ArgTypes::with_capacity(arity);
        for i in 0..arity {
            let joined = match (s1.args.get(i), s2.args.get(i)) {
                (Some(&a1), Some(&a2)) => self.lub(a1, a2),
                (Some(&only), None) | (None, Some(&only)) => self.lub(TupleId::UNDEFINED, only),
                (None, None) => TupleId::UNDEFINED,
            };
            args.push(joined);
        }

        let base = if self.pool.tuples_equal(s1.base, s2.base) {
            s1.base
        } else if self.base_widenings > MAX_BASE_WIDENINGS {
            debug!(
                widenings = self.base_widenings,
                "giving up on function receivers"
            );
            return None;
        } else {
            self.base_widenings += 1;
            self.lub(s1.base, s2.base)
        };

        let result = self.lub(s1.result, s2.result);
        Some(SingleFunction {
            base,
            args,
            result,
            call_kinds: s1.call_kinds | s2.call_kinds,
        })
    }
}
