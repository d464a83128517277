//! Matching calls against function signatures.

use smallvec::SmallVec;
use tt_ir::VarId;

use crate::env::{Environment, TypeEnv};
use crate::lattice::TypeLattice;
use crate::object::{FunctionType, SingleFunction};
use crate::TupleId;

/// The types a call is made with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallInputs {
    /// Bottom if the callee is not a function.
    pub callee: FunctionType,
    pub base: TupleId,
    pub args: SmallVec<[TupleId; 4]>,
}

/// Signatures a call may resolve to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallMatch {
    pub matches: Vec<SingleFunction>,
    /// The callee is the Top function: any signature may apply.
    pub is_top: bool,
}

impl CallMatch {
    pub fn is_successful(&self) -> bool {
        self.is_top || !self.matches.is_empty()
    }
}

impl TypeLattice {
    /// Read a call's inputs from `env`. Argument types are joined with the
    /// inferred environment so a flow-sensitive read never under-approximates
    /// what the callee may receive.
    pub fn call_inputs(
        &mut self,
        env: &mut impl TypeEnv,
        inferred: &Environment,
        function_tmp: VarId,
        base_tmp: VarId,
        args_tmps: &[VarId],
    ) -> CallInputs {
        let function = env.read(function_tmp);
        let callee = self.pool.function_of(function).clone();
        let base = env.read(base_tmp);
        let args = args_tmps
            .iter()
            .map(|&arg| {
                let read = env.read(arg);
                self.lub(read, inferred.get(arg))
            })
            .collect();
        CallInputs { callee, base, args }
    }

    /// The signatures of `callee` applicable to the given receiver and
    /// arguments. Constructor calls ignore the receiver.
    pub fn match_call(
        &mut self,
        callee: &FunctionType,
        base: TupleId,
        args: &[TupleId],
        is_constructor_call: bool,
    ) -> CallMatch {
        if matches!(callee, FunctionType::Top) {
            return CallMatch {
                matches: Vec::new(),
                is_top: true,
            };
        }
        let matches = callee
            .signatures()
            .iter()
            .filter(|candidate| self.signature_accepts(candidate, base, args, is_constructor_call))
            .cloned()
            .collect();
        CallMatch {
            matches,
            is_top: false,
        }
    }

    fn signature_accepts(
        &mut self,
        candidate: &SingleFunction,
        base: TupleId,
        args: &[TupleId],
        is_constructor_call: bool,
    ) -> bool {
        (is_constructor_call || self.is_assignment_compatible(candidate.base, base))
            && candidate.args.len() == args.len()
            && candidate
                .args
                .iter()
                .zip(args)
                .all(|(&expected, &actual)| self.is_assignment_compatible(expected, actual))
    }

    /// Join of the matched results, plus Top when any signature may apply.
    /// `None` when the call resolves to nothing.
    pub fn return_type(&mut self, call: &CallMatch) -> Option<TupleId> {
        if call.matches.is_empty() && !call.is_top {
            return None;
        }
        let results = self.lub_all(call.matches.iter().map(|m| m.result));
        Some(if call.is_top {
            self.lub(results, TupleId::TOP)
        } else {
            results
        })
    }
}

#[cfg(test)]
mod tests;
