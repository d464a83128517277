//! Sampled memo table for tuple joins.

use rustc_hash::FxHashMap;

use crate::TupleId;

/// One in this many join results is remembered.
const SAMPLE_RATE: u32 = 10;

/// Memo of join results keyed by the unordered operand pair.
///
/// Only every tenth offered result is stored, which bounds memory on long
/// runs while still catching the hot repeated joins of a fixpoint.
#[derive(Debug, Default)]
pub(crate) struct LubCache {
    entries: FxHashMap<(TupleId, TupleId), TupleId>,
    offered: u32,
}

#[inline]
fn key(t1: TupleId, t2: TupleId) -> (TupleId, TupleId) {
    if t1 <= t2 {
        (t1, t2)
    } else {
        (t2, t1)
    }
}

impl LubCache {
    #[inline]
    pub(crate) fn get(&self, t1: TupleId, t2: TupleId) -> Option<TupleId> {
        self.entries.get(&key(t1, t2)).copied()
    }

    pub(crate) fn offer(&mut self, t1: TupleId, t2: TupleId, result: TupleId) {
        self.offered = self.offered.wrapping_add(1);
        if self.offered % SAMPLE_RATE == 0 {
            self.entries.insert(key(t1, t2), result);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
