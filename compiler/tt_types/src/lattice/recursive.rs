//! Bookkeeping for in-progress recursive object merges.
//!
//! Merging two cyclic object graphs meets the same object pair again
//! before the first merge of that pair has produced a result. The inner
//! occurrence is answered with a placeholder tuple tagged with the merge's
//! id; the manager remembers every such placeholder so it can be
//! backpatched with the merged object once the outer merge completes.

use rustc_hash::FxHashMap;

use crate::TupleId;

#[derive(Debug, Default)]
pub(crate) struct RecursiveManager {
    next_id: u32,
    pending: FxHashMap<u32, Vec<TupleId>>,
}

impl RecursiveManager {
    /// Open a merge and return its id.
    pub(crate) fn prepare(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let previous = self.pending.insert(id, Vec::new());
        assert!(previous.is_none(), "recursive merge id {id} already exists");
        id
    }

    /// Record `tuple` as a placeholder for each of `ids`.
    ///
    /// # Panics
    /// Panics if an id does not belong to an open merge.
    pub(crate) fn register(&mut self, tuple: TupleId, ids: &[u32]) {
        for id in ids {
            match self.pending.get_mut(id) {
                Some(tuples) => tuples.push(tuple),
                None => panic!("recursive merge id {id} does not exist"),
            }
        }
    }

    /// Drain the placeholders registered for `id` so far.
    pub(crate) fn take(&mut self, id: u32) -> Vec<TupleId> {
        match self.pending.get_mut(&id) {
            Some(tuples) => std::mem::take(tuples),
            None => panic!("recursive merge id {id} does not exist"),
        }
    }

    /// Close a merge whose placeholders have all been backpatched.
    pub(crate) fn finish(&mut self, id: u32) {
        let remaining = self.pending.remove(&id);
        debug_assert!(
            remaining.is_some_and(|tuples| tuples.is_empty()),
            "recursive merge {id} closed with unresolved placeholders"
        );
    }

    /// No merge is open.
    #[inline]
    pub(crate) fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ids_are_fresh_and_placeholders_drain() {
        let mut manager = RecursiveManager::default();
        let a = manager.prepare();
        let b = manager.prepare();
        assert_ne!(a, b);

        let t = TupleId::from_raw(40);
        manager.register(t, &[a, b]);
        assert_eq!(manager.take(a), vec![t]);
        assert_eq!(manager.take(a), vec![]);
        manager.finish(a);
        assert!(!manager.is_idle());
        assert_eq!(manager.take(b), vec![t]);
        manager.finish(b);
        assert!(manager.is_idle());
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn registering_under_a_closed_merge_is_fatal() {
        let mut manager = RecursiveManager::default();
        let id = manager.prepare();
        manager.finish(id);
        manager.register(TupleId::from_raw(40), &[id]);
    }
}
