//! BucketIndex: a fixed number of chains of record handles.
//!
//! The slot count is set once at construction and never changes, so a
//! cached slot number stays correct for the lifetime of the entry.

use crate::record_store::Handle;

pub(crate) struct BucketIndex {
    chains: Box<[Vec<Handle>]>,
}

impl BucketIndex {
    /// A zero bucket count is bumped to one.
    pub(crate) fn new(bucket_count: usize) -> Self {
        let n = bucket_count.max(1);
        Self {
            chains: (0..n).map(|_| Vec::new()).collect(),
        }
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.chains.len()
    }

    #[inline]
    pub(crate) fn slot_of(&self, hash: u64) -> usize {
        (hash % self.chains.len() as u64) as usize
    }

    #[inline]
    pub(crate) fn chain(&self, slot: usize) -> &[Handle] {
        &self.chains[slot]
    }

    pub(crate) fn push(&mut self, slot: usize, h: Handle) {
        self.chains[slot].push(h);
    }

    /// Drop the chain element at `pos`; the rest of the chain keeps its order.
    pub(crate) fn remove_at(&mut self, slot: usize, pos: usize) -> Handle {
        self.chains[slot].remove(pos)
    }

    /// Drop `h` from its chain. Returns false if it was not there.
    pub(crate) fn unlink(&mut self, slot: usize, h: Handle) -> bool {
        let chain = &mut self.chains[slot];
        match chain.iter().position(|&c| c == h) {
            Some(pos) => {
                chain.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear_slot(&mut self, slot: usize) {
        self.chains[slot].clear();
    }

    #[cfg(test)]
    pub(crate) fn total_len(&self) -> usize {
        self.chains.iter().map(Vec::len).sum()
    }
}
