//! RecordStore: insertion-ordered entries threaded through a generational arena.
//!
//! Nodes live in a `SlotMap` and are linked front-to-back by their keys, so
//! unlinking one node is O(1) and never moves or invalidates another. Freed
//! slots are reused by later inserts with a bumped generation, which keeps
//! stale `Handle`s from resolving to the new occupant.

use core::marker::PhantomData;
use core::ptr::NonNull;
use slotmap::{DefaultKey, SlotMap};

/// Stable locator for one entry. Stays valid until that entry is removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    // Bucket slot the key hashed to; lets clear/remove skip rehashing.
    pub(crate) bucket: usize,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

pub(crate) struct RecordStore<K, V> {
    slots: SlotMap<DefaultKey, Node<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<K, V> RecordStore<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append a node at the tail and return its handle.
    pub(crate) fn push_back(&mut self, key: K, value: V, hash: u64, bucket: usize) -> Handle {
        let prev = self.tail;
        let k = self.slots.insert(Node {
            key,
            value,
            hash,
            bucket,
            prev,
            next: None,
        });
        match prev {
            Some(p) => {
                if let Some(node) = self.slots.get_mut(p) {
                    node.next = Some(k);
                }
            }
            None => self.head = Some(k),
        }
        self.tail = Some(k);
        Handle::new(k)
    }

    /// Detach a node from the list and hand it back. Neighbours are relinked
    /// around it; every other handle keeps resolving.
    pub(crate) fn unlink(&mut self, h: Handle) -> Option<Node<K, V>> {
        let node = self.slots.remove(h.raw_handle())?;
        match node.prev {
            Some(p) => {
                if let Some(prev) = self.slots.get_mut(p) {
                    prev.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => {
                if let Some(next) = self.slots.get_mut(n) {
                    next.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }
        Some(node)
    }

    pub(crate) fn node(&self, h: Handle) -> Option<&Node<K, V>> {
        self.slots.get(h.raw_handle())
    }

    pub(crate) fn node_mut(&mut self, h: Handle) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(h.raw_handle())
    }

    pub(crate) fn front(&self) -> Option<Handle> {
        self.head.map(Handle::new)
    }

    /// Successor in insertion order; `None` past the tail or for a stale handle.
    pub(crate) fn next_of(&self, h: Handle) -> Option<Handle> {
        self.slots
            .get(h.raw_handle())
            .and_then(|n| n.next)
            .map(Handle::new)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn nodes(&self) -> Nodes<'_, K, V> {
        Nodes {
            slots: &self.slots,
            next: self.head,
            remaining: self.slots.len(),
        }
    }

    pub(crate) fn nodes_mut(&mut self) -> NodesMut<'_, K, V> {
        NodesMut {
            next: self.head,
            remaining: self.slots.len(),
            slots: NonNull::from(&mut self.slots),
            _pd: PhantomData,
        }
    }

    pub(crate) fn into_nodes(self) -> IntoNodes<K, V> {
        let next = self.head;
        IntoNodes {
            slots: self.slots,
            next,
        }
    }
}

/// Front-to-back traversal by shared reference.
pub(crate) struct Nodes<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Node<K, V>>,
    next: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Nodes<'a, K, V> {
    type Item = (Handle, &'a Node<K, V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.next?;
        let node = self.slots.get(k)?;
        self.next = node.next;
        self.remaining -= 1;
        Some((Handle::new(k), node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> Clone for Nodes<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

/// Front-to-back traversal by mutable reference.
pub(crate) struct NodesMut<'a, K, V> {
    slots: NonNull<SlotMap<DefaultKey, Node<K, V>>>,
    next: Option<DefaultKey>,
    remaining: usize,
    _pd: PhantomData<&'a mut SlotMap<DefaultKey, Node<K, V>>>,
}

// Same auto-trait story as the `&'a mut SlotMap` it stands in for.
unsafe impl<K: Send, V: Send> Send for NodesMut<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for NodesMut<'_, K, V> {}

impl<'a, K, V> Iterator for NodesMut<'a, K, V> {
    type Item = (Handle, &'a mut Node<K, V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.next?;
        // SAFETY: `slots` was taken from a `&'a mut SlotMap` that `_pd` keeps
        // borrowed for 'a. The links form a simple list, so each key is
        // visited once and no two yielded node references alias. The map
        // borrow made here only lasts for the lookup.
        let node: &'a mut Node<K, V> = unsafe { (*self.slots.as_ptr()).get_mut(k)? };
        self.next = node.next;
        self.remaining -= 1;
        Some((Handle::new(k), node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Front-to-back traversal that consumes the store.
pub(crate) struct IntoNodes<K, V> {
    slots: SlotMap<DefaultKey, Node<K, V>>,
    next: Option<DefaultKey>,
}

impl<K, V> Iterator for IntoNodes<K, V> {
    type Item = Node<K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.next?;
        let node = self.slots.remove(k)?;
        self.next = node.next;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.slots.len(), Some(self.slots.len()))
    }
}
