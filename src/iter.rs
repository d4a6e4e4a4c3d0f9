//! Iterators and cursors over a `ChainHashMap`, all in insertion order.

use crate::chain_hash_map::ChainHashMap;
use crate::record_store::{Handle, IntoNodes, Nodes, NodesMut};
use core::iter::FusedIterator;

/// Iterator over `(&K, &V)` in insertion order.
pub struct Iter<'a, K, V> {
    it: Nodes<'a, K, V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(it: Nodes<'a, K, V>) -> Self {
        Self { it }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| (&n.key, &n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            it: self.it.clone(),
        }
    }
}

/// Iterator over `(&K, &mut V)` in insertion order. Keys stay immutable.
pub struct IterMut<'a, K, V> {
    it: NodesMut<'a, K, V>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(it: NodesMut<'a, K, V>) -> Self {
        Self { it }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| (&n.key, &mut n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

pub struct Keys<'a, K, V> {
    it: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(it: Iter<'a, K, V>) -> Self {
        Self { it }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            it: self.it.clone(),
        }
    }
}

pub struct Values<'a, K, V> {
    it: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(it: Iter<'a, K, V>) -> Self {
        Self { it }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            it: self.it.clone(),
        }
    }
}

pub struct ValuesMut<'a, K, V> {
    it: IterMut<'a, K, V>,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(crate) fn new(it: IterMut<'a, K, V>) -> Self {
        Self { it }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// Owning iterator; yields `(K, V)` front to back.
pub struct IntoIter<K, V> {
    it: IntoNodes<K, V>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(it: IntoNodes<K, V>) -> Self {
        Self { it }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|n| (n.key, n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// A position in a map's insertion order, or past the end.
///
/// Cursors do not borrow the map; every access takes it as an argument.
/// Two cursors are equal when they sit on the same entry, and all end
/// cursors are equal. A cursor whose entry was removed reads as `None` and
/// advances to the end.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Cursor {
    at: Option<Handle>,
}

impl Cursor {
    pub const END: Cursor = Cursor { at: None };

    pub(crate) fn new(at: Option<Handle>) -> Self {
        Self { at }
    }

    pub fn is_end(&self) -> bool {
        self.at.is_none()
    }

    pub fn handle(&self) -> Option<Handle> {
        self.at
    }

    pub fn get<'a, K, V, S>(&self, map: &'a ChainHashMap<K, V, S>) -> Option<(&'a K, &'a V)> {
        map.handle_entry(self.at?)
    }

    pub fn get_mut<'a, K, V, S>(
        &self,
        map: &'a mut ChainHashMap<K, V, S>,
    ) -> Option<(&'a K, &'a mut V)> {
        map.handle_entry_mut(self.at?)
    }

    /// Step to the next entry (pre-increment). The end cursor stays put.
    pub fn advance<K, V, S>(&mut self, map: &ChainHashMap<K, V, S>) -> &mut Self {
        self.at = self.at.and_then(|h| map.next_handle(h));
        self
    }

    /// Step to the next entry and return where the cursor was (post-increment).
    pub fn post_advance<K, V, S>(&mut self, map: &ChainHashMap<K, V, S>) -> Cursor {
        let prev = *self;
        self.advance(map);
        prev
    }
}

impl From<Handle> for Cursor {
    fn from(h: Handle) -> Self {
        Cursor { at: Some(h) }
    }
}
