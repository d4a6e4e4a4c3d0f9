//! ChainHashMap: record store plus fixed bucket index, kept in lockstep.

use crate::bucket_index::BucketIndex;
use crate::error::{InsertError, OutOfRange};
use crate::iter::{Cursor, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::record_store::{Handle, RecordStore};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Bucket count used by the constructors that do not take one.
pub const DEFAULT_BUCKET_COUNT: usize = 700_000;

/// An insertion-ordered hash map with a fixed number of separate-chaining
/// buckets.
///
/// Entries are kept in a doubly-linked record store that defines iteration
/// order; each bucket chain holds [`Handle`]s into that store. Inserting a
/// key that is already present keeps the stored value, and erasing an absent
/// key does nothing. Neither case is reported by `insert`/`erase`.
///
/// The bucket count never grows. Once the map holds many more entries than
/// buckets, lookups degrade towards a linear scan of the chains.
///
/// There is no internal locking. Sharing one map between threads needs the
/// usual `&mut` exclusivity or an external lock.
pub struct ChainHashMap<K, V, S = RandomState> {
    hasher: S,
    pub(crate) index: BucketIndex,
    pub(crate) store: RecordStore<K, V>,
}

impl<K, V> ChainHashMap<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_bucket_count(bucket_count: usize) -> Self {
        Self::with_bucket_count_and_hasher(bucket_count, RandomState::new())
    }
}

impl<K, V, S: Default> Default for ChainHashMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ChainHashMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_bucket_count_and_hasher(DEFAULT_BUCKET_COUNT, hasher)
    }

    /// A `bucket_count` of zero is treated as one.
    pub fn with_bucket_count_and_hasher(bucket_count: usize, hasher: S) -> Self {
        Self {
            hasher,
            index: BucketIndex::new(bucket_count),
            store: RecordStore::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.index.bucket_count()
    }

    pub fn hash_function(&self) -> &S {
        &self.hasher
    }

    /// Remove every entry. Only the buckets that hold something are touched;
    /// the bucket count stays the same.
    pub fn clear(&mut self) {
        for (_, node) in self.store.nodes() {
            self.index.clear_slot(node.bucket);
        }
        self.store.clear();
    }

    /// Remove the entry `handle` points at. A stale handle is a no-op.
    pub fn remove_handle(&mut self, handle: Handle) -> Option<(K, V)> {
        let node = self.store.unlink(handle)?;
        let unlinked = self.index.unlink(node.bucket, handle);
        debug_assert!(unlinked, "live entry missing from its bucket chain");
        Some((node.key, node.value))
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.store.nodes())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.store.nodes_mut())
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Cursor on the oldest entry, or the end cursor when empty.
    pub fn cursor_front(&self) -> Cursor {
        Cursor::new(self.store.front())
    }

    /// The past-the-end cursor. All end cursors compare equal.
    pub fn cursor_end(&self) -> Cursor {
        Cursor::END
    }

    pub(crate) fn handle_key(&self, h: Handle) -> Option<&K> {
        self.store.node(h).map(|n| &n.key)
    }

    pub(crate) fn handle_value(&self, h: Handle) -> Option<&V> {
        self.store.node(h).map(|n| &n.value)
    }

    pub(crate) fn handle_value_mut(&mut self, h: Handle) -> Option<&mut V> {
        self.store.node_mut(h).map(|n| &mut n.value)
    }

    pub(crate) fn handle_entry(&self, h: Handle) -> Option<(&K, &V)> {
        self.store.node(h).map(|n| (&n.key, &n.value))
    }

    pub(crate) fn handle_entry_mut(&mut self, h: Handle) -> Option<(&K, &mut V)> {
        self.store.node_mut(h).map(|n| (&n.key, &mut n.value))
    }

    pub(crate) fn next_handle(&self, h: Handle) -> Option<Handle> {
        self.store.next_of(h)
    }

    // Scan one chain; compares cached hashes before keys.
    fn scan<Q>(&self, slot: usize, hash: u64, q: &Q) -> Option<(usize, Handle)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.index
            .chain(slot)
            .iter()
            .enumerate()
            .find_map(|(pos, &h)| {
                let node = self.store.node(h);
                debug_assert!(node.is_some(), "bucket chain holds a handle to no entry");
                let node = node?;
                (node.hash == hash && node.key.borrow() == q).then_some((pos, h))
            })
    }

    // Copy every entry of `source` into this (empty) map in source order.
    // Cached hashes and slots carry over because the hasher and bucket
    // count match.
    fn refill_from(&mut self, source: &Self)
    where
        K: Clone,
        V: Clone,
    {
        debug_assert!(self.is_empty());
        debug_assert_eq!(self.bucket_count(), source.bucket_count());
        for (_, node) in source.store.nodes() {
            let h = self.store.push_back(
                node.key.clone(),
                node.value.clone(),
                node.hash,
                node.bucket,
            );
            self.index.push(node.bucket, h);
        }
    }
}

impl<K, V, S> ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Build from a sequence of pairs; later duplicates of a key are ignored.
    pub fn from_iter_with_hasher<I>(iter: I, hasher: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut m = Self::with_hasher(hasher);
        m.extend(iter);
        m
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn locate<Q>(&self, q: &Q) -> Option<(usize, usize, Handle)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let slot = self.index.slot_of(hash);
        self.scan(slot, hash, q).map(|(pos, h)| (slot, pos, h))
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(q).map(|(_, _, h)| h)
    }

    /// Cursor on the entry for `q`, or the end cursor when absent.
    pub fn cursor_at<Q>(&self, q: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        Cursor::new(self.find(q))
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(q)?;
        self.handle_value(h)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(q)?;
        self.handle_value_mut(h)
    }

    /// Checked read access. Never inserts.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, OutOfRange>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(OutOfRange)
    }

    /// Append `key -> value` unless the key is already present, in which
    /// case the map is unchanged and `DuplicateKey` is returned.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Handle, InsertError> {
        let hash = self.make_hash(&key);
        let slot = self.index.slot_of(hash);
        if self.scan(slot, hash, &key).is_some() {
            return Err(InsertError::DuplicateKey);
        }
        let h = self.store.push_back(key, value, hash, slot);
        self.index.push(slot, h);
        Ok(h)
    }

    /// Append `key -> value`. A key that is already present keeps its
    /// current value and the pair is dropped without notice.
    pub fn insert(&mut self, key: K, value: V) {
        let _ = self.try_insert(key, value);
    }

    /// Value for `key`, appending `default()` first if the key is absent.
    /// `default` only runs on the appending branch.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        let slot = self.index.slot_of(hash);
        let h = match self.scan(slot, hash, &key) {
            Some((_, h)) => h,
            None => {
                let h = self.store.push_back(key, default(), hash, slot);
                self.index.push(slot, h);
                h
            }
        };
        self.handle_value_mut(h)
            .expect("handle located or appended in this call must be live")
    }

    /// Value for `key`, appending `V::default()` first if the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Remove the entry for `q` if there is one. An absent key is a no-op.
    pub fn erase<Q>(&mut self, q: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _ = self.remove_entry(q);
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (slot, pos, h) = self.locate(q)?;
        let removed = self.index.remove_at(slot, pos);
        debug_assert_eq!(removed, h);
        let node = self
            .store
            .unlink(h)
            .expect("chain handle must point at a live entry");
        Some((node.key, node.value))
    }
}

impl Handle {
    pub fn key<'a, K, V, S>(&self, map: &'a ChainHashMap<K, V, S>) -> Option<&'a K> {
        map.handle_key(*self)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a ChainHashMap<K, V, S>) -> Option<&'a V> {
        map.handle_value(*self)
    }

    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut ChainHashMap<K, V, S>) -> Option<&'a mut V> {
        map.handle_value_mut(*self)
    }
}

impl<K, V, S> Clone for ChainHashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        let mut out = Self::with_bucket_count_and_hasher(self.bucket_count(), self.hasher.clone());
        out.refill_from(self);
        out
    }

    /// Copy-assignment: drops this map's entries and rebuilds both
    /// structures from `source`, taking its hasher and bucket count.
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.hasher = source.hasher.clone();
        if self.bucket_count() != source.bucket_count() {
            self.index = BucketIndex::new(source.bucket_count());
        }
        self.refill_from(source);
    }
}

impl<K, V, S> fmt::Debug for ChainHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Same key set with equal values; insertion order is not compared.
impl<K, V, S> PartialEq for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_iter_with_hasher(iter, S::default())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_iter_with_hasher(pairs, RandomState::new())
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for ChainHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.store.into_nodes())
    }
}
