//! chain-hashmap: an insertion-ordered HashMap built from a linked record
//! store and a fixed-size index of separate-chaining buckets.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: unique keys, O(1) average lookup/insert/erase, and iteration in
//!   the order keys were first inserted, with O(1) erase once an entry has
//!   been located.
//! - Layers:
//!   - RecordStore<K, V>: doubly-linked list of entries living in a
//!     generational `SlotMap`. Defines iteration order and owns every key
//!     and value. Unlinking one node never moves another.
//!   - BucketIndex: `bucket_count` chains of `Handle`s into the record
//!     store. Slot `i` holds every entry whose hash is `i` modulo the count.
//!   - ChainHashMap<K, V, S>: public API; keeps the two structures in step.
//!
//! Constraints
//! - Every live entry has exactly one handle, in exactly the chain its hash
//!   selects, and every chain handle resolves to a live entry.
//! - Keys are immutable after insert; values are mutable in place.
//! - Inserting a present key is a silent no-op that keeps the old value;
//!   erasing an absent key is a silent no-op. `try_insert` is the variant
//!   that reports duplicates.
//! - The bucket count is fixed at construction (default
//!   `DEFAULT_BUCKET_COUNT`) and never grows. Past roughly one entry per
//!   bucket, chains lengthen and lookups slow down accordingly.
//!
//! Hashing
//! - Each node caches its `u64` hash and bucket slot. Chain scans compare
//!   the cached hash before calling `K: Eq`; `clear`, handle removal, and
//!   cloning use the cached slot and never rehash.
//!
//! Handles and cursors
//! - `Handle` is a generational arena key. It stays valid across inserts
//!   and removals of other entries and across moves of the map, and stops
//!   resolving once its own entry is removed, even if the slot is reused.
//! - `Cursor` is a copyable position (`Handle` or end) with pre/post
//!   advance. It reads through the map passed to it, so the borrow checker
//!   rules out using it across a conflicting mutable borrow.
//!
//! Copies
//! - `Clone`/`clone_from` rebuild both structures from scratch in the
//!   target; nothing is shared between the two maps.
//!
//! Notes and non-goals
//! - No rehashing or growth of the bucket table.
//! - No internal synchronization.
//! - No serialization.

mod bucket_index;
mod chain_hash_map;
#[cfg(test)]
mod chain_hash_map_proptest;
mod error;
mod iter;
mod record_store;

// Public surface
pub use chain_hash_map::{ChainHashMap, DEFAULT_BUCKET_COUNT};
pub use error::{InsertError, OutOfRange};
pub use iter::{Cursor, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use record_store::Handle;
