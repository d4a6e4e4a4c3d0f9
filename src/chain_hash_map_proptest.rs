#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can check
// the bucket index directly.

use crate::chain_hash_map::ChainHashMap;
use crate::error::{InsertError, OutOfRange};
use crate::record_store::Handle;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking lands on earlier keys.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    TryInsert(usize, i32),
    GetOrDefault(usize, i32),
    At(usize),
    Erase(usize),
    RemoveHandle(usize),
    Find(usize),
    Contains(String),
    Iterate,
    Clear,
    CloneAndDiverge(usize),
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::TryInsert(i, v)),
            2 => (idx.clone(), -5i32..5).prop_map(|(i, d)| OpI::GetOrDefault(i, d)),
            1 => idx.clone().prop_map(OpI::At),
            3 => idx.clone().prop_map(OpI::Erase),
            1 => idx.clone().prop_map(OpI::RemoveHandle),
            1 => idx.clone().prop_map(OpI::Find),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,4}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
            1 => idx.clone().prop_map(OpI::CloneAndDiverge),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Model: a plain HashMap for contents plus a Vec recording insertion order.
#[derive(Default)]
struct Model {
    values: HashMap<Key, i32>,
    order: Vec<Key>,
}

impl Model {
    fn insert(&mut self, k: Key, v: i32) -> bool {
        if self.values.contains_key(&k) {
            return false;
        }
        self.values.insert(k.clone(), v);
        self.order.push(k);
        true
    }

    fn remove(&mut self, k: &Key) -> Option<i32> {
        let v = self.values.remove(k)?;
        self.order.retain(|o| o != k);
        Some(v)
    }
}

fn check_structure<S: BuildHasher>(sut: &ChainHashMap<Key, i32, S>) -> Result<(), TestCaseError> {
    prop_assert_eq!(sut.index.total_len(), sut.len());
    for (h, node) in sut.store.nodes() {
        prop_assert_eq!(node.bucket, sut.index.slot_of(node.hash));
        let hits = sut.index.chain(node.bucket).iter().filter(|&&c| c == h).count();
        prop_assert_eq!(hits, 1);
    }
    Ok(())
}

// State-machine equivalence against the model. Invariants exercised:
// - Duplicate inserts keep the first value and never reorder.
// - Get-or-default creates exactly once; mutations are visible to `at`.
// - `at` on a missing key is OutOfRange and changes nothing.
// - Erase (by key or handle) removes from both structures; stale handles
//   never resolve.
// - Iteration order equals insertion order of surviving keys.
// - Clones are independent of the original.
fn run_scenario<S>(
    mut sut: ChainHashMap<Key, i32, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone,
{
    let mut model = Model::default();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(&pool, i);
                sut.insert(k.clone(), v);
                model.insert(k, v);
            }
            OpI::TryInsert(i, v) => {
                let k = key_from(&pool, i);
                let fresh = model.insert(k.clone(), v);
                match sut.try_insert(k.clone(), v) {
                    Ok(h) => {
                        prop_assert!(fresh, "try_insert must fail on duplicate");
                        prop_assert_eq!(h.value(&sut), Some(&v));
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(!fresh, "duplicate error only when key exists");
                    }
                }
            }
            OpI::GetOrDefault(i, d) => {
                let k = key_from(&pool, i);
                let slot = sut.get_or_insert_default(k.clone());
                *slot = slot.wrapping_add(d);
                if !model.values.contains_key(&k) {
                    model.insert(k.clone(), 0);
                }
                let mv = model.values.get_mut(&k).expect("model holds key");
                *mv = mv.wrapping_add(d);
                prop_assert_eq!(sut.at(&k), Ok(&*mv));
            }
            OpI::At(i) => {
                let k = key_from(&pool, i);
                let before = sut.len();
                match model.values.get(&k) {
                    Some(v) => {
                        prop_assert_eq!(sut.at(&k), Ok(v));
                    }
                    None => {
                        prop_assert_eq!(sut.at(&k), Err(OutOfRange));
                    }
                }
                prop_assert_eq!(sut.len(), before);
            }
            OpI::Erase(i) => {
                let k = key_from(&pool, i);
                if let Some(h) = sut.find(&k) {
                    stale.push(h);
                }
                sut.erase(&k);
                model.remove(&k);
                prop_assert!(sut.find(&k).is_none());
            }
            OpI::RemoveHandle(i) => {
                let k = key_from(&pool, i);
                match sut.find(&k) {
                    Some(h) => {
                        let (kk, vv) = sut.remove_handle(h).expect("live handle");
                        prop_assert!(kk == k);
                        prop_assert_eq!(Some(vv), model.remove(&k));
                        stale.push(h);
                    }
                    None => {
                        prop_assert!(!model.values.contains_key(&k));
                    }
                }
            }
            OpI::Find(i) => {
                let k = key_from(&pool, i);
                let found = sut.find(&k);
                prop_assert_eq!(found.is_some(), model.values.contains_key(&k));
                if let Some(h) = found {
                    prop_assert_eq!(h.key(&sut), Some(&k));
                    prop_assert_eq!(sut.cursor_at(&k).handle(), Some(h));
                } else {
                    prop_assert_eq!(sut.cursor_at(&k), sut.cursor_end());
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.values.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Iterate => {
                let pairs: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let expected: Vec<(Key, i32)> = model
                    .order
                    .iter()
                    .map(|k| (k.clone(), model.values[k]))
                    .collect();
                prop_assert_eq!(pairs, expected);
            }
            OpI::Clear => {
                for (k, _) in sut.iter() {
                    if let Some(h) = sut.find(k) {
                        stale.push(h);
                    }
                }
                sut.clear();
                model = Model::default();
            }
            OpI::CloneAndDiverge(i) => {
                let k = key_from(&pool, i);
                let mut copy = sut.clone();
                check_structure(&copy)?;
                copy.erase(&k);
                copy.insert(Key(format!("{}#copy", k.0)), -1);
                let original: Vec<&Key> = sut.keys().collect();
                let expected: Vec<&Key> = model.order.iter().collect();
                prop_assert_eq!(original, expected);
            }
        }

        for &h in &stale {
            prop_assert!(h.value(&sut).is_none(), "stale handle must not resolve");
        }
        prop_assert_eq!(sut.len(), model.values.len());
        prop_assert_eq!(sut.is_empty(), model.values.is_empty());
        check_structure(&sut)?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ChainHashMap::with_bucket_count(3), pool, ops)?;
    }
}

// Collision variant using a constant hasher: one chain holds everything.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainHashMap::with_bucket_count_and_hasher(16, ConstBuildHasher);
        run_scenario(sut, pool, ops)?;
    }
}
