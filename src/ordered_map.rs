//! The ordered-map contract shared by every backend.
//!
//! Code that only needs key-ordered storage (test drivers, benchmarks) should be
//! written against [`OrderedMap`] so it does not depend on how a backend keeps
//! itself balanced.

use core::ops::Bound;

use alloc::collections::BTreeMap;
use alloc::collections::btree_map::Entry;
use alloc::vec::Vec;

use crate::AvlTreeMap;
use crate::error::{Error, Result};

/// A map from unique, totally ordered keys to values.
///
/// Every failing call leaves the map exactly as it was.
pub trait OrderedMap<K: Ord + Clone, V> {
    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the map holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value stored for `key`.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if `key` is absent.
    fn get(&self, key: &K) -> Result<&V>;

    /// Returns the value stored for `key` for in-place update.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if `key` is absent.
    fn get_mut(&mut self, key: &K) -> Result<&mut V>;

    /// Adds an entry for a key that is not present yet.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`] if `key` is already present.
    fn insert(&mut self, key: K, value: V) -> Result<()>;

    /// Removes `key` and returns its value.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if `key` is absent.
    fn remove(&mut self, key: &K) -> Result<V>;

    fn contains_key(&self, key: &K) -> bool;

    /// Keys `k` with `low <= k <= high`, ascending; empty when `low > high`.
    fn find_keys(&self, low: &K, high: &K) -> Vec<K>;

    /// All keys, ascending.
    fn sorted_keys(&self) -> Vec<K>;

    /// The smallest key strictly greater than `key`, present or not.
    fn next_key(&self, key: &K) -> Option<&K>;

    /// The largest key strictly less than `key`, present or not.
    fn prev_key(&self, key: &K) -> Option<&K>;

    fn clear(&mut self);
}

impl<K: Ord + Clone, V> OrderedMap<K, V> for AvlTreeMap<K, V> {
    fn len(&self) -> usize {
        AvlTreeMap::len(self)
    }

    fn get(&self, key: &K) -> Result<&V> {
        AvlTreeMap::get(self, key)
    }

    fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        AvlTreeMap::get_mut(self, key)
    }

    fn insert(&mut self, key: K, value: V) -> Result<()> {
        AvlTreeMap::insert(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Result<V> {
        AvlTreeMap::remove(self, key)
    }

    fn contains_key(&self, key: &K) -> bool {
        AvlTreeMap::contains_key(self, key)
    }

    fn find_keys(&self, low: &K, high: &K) -> Vec<K> {
        AvlTreeMap::find_keys(self, low, high)
    }

    fn sorted_keys(&self) -> Vec<K> {
        AvlTreeMap::sorted_keys(self)
    }

    fn next_key(&self, key: &K) -> Option<&K> {
        AvlTreeMap::next_key(self, key)
    }

    fn prev_key(&self, key: &K) -> Option<&K> {
        AvlTreeMap::prev_key(self, key)
    }

    fn clear(&mut self) {
        AvlTreeMap::clear(self);
    }
}

/// The standard library's B-tree, used as the reference backend.
impl<K: Ord + Clone, V> OrderedMap<K, V> for BTreeMap<K, V> {
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn get(&self, key: &K) -> Result<&V> {
        BTreeMap::get(self, key).ok_or(Error::KeyNotFound)
    }

    fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        BTreeMap::get_mut(self, key).ok_or(Error::KeyNotFound)
    }

    fn insert(&mut self, key: K, value: V) -> Result<()> {
        match self.entry(key) {
            Entry::Occupied(_) => Err(Error::DuplicateKey),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    fn remove(&mut self, key: &K) -> Result<V> {
        BTreeMap::remove(self, key).ok_or(Error::KeyNotFound)
    }

    fn contains_key(&self, key: &K) -> bool {
        BTreeMap::contains_key(self, key)
    }

    fn find_keys(&self, low: &K, high: &K) -> Vec<K> {
        // `BTreeMap::range` panics on inverted bounds.
        if low > high {
            return Vec::new();
        }
        self.range(low..=high).map(|(k, _)| k.clone()).collect()
    }

    fn sorted_keys(&self) -> Vec<K> {
        self.keys().cloned().collect()
    }

    fn next_key(&self, key: &K) -> Option<&K> {
        self.range((Bound::Excluded(key), Bound::Unbounded)).next().map(|(k, _)| k)
    }

    fn prev_key(&self, key: &K) -> Option<&K> {
        self.range(..key).next_back().map(|(k, _)| k)
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }
}
