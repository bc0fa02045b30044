use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Index;

use alloc::vec::Vec;

use crate::error::Result;
use crate::raw::RawAvlTreeMap;

mod capacity;
mod display;
mod iter;

pub use display::TreeDisplay;
pub use iter::{IntoIter, Iter, Keys, Values};

/// An ordered map based on a height-balanced ([AVL]) binary search tree.
///
/// Given a key type with a [total order], an ordered map stores its entries in key order.
/// That means that keys must be of a type that implements the [`Ord`] trait,
/// such that two keys can always be compared to determine their [`Ordering`].
///
/// Every node keeps the heights of its two subtrees within one of each other, so
/// lookups, insertions, removals and successor/predecessor queries take worst-case
/// O(log n) time. Nodes live in a slot arena; removed slots are reused by later
/// insertions.
///
/// Unlike [`BTreeMap`], [`insert`] refuses a key that is already present; use
/// [`insert_or_replace`] or [`get_mut`] to update an existing entry. Point lookups
/// report a missing key as [`Error::KeyNotFound`] rather than `None`.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering relative to
/// any other key, as determined by the [`Ord`] trait, changes while it is in the map. The
/// behavior resulting from such a logic error is not specified, but will be encapsulated to the
/// `AvlTreeMap` that observed the logic error and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use avl_tree::{AvlTreeMap, Error};
///
/// let mut map = AvlTreeMap::new();
/// for key in [5, 3, 8, 1, 4, 7, 9] {
///     map.insert(key, key * 10)?;
/// }
///
/// assert_eq!(map.sorted_keys(), [1, 3, 4, 5, 7, 8, 9]);
/// assert_eq!(map.find_keys(&3, &8), [3, 4, 5, 7, 8]);
/// assert_eq!(map.next_key(&4), Some(&5));
/// assert_eq!(map.prev_key(&5), Some(&4));
///
/// assert_eq!(map.insert(4, 0), Err(Error::DuplicateKey));
/// *map.get_mut(&4)? += 1;
/// assert_eq!(map[&4], 41);
///
/// assert_eq!(map.remove(&5), Ok(50));
/// assert_eq!(map.get(&5), Err(Error::KeyNotFound));
/// assert_eq!(map.height(), 3);
/// # Ok::<(), Error>(())
/// ```
///
/// [AVL]: https://en.wikipedia.org/wiki/AVL_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
/// [`Ordering`]: core::cmp::Ordering
/// [`BTreeMap`]: alloc::collections::BTreeMap
/// [`insert`]: AvlTreeMap::insert
/// [`insert_or_replace`]: AvlTreeMap::insert_or_replace
/// [`get_mut`]: AvlTreeMap::get_mut
/// [`Error::KeyNotFound`]: crate::Error::KeyNotFound
pub struct AvlTreeMap<K, V> {
    raw: RawAvlTreeMap<K, V>,
}

impl<K, V> AvlTreeMap<K, V> {
    /// Makes a new, empty `AvlTreeMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, "a").unwrap();
    /// ```
    #[must_use]
    pub const fn new() -> AvlTreeMap<K, V> {
        AvlTreeMap {
            raw: RawAvlTreeMap::new(),
        }
    }

    /// Clears the map, removing all elements.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let mut a = AvlTreeMap::from([(1, "a"), (2, "b")]);
    /// a.clear();
    /// assert!(a.is_empty());
    /// assert_eq!(a.height(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of elements in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the height of the tree: the number of nodes on its longest
    /// root-to-leaf path, or 0 for an empty map.
    ///
    /// This is a diagnostic of the balancing strategy. It never exceeds
    /// `1.45 * log2(len + 2)`.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// for key in 1..=7 {
    ///     map.insert(key, ()).unwrap();
    /// }
    /// assert_eq!(map.height(), 3);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the first key-value pair in the map.
    /// The key in this pair is the minimum key in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let node = self.raw.node(self.raw.first()?);
        Some((node.key(), node.value()))
    }

    /// Returns the last key-value pair in the map.
    /// The key in this pair is the maximum key in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let node = self.raw.node(self.raw.last()?);
        Some((node.key(), node.value()))
    }

    /// Removes and returns the first element in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.pop_first(), Some((1, "a")));
    /// assert_eq!(map.pop_first(), Some((2, "b")));
    /// assert_eq!(map.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.pop_first()
    }

    /// Removes and returns the last element in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.raw.pop_last()
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns a [`Display`](fmt::Display) adapter that draws the tree shape,
    /// one node per line as `key (height)`, children prefixed by `lft:` or `rgt:`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(1, ()), (2, ()), (3, ())]);
    /// assert_eq!(map.tree().to_string(), "2 (2)\n lft: 1 (1)\n rgt: 3 (1)\n");
    /// ```
    pub fn tree(&self) -> TreeDisplay<'_, K, V> {
        TreeDisplay::new(&self.raw)
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the key is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::{AvlTreeMap, Error};
    ///
    /// let map = AvlTreeMap::from([(1, "a")]);
    /// assert_eq!(map.get(&1), Ok(&"a"));
    /// assert_eq!(map.get(&2), Err(Error::KeyNotFound));
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the key is absent.
    pub fn get_key_value<Q>(&self, key: &Q) -> Result<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the key is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::from([(1, "a")]);
    /// if let Ok(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(key)
    }

    /// Inserts a key-value pair for a key that is not yet in the map.
    ///
    /// The new entry starts as a leaf; every ancestor then has its height
    /// recomputed and, if it leans by two, is restored with one or two rotations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`](crate::Error::DuplicateKey) if the key is
    /// already present. The map, including the stored value, is left unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::{AvlTreeMap, Error};
    ///
    /// let mut map = AvlTreeMap::new();
    /// assert_eq!(map.insert(37, "a"), Ok(()));
    /// assert_eq!(map.insert(37, "b"), Err(Error::DuplicateKey));
    /// assert_eq!(map[&37], "a");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        self.raw.insert(key, value)
    }

    /// Inserts a key-value pair, replacing the value of an existing key.
    ///
    /// Returns the previous value if the key was present. The stored key is not
    /// updated.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// assert_eq!(map.insert_or_replace(37, "a"), None);
    /// assert_eq!(map.insert_or_replace(37, "b"), Some("a"));
    /// assert_eq!(map[&37], "b");
    /// ```
    pub fn insert_or_replace(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert_or_replace(key, value)
    }

    /// Removes a key from the map, returning its value.
    ///
    /// A node with two children takes over its in-order successor's entry, and
    /// every ancestor on the way back up is rebalanced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the key is
    /// absent; the map is left unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::{AvlTreeMap, Error};
    ///
    /// let mut map = AvlTreeMap::from([(1, "a")]);
    /// assert_eq!(map.remove(&1), Ok("a"));
    /// assert_eq!(map.remove(&1), Err(Error::KeyNotFound));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the key is absent.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key)
    }

    /// Returns the keys `k` with `low <= k <= high`, in ascending order.
    ///
    /// Subtrees entirely outside the bounds are skipped. An inverted range
    /// (`low > high`) yields no keys.
    ///
    /// # Complexity
    ///
    /// O(log n + m) for m returned keys
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let map: AvlTreeMap<_, _> = (1..=9).map(|k| (k, ())).collect();
    /// assert_eq!(map.find_keys(&3, &5), [3, 4, 5]);
    /// assert!(map.find_keys(&5, &3).is_empty());
    /// ```
    #[must_use]
    pub fn find_keys<Q>(&self, low: &Q, high: &Q) -> Vec<K>
    where
        K: Borrow<Q> + Clone,
        Q: ?Sized + Ord,
    {
        self.raw.find_keys(low, high)
    }

    /// Returns every key in ascending order.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.keys().cloned().collect()
    }

    /// Returns the smallest key strictly greater than `key`.
    ///
    /// `key` itself does not need to be in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(10, ()), (20, ())]);
    /// assert_eq!(map.next_key(&10), Some(&20));
    /// assert_eq!(map.next_key(&15), Some(&20));
    /// assert_eq!(map.next_key(&20), None);
    /// ```
    pub fn next_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.next_key(key)
    }

    /// Returns the largest key strictly less than `key`.
    ///
    /// `key` itself does not need to be in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn prev_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.prev_key(key)
    }
}

impl<K: Clone, V: Clone> Clone for AvlTreeMap<K, V> {
    fn clone(&self) -> Self {
        AvlTreeMap { raw: self.raw.clone() }
    }
}

impl<K: Hash, V: Hash> Hash for AvlTreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for AvlTreeMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for AvlTreeMap<K, V> {
    fn default() -> Self {
        AvlTreeMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = AvlTreeMap::new();
        map.extend(iter);
        map
    }
}

// Later duplicates win, matching `BTreeMap`.
impl<K: Ord, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert_or_replace(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for AvlTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(2, "b"), (1, "a")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter::new(self.raw.drain_to_vec())
    }
}

impl<K, Q, V> Index<&Q> for AvlTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlTreeMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}
