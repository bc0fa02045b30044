use super::AvlTreeMap;
use crate::raw::RawAvlTreeMap;

impl<K, V> AvlTreeMap<K, V> {
    /// Creates an empty map with room for at least `capacity` entries before
    /// the node arena reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let map: AvlTreeMap<i32, i32> = AvlTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AvlTreeMap {
            raw: RawAvlTreeMap::with_capacity(capacity),
        }
    }

    /// Returns the number of entries the map can hold without reallocating.
    ///
    /// Slots freed by removals count toward this figure and are reused first.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::from([(1, "a")]);
    /// map.reserve(10);
    /// assert!(map.capacity() >= 11);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows `usize`.
    pub fn reserve(&mut self, additional: usize) {
        self.raw.reserve(additional);
    }
}
