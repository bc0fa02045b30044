use super::arena::Handle;

// AVL height is below 1.4405 * log2(n + 2), about 46 for the largest `Handle` space.
// Also the inline length of `Spine`, which needs smallvec's `const_generics`.
pub(crate) const MAX_HEIGHT: usize = 48;

/// A single AVL tree node. Children are owned exclusively through their handles.
pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    // Nodes on the longest downward path, counting this one; an absent child counts as 0.
    height: u8,
    left: Option<Handle>,
    right: Option<Handle>,
}

impl<K, V> Node<K, V> {
    /// Creates a detached leaf of height 1.
    pub(crate) const fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) const fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) const fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    #[inline]
    pub(crate) const fn height(&self) -> u8 {
        self.height
    }

    pub(crate) const fn set_height(&mut self, height: u8) {
        self.height = height;
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    pub(crate) const fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    pub(crate) const fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    /// Swaps in another key/value pair, keeping links and height. Returns the old pair.
    pub(crate) fn replace_entry(&mut self, (key, value): (K, V)) -> (K, V) {
        (
            core::mem::replace(&mut self.key, key),
            core::mem::replace(&mut self.value, value),
        )
    }

    /// Consumes the node, dropping its links.
    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}
