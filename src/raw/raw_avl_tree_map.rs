use core::borrow::Borrow;
use core::cmp::Ordering;

use alloc::vec::Vec;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::{Arena, Handle};
use super::node::{MAX_HEIGHT, Node};
use crate::error::{Error, Result};

/// A stack of handles deep enough for any root-to-leaf path.
pub(crate) type Spine = SmallVec<[Handle; MAX_HEIGHT]>;

/// The AVL tree backing `AvlTreeMap`.
///
/// Mutations descend recursively and hand the (possibly rotated) subtree root
/// back to the caller, so no node ever needs a parent link.
pub(crate) struct RawAvlTreeMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Number of key-value pairs, always equal to the number of live nodes.
    len: usize,
}

impl<K, V> RawAvlTreeMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    /// Height of the whole tree; 0 when empty.
    pub(crate) fn height(&self) -> usize {
        usize::from(self.subtree_height(self.root))
    }

    /// Releases every node.
    pub(crate) fn clear(&mut self) {
        if self.len > 0 {
            debug!(len = self.len, "cleared map");
        }
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Pushes `from` and its chain of left children onto `spine`.
    pub(crate) fn push_left_spine(&self, mut from: Option<Handle>, spine: &mut Spine) {
        while let Some(handle) = from {
            spine.push(handle);
            from = self.nodes.get(handle).left();
        }
    }

    /// Pushes `from` and its chain of right children onto `spine`.
    pub(crate) fn push_right_spine(&self, mut from: Option<Handle>, spine: &mut Spine) {
        while let Some(handle) = from {
            spine.push(handle);
            from = self.nodes.get(handle).right();
        }
    }

    /// Returns the leftmost node of the tree.
    pub(crate) fn first(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(left) = self.nodes.get(current).left() {
            current = left;
        }
        Some(current)
    }

    /// Returns the rightmost node of the tree.
    pub(crate) fn last(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(right) = self.nodes.get(current).right() {
            current = right;
        }
        Some(current)
    }

    /// Moves every entry out in key order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut entries = Vec::with_capacity(self.len);
        let mut spine = Spine::new();
        let mut current = self.root.take();

        loop {
            self.push_left_spine(current, &mut spine);
            let Some(handle) = spine.pop() else {
                break;
            };
            // The left subtree is already drained; only the right link is still needed.
            let node = self.nodes.take(handle);
            current = node.right();
            entries.push(node.into_entry());
        }

        self.nodes.clear();
        self.len = 0;
        entries
    }

    /// Removes and returns the smallest entry.
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        let (root, entry) = self.remove_min(root);
        self.root = root;
        self.len -= 1;
        Some(entry)
    }

    /// Removes and returns the largest entry.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        let (root, entry) = self.remove_max(root);
        self.root = root;
        self.len -= 1;
        Some(entry)
    }

    #[inline]
    fn subtree_height(&self, subtree: Option<Handle>) -> u8 {
        subtree.map_or(0, |handle| self.nodes.get(handle).height())
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.subtree_height(node.left()).max(self.subtree_height(node.right()));
        self.nodes.get_mut(handle).set_height(height);
    }

    /// `height(left) - height(right)`.
    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.subtree_height(node.left())) - i16::from(self.subtree_height(node.right()))
    }

    /// Promotes the left child of `k2` into its place and returns it.
    fn rotate_right(&mut self, k2: Handle) -> Handle {
        let k1 = self.nodes.get(k2).left().expect("`RawAvlTreeMap::rotate_right()` - node has no left child!");
        let inner = self.nodes.get(k1).right();

        self.nodes.get_mut(k2).set_left(inner);
        self.update_height(k2);

        self.nodes.get_mut(k1).set_right(Some(k2));
        self.update_height(k1);
        k1
    }

    /// Promotes the right child of `k2` into its place and returns it.
    fn rotate_left(&mut self, k2: Handle) -> Handle {
        let k1 = self.nodes.get(k2).right().expect("`RawAvlTreeMap::rotate_left()` - node has no right child!");
        let inner = self.nodes.get(k1).left();

        self.nodes.get_mut(k2).set_right(inner);
        self.update_height(k2);

        self.nodes.get_mut(k1).set_left(Some(k2));
        self.update_height(k1);
        k1
    }

    /// Restores the balance invariant at `handle`, whose children are balanced and
    /// whose heights moved by at most one. Returns the new subtree root.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        let balance = self.balance_factor(handle);

        if balance > 1 {
            let left = self.nodes.get(handle).left().expect("`RawAvlTreeMap::rebalance()` - left-heavy node has no left child!");
            // A strictly right-leaning child needs straightening first; a level one must not be rotated.
            if self.balance_factor(left) < 0 {
                let left = self.rotate_left(left);
                self.nodes.get_mut(handle).set_left(Some(left));
                trace!(rotation = "left-right", "rebalanced subtree");
            } else {
                trace!(rotation = "right", "rebalanced subtree");
            }
            self.rotate_right(handle)
        } else if balance < -1 {
            let right = self.nodes.get(handle).right().expect("`RawAvlTreeMap::rebalance()` - right-heavy node has no right child!");
            if self.balance_factor(right) > 0 {
                let right = self.rotate_right(right);
                self.nodes.get_mut(handle).set_right(Some(right));
                trace!(rotation = "right-left", "rebalanced subtree");
            } else {
                trace!(rotation = "left", "rebalanced subtree");
            }
            self.rotate_left(handle)
        } else {
            handle
        }
    }

    /// Recomputes the height of `handle` after a child changed, then rebalances it.
    fn repair(&mut self, handle: Handle) -> Handle {
        self.update_height(handle);
        self.rebalance(handle)
    }

    /// Detaches the leftmost node of the subtree at `handle`.
    /// Returns the replacement subtree root and the detached entry.
    fn remove_min(&mut self, handle: Handle) -> (Option<Handle>, (K, V)) {
        let node = self.nodes.get(handle);
        match node.left() {
            None => {
                let right = node.right();
                (right, self.nodes.take(handle).into_entry())
            }
            Some(left) => {
                let (left, entry) = self.remove_min(left);
                self.nodes.get_mut(handle).set_left(left);
                (Some(self.repair(handle)), entry)
            }
        }
    }

    /// Detaches the rightmost node of the subtree at `handle`.
    fn remove_max(&mut self, handle: Handle) -> (Option<Handle>, (K, V)) {
        let node = self.nodes.get(handle);
        match node.right() {
            None => {
                let left = node.left();
                (left, self.nodes.take(handle).into_entry())
            }
            Some(right) => {
                let (right, entry) = self.remove_max(right);
                self.nodes.get_mut(handle).set_right(right);
                (Some(self.repair(handle)), entry)
            }
        }
    }

    /// Deep-copies the subtree at `handle` into `into`, children first.
    fn copy_subtree(&self, handle: Handle, into: &mut Arena<Node<K, V>>) -> Handle
    where
        K: Clone,
        V: Clone,
    {
        let node = self.nodes.get(handle);
        let left = node.left().map(|left| self.copy_subtree(left, into));
        let right = node.right().map(|right| self.copy_subtree(right, into));

        let mut copy = Node::leaf(node.key().clone(), node.value().clone());
        copy.set_height(node.height());
        copy.set_left(left);
        copy.set_right(right);
        into.alloc(copy)
    }
}

impl<K: Ord, V> RawAvlTreeMap<K, V> {
    /// Searches for a key and returns its node.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
        }
        None
    }

    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Result<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.nodes.get(self.search(key).ok_or(Error::KeyNotFound)?);
        Ok((node.key(), node.value()))
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key).ok_or(Error::KeyNotFound)?;
        Ok(self.nodes.get_mut(handle).value_mut())
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Inserts a key that must not be present yet.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<()> {
        if self.contains_key(&key) {
            return Err(Error::DuplicateKey);
        }
        self.insert_new(key, value);
        Ok(())
    }

    /// Inserts a key, or replaces the value in place if the key is present.
    pub(crate) fn insert_or_replace(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            Some(handle) => Some(core::mem::replace(self.nodes.get_mut(handle).value_mut(), value)),
            None => {
                self.insert_new(key, value);
                None
            }
        }
    }

    fn insert_new(&mut self, key: K, value: V) {
        let root = self.root;
        self.root = Some(self.insert_at(root, key, value));
        self.len += 1;
        debug_assert_eq!(self.nodes.len(), self.len);
    }

    /// Inserts below `subtree` and returns the replacement subtree root.
    fn insert_at(&mut self, subtree: Option<Handle>, key: K, value: V) -> Handle {
        let Some(handle) = subtree else {
            return self.nodes.alloc(Node::leaf(key, value));
        };

        let node = self.nodes.get(handle);
        if key < *node.key() {
            let left = node.left();
            let left = self.insert_at(left, key, value);
            self.nodes.get_mut(handle).set_left(Some(left));
        } else {
            let right = node.right();
            let right = self.insert_at(right, key, value);
            self.nodes.get_mut(handle).set_right(Some(right));
        }

        self.repair(handle)
    }

    /// Removes a key, failing without touching the tree if it is absent.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let root = self.root;
        let (root, removed) = self.remove_at(root, key);
        self.root = root;

        let entry = removed.ok_or(Error::KeyNotFound)?;
        self.len -= 1;
        debug_assert_eq!(self.nodes.len(), self.len);
        Ok(entry)
    }

    /// Removes `key` below `subtree`. Returns the replacement subtree root and the
    /// removed entry; a miss returns the subtree unchanged.
    fn remove_at<Q>(&mut self, subtree: Option<Handle>, key: &Q) -> (Option<Handle>, Option<(K, V)>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(handle) = subtree else {
            return (None, None);
        };

        let node = self.nodes.get(handle);
        let (left, right) = (node.left(), node.right());

        let removed = match key.cmp(node.key().borrow()) {
            Ordering::Less => {
                let (left, removed) = self.remove_at(left, key);
                self.nodes.get_mut(handle).set_left(left);
                removed
            }
            Ordering::Greater => {
                let (right, removed) = self.remove_at(right, key);
                self.nodes.get_mut(handle).set_right(right);
                removed
            }
            Ordering::Equal => match (left, right) {
                (None, None) => return (None, Some(self.nodes.take(handle).into_entry())),
                (Some(child), None) | (None, Some(child)) => {
                    return (Some(child), Some(self.nodes.take(handle).into_entry()));
                }
                (Some(_), Some(right)) => {
                    // The in-order successor has no left child, so detaching it is a one-child splice.
                    let (right, successor) = self.remove_min(right);
                    let node = self.nodes.get_mut(handle);
                    node.set_right(right);
                    Some(node.replace_entry(successor))
                }
            },
        };

        if removed.is_none() {
            return (Some(handle), None);
        }
        (Some(self.repair(handle)), removed)
    }

    /// Keys `k` with `low <= k <= high`, ascending.
    pub(crate) fn find_keys<Q>(&self, low: &Q, high: &Q) -> Vec<K>
    where
        K: Borrow<Q> + Clone,
        Q: ?Sized + Ord,
    {
        let mut keys = Vec::new();
        self.collect_range(self.root, low, high, &mut keys);
        keys
    }

    fn collect_range<Q>(&self, subtree: Option<Handle>, low: &Q, high: &Q, keys: &mut Vec<K>)
    where
        K: Borrow<Q> + Clone,
        Q: ?Sized + Ord,
    {
        let Some(handle) = subtree else {
            return;
        };

        let node = self.nodes.get(handle);
        let key: &Q = node.key().borrow();
        if low < key {
            self.collect_range(node.left(), low, high, keys);
        }
        if low <= key && key <= high {
            keys.push(node.key().clone());
        }
        if key < high {
            self.collect_range(node.right(), low, high, keys);
        }
    }

    /// The smallest key strictly greater than `key`.
    pub(crate) fn next_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            if key < node.key().borrow() {
                best = Some(node.key());
                current = node.left();
            } else {
                current = node.right();
            }
        }
        best
    }

    /// The largest key strictly less than `key`.
    pub(crate) fn prev_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            if node.key().borrow() < key {
                best = Some(node.key());
                current = node.right();
            } else {
                current = node.left();
            }
        }
        best
    }
}

impl<K: Clone, V: Clone> Clone for RawAvlTreeMap<K, V> {
    /// Copies into a fresh arena, so the clone carries no vacant slots.
    fn clone(&self) -> Self {
        let mut nodes = Arena::with_capacity(self.len);
        let root = self.root.map(|root| self.copy_subtree(root, &mut nodes));
        Self {
            nodes,
            root,
            len: self.len,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::collections::btree_map::Entry;
    use proptest::prelude::*;

    type Tree = RawAvlTreeMap<i64, i64>;

    /// Walks the whole tree and asserts order, height, balance and count.
    fn assert_invariants(tree: &Tree) {
        fn walk(tree: &Tree, subtree: Option<Handle>, low: Option<i64>, high: Option<i64>) -> (u8, usize) {
            let Some(handle) = subtree else {
                return (0, 0);
            };
            let node = tree.node(handle);
            let key = *node.key();
            assert!(low.is_none_or(|low| low < key), "{key} is not above its lower bound");
            assert!(high.is_none_or(|high| key < high), "{key} is not below its upper bound");

            let (left_height, left_count) = walk(tree, node.left(), low, Some(key));
            let (right_height, right_count) = walk(tree, node.right(), Some(key), high);
            assert_eq!(node.height(), 1 + left_height.max(right_height), "stale height at {key}");
            assert!(left_height.abs_diff(right_height) <= 1, "unbalanced at {key}");
            (node.height(), left_count + right_count + 1)
        }

        let (height, count) = walk(tree, tree.root(), None, None);
        assert_eq!(usize::from(height), tree.height());
        assert_eq!(count, tree.len());
        assert_eq!(tree.nodes.len(), tree.len());
    }

    fn tree_from(keys: &[i64]) -> Tree {
        let mut tree = Tree::new();
        for &key in keys {
            tree.insert(key, key * 10).unwrap();
            assert_invariants(&tree);
        }
        tree
    }

    fn root_key(tree: &Tree) -> i64 {
        *tree.node(tree.root().unwrap()).key()
    }

    #[test]
    fn ascending_inserts_stay_perfect() {
        let mut tree = Tree::new();
        for key in 1..=7 {
            tree.insert(key, key).unwrap();
            assert_invariants(&tree);
            assert!(tree.height() <= 3);
        }
        assert_eq!(root_key(&tree), 4);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn descending_inserts_stay_perfect() {
        let tree = tree_from(&[7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(root_key(&tree), 4);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn left_right_zigzag_double_rotates() {
        let tree = tree_from(&[3, 1, 2]);
        assert_eq!(root_key(&tree), 2);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn right_left_zigzag_double_rotates() {
        let tree = tree_from(&[1, 3, 2]);
        assert_eq!(root_key(&tree), 2);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn removing_two_child_node_promotes_successor() {
        let mut tree = tree_from(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(tree.remove_entry(&5), Ok((5, 50)));
        assert_invariants(&tree);
        assert_eq!(root_key(&tree), 7);
        assert_eq!(tree.len(), 6);
        assert!(!tree.contains_key(&5));
    }

    #[test]
    fn removal_with_level_sibling_single_rotates() {
        // Removing 1 leaves 2 right-heavy over a level child (3, 5).
        let mut tree = tree_from(&[2, 1, 4, 3, 5]);
        tree.remove_entry(&1).unwrap();
        assert_invariants(&tree);
        assert_eq!(root_key(&tree), 4);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn removal_rebalances_more_than_one_ancestor() {
        // Minimal AVL tree of height 5; removing its shallowest leaf cascades two rotations.
        let mut tree = tree_from(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
        assert_eq!(tree.height(), 5);
        tree.remove_entry(&12).unwrap();
        assert_invariants(&tree);
        assert_eq!(tree.height(), 4);
    }

    #[test]
    fn missing_key_leaves_tree_untouched() {
        let mut tree = tree_from(&[2, 1, 3]);
        assert_eq!(tree.remove_entry(&4), Err(Error::KeyNotFound));
        assert_eq!(tree.insert(2, 0), Err(Error::DuplicateKey));
        assert_invariants(&tree);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get_key_value(&2), Ok((&2, &20)));
    }

    #[test]
    fn drain_yields_sorted_entries() {
        let mut tree = tree_from(&[4, 2, 6, 1, 3, 5, 7]);
        let entries = tree.drain_to_vec();
        assert_eq!(entries, (1..=7).map(|k| (k, k * 10)).collect::<Vec<_>>());
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_invariants(&tree);
    }

    #[test]
    fn clone_is_independent() {
        let mut tree = tree_from(&(0..32).collect::<Vec<_>>());
        for key in (0..32).step_by(3) {
            tree.remove_entry(&key).unwrap();
        }

        let mut copy = tree.clone();
        assert_invariants(&copy);
        assert_eq!(copy.height(), tree.height());

        *copy.get_mut(&1).unwrap() = -1;
        copy.remove_entry(&2).unwrap();
        assert_eq!(tree.get_key_value(&1), Ok((&1, &10)));
        assert!(tree.contains_key(&2));
    }

    #[test]
    fn deepest_path_fits_inline_spine() {
        let keys: Vec<i64> = (0..4096).collect();
        let tree = tree_from(&keys);
        let mut spine = Spine::new();
        tree.push_left_spine(tree.root(), &mut spine);

        assert_eq!(spine.len(), tree.height());
        assert!(!spine.spilled());
        assert!(spine.inline_size() >= MAX_HEIGHT);
        assert_eq!(spine.last().map(|&h| *tree.node(h).key()), Some(0));
    }

    #[test]
    fn neighbours_of_absent_keys() {
        let tree = tree_from(&[10, 20, 30]);
        assert_eq!(tree.next_key(&15), Some(&20));
        assert_eq!(tree.prev_key(&15), Some(&10));
        assert_eq!(tree.next_key(&30), None);
        assert_eq!(tree.prev_key(&10), None);
        assert_eq!(tree.next_key(&0), Some(&10));
        assert_eq!(tree.prev_key(&99), Some(&30));
    }

    #[test]
    fn inverted_range_is_empty() {
        let tree = tree_from(&[1, 2, 3, 4, 5]);
        assert!(tree.find_keys(&4, &2).is_empty());
        assert_eq!(tree.find_keys(&3, &3), [3]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..512)) {
            let mut tree = Tree::new();
            let mut model = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let expected = match model.entry(key) {
                            Entry::Occupied(_) => Err(Error::DuplicateKey),
                            Entry::Vacant(slot) => {
                                slot.insert(key);
                                Ok(())
                            }
                        };
                        prop_assert_eq!(tree.insert(key, key), expected);
                    }
                    Op::Upsert(key, value) => {
                        prop_assert_eq!(tree.insert_or_replace(key, value), model.insert(key, value));
                    }
                    Op::Remove(key) => {
                        let expected = model.remove_entry(&key).ok_or(Error::KeyNotFound);
                        prop_assert_eq!(tree.remove_entry(&key), expected);
                    }
                    Op::PopFirst => {
                        prop_assert_eq!(tree.pop_first(), model.pop_first());
                    }
                    Op::PopLast => {
                        prop_assert_eq!(tree.pop_last(), model.pop_last());
                    }
                }

                assert_invariants(&tree);
                prop_assert_eq!(tree.len(), model.len());
            }

            let expected: Vec<_> = model.into_iter().collect();
            prop_assert_eq!(tree.drain_to_vec(), expected);
        }

        #[test]
        fn height_is_logarithmic(keys in prop::collection::btree_set(any::<i64>(), 0..2048)) {
            let mut tree = Tree::new();
            for &key in &keys {
                tree.insert(key, key).unwrap();
            }
            assert_invariants(&tree);

            // The sparsest AVL tree of height h holds fib(h + 2) - 1 nodes.
            let (mut sparsest, mut next) = (0usize, 1usize);
            for _ in 0..tree.height() {
                (sparsest, next) = (next, sparsest + next + 1);
            }
            prop_assert!(tree.len() >= sparsest, "height {} with only {} keys", tree.height(), tree.len());
        }
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i64),
        Upsert(i64, i64),
        Remove(i64),
        PopFirst,
        PopLast,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        // A narrow key range forces duplicates and removals of present keys.
        let key = -64i64..64;
        prop_oneof![
            6 => key.clone().prop_map(Op::Insert),
            2 => (key.clone(), any::<i64>()).prop_map(|(key, value)| Op::Upsert(key, value)),
            5 => key.prop_map(Op::Remove),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
        ]
    }
}
