use core::fmt;

use crate::raw::{Handle, RawAvlTreeMap};

/// Draws the shape of an `AvlTreeMap`, created by [`tree`](super::AvlTreeMap::tree).
///
/// Each node is written as `key (height)` on its own line. A child line starts
/// with its parent's indentation, then ` lft: ` or ` rgt: `; indentation grows by
/// one space per level.
pub struct TreeDisplay<'a, K, V> {
    tree: &'a RawAvlTreeMap<K, V>,
}

impl<'a, K, V> TreeDisplay<'a, K, V> {
    pub(super) fn new(tree: &'a RawAvlTreeMap<K, V>) -> Self {
        TreeDisplay { tree }
    }
}

impl<K: fmt::Display, V> TreeDisplay<'_, K, V> {
    fn write_subtree(&self, f: &mut fmt::Formatter<'_>, handle: Handle, depth: usize) -> fmt::Result {
        let node = self.tree.node(handle);
        writeln!(f, "{} ({})", node.key(), node.height())?;

        if let Some(left) = node.left() {
            write!(f, "{:depth$} lft: ", "")?;
            self.write_subtree(f, left, depth + 1)?;
        }
        if let Some(right) = node.right() {
            write!(f, "{:depth$} rgt: ", "")?;
            self.write_subtree(f, right, depth + 1)?;
        }
        Ok(())
    }
}

impl<K: fmt::Display, V> fmt::Display for TreeDisplay<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree.root() {
            Some(root) => self.write_subtree(f, root, 0),
            None => Ok(()),
        }
    }
}
