mod arena;
mod node;
mod raw_avl_tree_map;

pub(crate) use arena::Handle;
pub(crate) use raw_avl_tree_map::{RawAvlTreeMap, Spine};
