//! A height-balanced (AVL) ordered map for Rust.
//!
//! This crate provides [`AvlTreeMap`], an ordered map from unique keys to values
//! backed by an AVL tree. Every node keeps the heights of its two subtrees within
//! one of each other, so point operations and neighbour queries run in worst-case
//! O(log n):
//!
//! - [`get`](AvlTreeMap::get) / [`get_mut`](AvlTreeMap::get_mut) - Look up a value, failing with [`Error::KeyNotFound`]
//! - [`insert`](AvlTreeMap::insert) - Add a new key, failing with [`Error::DuplicateKey`]
//! - [`remove`](AvlTreeMap::remove) - Remove a key and rebalance every ancestor
//! - [`next_key`](AvlTreeMap::next_key) / [`prev_key`](AvlTreeMap::prev_key) - Nearest keys on either side of any key
//! - [`find_keys`](AvlTreeMap::find_keys) / [`sorted_keys`](AvlTreeMap::sorted_keys) - Ordered key dumps
//!
//! # Example
//!
//! ```
//! use avl_tree::{AvlTreeMap, Error};
//!
//! let mut scores = AvlTreeMap::new();
//! scores.insert("Alice", 100)?;
//! scores.insert("Bob", 85)?;
//! scores.insert("Carol", 92)?;
//!
//! assert_eq!(scores.get(&"Bob"), Ok(&85));
//! assert_eq!(scores.insert("Bob", 90), Err(Error::DuplicateKey));
//!
//! // Neighbours of a key that is not in the map.
//! assert_eq!(scores.next_key(&"Bart"), Some(&"Bob"));
//! assert_eq!(scores.prev_key(&"Bart"), Some(&"Alice"));
//!
//! assert_eq!(scores.find_keys(&"B", &"Z"), ["Bob", "Carol"]);
//! # Ok::<(), Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Shared contract** - [`OrderedMap`] abstracts over backends; `BTreeMap` implements it too
//! - **No `unsafe`** - Nodes live in a slot arena and link to each other by index
//!
//! # Implementation
//!
//! Insertion and removal descend recursively and return the (possibly rotated)
//! root of each subtree to the caller, which recomputes its height and rebalances
//! on the way back up. Child links are niche-optimised `u32` handles into the arena.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod avl_tree_map;
pub mod ordered_map;

pub use avl_tree_map::AvlTreeMap;
pub use error::{Error, Result};
pub use ordered_map::OrderedMap;
