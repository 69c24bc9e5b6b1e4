//! # chronotree
//!
//! A partially persistent ordered container for Rust: a binary search
//! tree in which every past state ("version") remains queryable after
//! later modifications, while each modification allocates only a bounded
//! amount of new storage.
//!
//! ## Overview
//!
//! The crate follows the classical fat-node / bounded-modification method
//! of partial persistence:
//!
//! - **[`node`]**: the versioned tree cell: an immutable value, two
//!   birth-time children, and a single write-once modification slot.
//! - **[`algorithms`]**: stateless lookup, membership, size, in-order
//!   traversal and insertion over a `(node, version)` pair, including the
//!   path-copying fallback used when a node's slot is already consumed.
//! - **[`tree`]**: the [`VersionedTree`] aggregate owning the append-only
//!   sequence of per-version roots.
//! - **[`map`]**: the [`VersionedMap`] key-value wrapper with per-version
//!   read-only views and default-value semantics, built solely on the
//!   tree's public surface.
//!
//! Insertion costs O(1) amortized extra allocation (an idle modification
//! slot near the leaf absorbs the change) and O(depth) in the worst case
//! (every ancestor already full, so the path is copied). The tree does
//! not rebalance, does not support deletion, and retains every version
//! for its lifetime.
//!
//! ## Concurrency model
//!
//! Single writer, many sequential readers: historical nodes are never
//! mutated again once their modification slot is consumed, and a
//! version's root is only published after the insertion has completed, so
//! reads of published versions are always consistent. Concurrent writers
//! require external synchronization and are out of scope.
//!
//! ## Example
//!
//! ```rust
//! use chronotree::{TreeError, VersionedTree};
//!
//! let mut tree = VersionedTree::new();
//! tree.insert(4).unwrap();
//! tree.insert(2).unwrap();
//! tree.insert(7).unwrap();
//!
//! // Each insertion published one version; all of them stay queryable.
//! assert_eq!(tree.version(), 3);
//! assert_eq!(tree.find(1, &2), Err(TreeError::NotFound));
//! assert_eq!(tree.find(3, &2), Ok(&2));
//!
//! // In-order iteration over any version, in ascending order.
//! let snapshot: Vec<i32> = tree.iter(2).unwrap().copied().collect();
//! assert_eq!(snapshot, vec![2, 4]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod algorithms;
pub mod error;
pub mod map;
pub mod node;
pub mod tree;

pub use algorithms::InOrderIterator;
pub use error::TreeError;
pub use map::{MapIterator, MapKeysIterator, MapValuesIterator, MapView, VersionedMap};
pub use node::{Node, NodeHandle, Side};
pub use tree::VersionedTree;
