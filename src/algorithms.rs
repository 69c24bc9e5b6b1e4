//! Stateless algorithms over a `(node, version)` pair.
//!
//! Every function takes an explicit version and never mutates global
//! state; the only mutation anywhere is the single write-once
//! modification slot consumed by [`insert`] when an ancestor with an idle
//! slot is found.
//!
//! The algorithms are exposed as a public module, separate from the
//! [`VersionedTree`](crate::tree::VersionedTree) aggregate, so they can be
//! tested and reused against hand-built subtrees.
//!
//! All walks are iterative with explicit stacks. The tree does not
//! rebalance, so its height is unbounded in the worst case; recursive
//! descent would turn a pathological insertion order into a call-stack
//! overflow.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::error::TreeError;
use crate::node::{Node, NodeHandle, Side};

/// Inline capacity for descent and ascent stacks.
///
/// Paths deeper than this spill to the heap; a balanced-ish tree of a few
/// tens of thousands of items stays within it.
const PATH_DEPTH_HINT: usize = 16;

// =============================================================================
// Lookup
// =============================================================================

/// Finds the node holding `key` in the subtree visible at `version`.
///
/// Classic binary search descent, except that each step navigates through
/// [`Node::child`] so the walk sees the children visible at `version`
/// rather than the birth-time pointers.
///
/// The key may be any borrowed form of the stored value, as long as the
/// ordering on the borrowed form matches the ordering on the value.
///
/// # Errors
///
/// Returns [`TreeError::NotFound`] if no value equal to `key` is visible
/// at `version`.
///
/// # Examples
///
/// ```rust
/// use chronotree::algorithms;
/// use chronotree::node::Node;
///
/// let left = Node::with_no_modification(None, None, 1).unwrap();
/// let root = Node::with_no_modification(Some(left), None, 4).unwrap();
///
/// let found = algorithms::find(&root, 1, &1).unwrap();
/// assert_eq!(*found.value(), 1);
/// assert!(algorithms::find(&root, 1, &3).is_err());
/// ```
pub fn find<'a, T, Q>(
    root: &'a NodeHandle<T>,
    version: usize,
    key: &Q,
) -> Result<&'a NodeHandle<T>, TreeError>
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut current = Some(root);
    while let Some(node) = current {
        match key.cmp(node.value().borrow()) {
            Ordering::Less => current = node.child(Side::Left, version),
            Ordering::Greater => current = node.child(Side::Right, version),
            Ordering::Equal => return Ok(node),
        }
    }
    Err(TreeError::NotFound)
}

/// Tests whether `key` is visible in the subtree at `version`.
///
/// Same descent as [`find`], boolean result; never fails.
#[must_use]
pub fn contains<T, Q>(root: &NodeHandle<T>, version: usize, key: &Q) -> bool
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    find(root, version, key).is_ok()
}

// =============================================================================
// Size
// =============================================================================

/// Counts the nodes of the subtree visible at `version`.
///
/// # Examples
///
/// ```rust
/// use chronotree::algorithms;
/// use chronotree::node::Node;
///
/// let left = Node::with_no_modification(None, None, 1).unwrap();
/// let right = Node::with_no_modification(None, None, 9).unwrap();
/// let root = Node::with_no_modification(Some(left), Some(right), 4).unwrap();
///
/// assert_eq!(algorithms::size(&root, 1), 3);
/// ```
#[must_use]
pub fn size<T>(root: &NodeHandle<T>, version: usize) -> usize {
    let mut pending: SmallVec<[&NodeHandle<T>; PATH_DEPTH_HINT]> = SmallVec::new();
    pending.push(root);
    let mut count = 0;
    while let Some(node) = pending.pop() {
        count += 1;
        if let Some(child) = node.child(Side::Left, version) {
            pending.push(child);
        }
        if let Some(child) = node.child(Side::Right, version) {
            pending.push(child);
        }
    }
    count
}

// =============================================================================
// Traversal
// =============================================================================

/// Returns a lazy in-order iterator over the subtree visible at `version`.
///
/// Each call builds a fresh iterator; no traversal state is shared
/// between calls, so the sequence is restartable by calling `traverse`
/// again.
///
/// # Examples
///
/// ```rust
/// use chronotree::algorithms;
/// use chronotree::node::Node;
///
/// let left = Node::with_no_modification(None, None, 1).unwrap();
/// let right = Node::with_no_modification(None, None, 9).unwrap();
/// let root = Node::with_no_modification(Some(left), Some(right), 4).unwrap();
///
/// let values: Vec<i32> = algorithms::traverse(&root, 1).copied().collect();
/// assert_eq!(values, vec![1, 4, 9]);
/// ```
#[must_use]
pub fn traverse<T>(root: &NodeHandle<T>, version: usize) -> InOrderIterator<'_, T> {
    InOrderIterator::new(Some(root), version)
}

/// Lazy in-order iterator over the values visible at one version.
///
/// Uses an explicit descent stack instead of recursion, so the depth of
/// the tree is bounded only by available memory, never by the call stack.
pub struct InOrderIterator<'a, T> {
    descent: SmallVec<[&'a NodeHandle<T>; PATH_DEPTH_HINT]>,
    current: Option<&'a NodeHandle<T>>,
    version: usize,
}

impl<'a, T> InOrderIterator<'a, T> {
    pub(crate) fn new(root: Option<&'a NodeHandle<T>>, version: usize) -> Self {
        Self {
            descent: SmallVec::new(),
            current: root,
            version,
        }
    }
}

impl<'a, T> Iterator for InOrderIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.current {
            self.descent.push(node);
            self.current = node.child(Side::Left, self.version);
        }
        let node = self.descent.pop()?;
        self.current = node.child(Side::Right, self.version);
        Some(node.value())
    }
}

impl<T> FusedIterator for InOrderIterator<'_, T> {}

// =============================================================================
// Insertion
// =============================================================================

/// Inserts `item` into the tree rooted at `root` as of `root_version`,
/// returning the root to use for the next version.
///
/// The returned handle is the *same* node as `root` when an ancestor near
/// the insertion point still had an idle modification slot (the new
/// subtree was absorbed in place, effective at `root_version + 1`), and a
/// freshly constructed chain when every ancestor on the path was already
/// full and had to be copied. This yields O(1) amortized extra allocation
/// per insertion and O(depth) in the worst case.
///
/// The ascent walks a path recorded during the descent. A node's parent
/// back-reference reflects the chain it was last attached to, not
/// necessarily the chain navigated for `root_version`, so it is never
/// consulted here.
///
/// # Errors
///
/// Returns [`TreeError::KeyExists`] if an equal item is already visible
/// at `root_version` and `allow_replace` is `false`. With `allow_replace`
/// set, an equal item is replaced: a new node carrying `item` takes over
/// the matched node's visible children, and the old value remains visible
/// at all prior versions.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
///
/// use chronotree::algorithms;
/// use chronotree::node::Node;
///
/// let root = Node::with_no_modification(None, None, 5).unwrap();
///
/// // The root's slot is idle, so the insertion lands in place and the
/// // root is unchanged.
/// let new_root = algorithms::insert(&root, 1, 3, false).unwrap();
/// assert!(Rc::ptr_eq(&root, &new_root));
/// assert!(algorithms::contains(&new_root, 2, &3));
/// assert!(!algorithms::contains(&new_root, 1, &3));
/// ```
pub fn insert<T>(
    root: &NodeHandle<T>,
    root_version: usize,
    item: T,
    allow_replace: bool,
) -> Result<NodeHandle<T>, TreeError>
where
    T: Clone + Ord,
{
    // Locate the insertion point, recording the ancestor path as we go.
    let mut path: SmallVec<[&NodeHandle<T>; PATH_DEPTH_HINT]> = SmallVec::new();
    let mut current = Some(root);
    let mut replaced_children = None;
    while let Some(node) = current {
        match item.cmp(node.value()) {
            Ordering::Less => {
                path.push(node);
                current = node.child(Side::Left, root_version);
            }
            Ordering::Greater => {
                path.push(node);
                current = node.child(Side::Right, root_version);
            }
            Ordering::Equal => {
                if !allow_replace {
                    return Err(TreeError::KeyExists);
                }
                // Value-update path: the replacement leaf takes over the
                // matched node's visible children.
                replaced_children = Some((
                    node.child(Side::Left, root_version).cloned(),
                    node.child(Side::Right, root_version).cloned(),
                ));
                break;
            }
        }
    }

    let mut subtree = match replaced_children {
        Some((left, right)) => Node::with_no_modification(left, right, item)?,
        None => Node::with_no_modification(None, None, item)?,
    };

    // Propagate the new subtree upward, nearest ancestor first. The first
    // ancestor with an idle slot absorbs it; full ancestors are copied.
    let new_version = root_version + 1;
    while let Some(ancestor) = path.pop() {
        let side = if subtree.value() < ancestor.value() {
            Side::Left
        } else {
            Side::Right
        };
        if ancestor.has_modification() {
            subtree = match side {
                Side::Left => Node::with_no_modification(
                    Some(subtree),
                    ancestor.child(Side::Right, root_version).cloned(),
                    ancestor.value().clone(),
                )?,
                Side::Right => Node::with_no_modification(
                    ancestor.child(Side::Left, root_version).cloned(),
                    Some(subtree),
                    ancestor.value().clone(),
                )?,
            };
        } else {
            Node::set_modification(ancestor, side, subtree, new_version)?;
            return Ok(NodeHandle::clone(root));
        }
    }

    // Every ancestor was full: the last copy is the new root.
    Ok(subtree)
}
