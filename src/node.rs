//! The versioned tree cell.
//!
//! This module provides [`Node`], the building block of the partially
//! persistent tree. A node carries an immutable value, up to two
//! *birth-time* children fixed at construction, and a single write-once
//! *modification slot* holding a replacement pointer for one side together
//! with the version at which it takes effect.
//!
//! # Bounded mutation
//!
//! The modification slot is the structural basis of partial persistence:
//! each node absorbs exactly one future change in place, and any further
//! change forces the caller to copy the path instead of touching the node
//! again. The one-way `unmodified -> modified` transition is enforced by
//! the slot's cell type ([`std::cell::OnceCell`]), not by a runtime flag.
//!
//! # Version-aware navigation
//!
//! [`Node::child`] is the navigation primitive every algorithm is built
//! on: it returns the modification target when a modification exists on
//! the requested side and its effective version is visible, and the
//! birth-time child otherwise.
//!
//! # Examples
//!
//! ```rust
//! use chronotree::node::Node;
//! use chronotree::Side;
//!
//! let original = Node::with_no_modification(None, None, 3).unwrap();
//! let root = Node::with_no_modification(Some(original), None, 4).unwrap();
//!
//! // Replace the left child starting at version 2.
//! let replacement = Node::with_no_modification(None, None, 2).unwrap();
//! Node::set_modification(&root, Side::Left, replacement, 2).unwrap();
//!
//! // Version 1 still sees the birth-time child; version 2 sees the
//! // replacement.
//! assert_eq!(root.child(Side::Left, 1).map(|child| *child.value()), Some(3));
//! assert_eq!(root.child(Side::Left, 2).map(|child| *child.value()), Some(2));
//! ```

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::TreeError;

// =============================================================================
// Handle Type Aliases
// =============================================================================

/// Shared handle to a node.
///
/// A node created at one version may be referenced as a child, via a birth
/// pointer or a modification pointer, from ancestor chains belonging to
/// several versions at once. Reference counting keeps every node alive for
/// as long as any version can still reach it.
pub type NodeHandle<T> = Rc<Node<T>>;

/// Non-owning handle used for parent back-references.
///
/// The parent link must never be an owning edge: dropping one version's
/// root must not attempt to free nodes still reachable from other
/// versions, and a strong back-reference would form a cycle.
pub(crate) type ParentHandle<T> = Weak<Node<T>>;

// =============================================================================
// Side Definition
// =============================================================================

/// The side of a parent-child relationship.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    /// The left subtree, holding values smaller than the parent.
    Left,
    /// The right subtree, holding values greater than the parent.
    Right,
}

impl Side {
    /// Returns the other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

// =============================================================================
// Modification Definition
// =============================================================================

/// Payload of a node's write-once modification slot: a replacement pointer
/// for one side, tagged with the version at which it takes effect.
struct Modification<T> {
    side: Side,
    target: NodeHandle<T>,
    version: usize,
}

// =============================================================================
// Node Definition
// =============================================================================

/// A node in a partially persistent binary search tree.
///
/// The value and the birth-time children are fixed at construction. The
/// only mutable state is the modification slot, written at most once over
/// the node's lifetime, and the non-owning parent back-reference.
///
/// Nodes are only ever handed out as [`NodeHandle`]s; the constructors
/// validate the search-order invariant and wire parent back-references
/// for every supplied child.
pub struct Node<T> {
    value: T,
    left: Option<NodeHandle<T>>,
    right: Option<NodeHandle<T>>,
    modification: OnceCell<Modification<T>>,
    parent: RefCell<ParentHandle<T>>,
}

impl<T: Ord> Node<T> {
    /// Constructs a node with no modification.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::OrderingViolation`] if a supplied child would
    /// break the search-order invariant relative to `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chronotree::node::Node;
    ///
    /// let leaf = Node::with_no_modification(None, None, 3).unwrap();
    /// let root = Node::with_no_modification(Some(leaf), None, 4).unwrap();
    /// assert_eq!(*root.value(), 4);
    ///
    /// // An inverted child is rejected.
    /// let too_large = Node::with_no_modification(None, None, 9).unwrap();
    /// assert!(Node::with_no_modification(Some(too_large), None, 4).is_err());
    /// ```
    pub fn with_no_modification(
        left: Option<NodeHandle<T>>,
        right: Option<NodeHandle<T>>,
        value: T,
    ) -> Result<NodeHandle<T>, TreeError> {
        Self::build(left, right, value, None)
    }

    /// Constructs a node that already carries a modification to its left
    /// subtree.
    ///
    /// Used when reconstructing a node whose history is known up front,
    /// for example when copying a cell that already absorbed a change.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::OrderingViolation`] if a birth child or the
    /// modification target would break the search-order invariant.
    pub fn with_left_modification(
        left: Option<NodeHandle<T>>,
        right: Option<NodeHandle<T>>,
        value: T,
        target: NodeHandle<T>,
        version: usize,
    ) -> Result<NodeHandle<T>, TreeError> {
        Self::build(left, right, value, Some((Side::Left, target, version)))
    }

    /// Constructs a node that already carries a modification to its right
    /// subtree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::OrderingViolation`] if a birth child or the
    /// modification target would break the search-order invariant.
    pub fn with_right_modification(
        left: Option<NodeHandle<T>>,
        right: Option<NodeHandle<T>>,
        value: T,
        target: NodeHandle<T>,
        version: usize,
    ) -> Result<NodeHandle<T>, TreeError> {
        Self::build(left, right, value, Some((Side::Right, target, version)))
    }

    /// Shared constructor behind the public factories.
    fn build(
        left: Option<NodeHandle<T>>,
        right: Option<NodeHandle<T>>,
        value: T,
        modification: Option<(Side, NodeHandle<T>, usize)>,
    ) -> Result<NodeHandle<T>, TreeError> {
        if let Some(child) = left.as_ref() {
            Self::check_order(Side::Left, &child.value, &value)?;
        }
        if let Some(child) = right.as_ref() {
            Self::check_order(Side::Right, &child.value, &value)?;
        }

        let slot = match modification {
            Some((side, target, version)) => {
                Self::check_order(side, &target.value, &value)?;
                OnceCell::from(Modification {
                    side,
                    target,
                    version,
                })
            }
            None => OnceCell::new(),
        };

        let node = Rc::new(Self {
            value,
            left,
            right,
            modification: slot,
            parent: RefCell::new(Weak::new()),
        });

        for child in [node.left.as_ref(), node.right.as_ref()]
            .into_iter()
            .flatten()
        {
            child.set_parent(&node);
        }
        if let Some(modification) = node.modification.get() {
            modification.target.set_parent(&node);
        }

        Ok(node)
    }

    /// Writes the node's modification slot, replacing the child on `side`
    /// with `target` starting at `version`.
    ///
    /// Takes the node by handle so the target's parent back-reference can
    /// be rewired to it, in the spirit of [`Rc::downgrade`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::AlreadyModified`] if the slot is already
    /// occupied, and [`TreeError::OrderingViolation`] if `target` would
    /// break the search-order invariant relative to this node's value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chronotree::node::Node;
    /// use chronotree::{Side, TreeError};
    ///
    /// let child = Node::with_no_modification(None, None, 3).unwrap();
    /// let root = Node::with_no_modification(Some(child), None, 4).unwrap();
    ///
    /// let first = Node::with_no_modification(None, None, 2).unwrap();
    /// assert!(Node::set_modification(&root, Side::Left, first, 2).is_ok());
    ///
    /// // The slot is write-once: a second modification is rejected.
    /// let second = Node::with_no_modification(None, None, 1).unwrap();
    /// assert_eq!(
    ///     Node::set_modification(&root, Side::Left, second, 3),
    ///     Err(TreeError::AlreadyModified)
    /// );
    /// ```
    pub fn set_modification(
        this: &NodeHandle<T>,
        side: Side,
        target: NodeHandle<T>,
        version: usize,
    ) -> Result<(), TreeError> {
        if this.has_modification() {
            return Err(TreeError::AlreadyModified);
        }
        Self::check_order(side, &target.value, &this.value)?;

        let modification = Modification {
            side,
            target: NodeHandle::clone(&target),
            version,
        };
        this.modification
            .set(modification)
            .map_err(|_| TreeError::AlreadyModified)?;
        target.set_parent(this);
        Ok(())
    }

    /// Rejects a child that would invert the search order.
    ///
    /// Only strict inversions are rejected; equal values never coexist at
    /// one version through the public insertion path.
    fn check_order(side: Side, child_value: &T, parent_value: &T) -> Result<(), TreeError> {
        let inverted = match side {
            Side::Left => child_value > parent_value,
            Side::Right => child_value < parent_value,
        };
        if inverted {
            Err(TreeError::OrderingViolation { side })
        } else {
            Ok(())
        }
    }
}

impl<T> Node<T> {
    /// Returns the node's value.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Returns the child visible on `side` at `version`.
    ///
    /// If the node carries a modification on that side whose effective
    /// version is less than or equal to `version`, the modification target
    /// is returned; in every other case the birth-time child is.
    #[must_use]
    pub fn child(&self, side: Side, version: usize) -> Option<&NodeHandle<T>> {
        match self.modification.get() {
            Some(modification) if modification.side == side && modification.version <= version => {
                Some(&modification.target)
            }
            _ => match side {
                Side::Left => self.left.as_ref(),
                Side::Right => self.right.as_ref(),
            },
        }
    }

    /// Returns `true` if the node's modification slot is occupied.
    #[inline]
    #[must_use]
    pub fn has_modification(&self) -> bool {
        self.modification.get().is_some()
    }

    /// Returns the node's structural parent, if it is still alive.
    ///
    /// The back-reference reflects the chain the node was last attached
    /// to; it is informational and never used for navigation, which
    /// re-ascends along a freshly recorded path instead.
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle<T>> {
        self.parent.borrow().upgrade()
    }

    /// Rewires the parent back-reference to `parent`.
    fn set_parent(&self, parent: &NodeHandle<T>) {
        *self.parent.borrow_mut() = Rc::downgrade(parent);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::{Node, Side};
    use crate::error::TreeError;
    use rstest::rstest;

    #[rstest]
    fn test_opposite_side() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[rstest]
    fn test_leaf_has_no_children_and_no_modification() {
        let leaf = Node::with_no_modification(None, None, 7).unwrap();
        assert_eq!(*leaf.value(), 7);
        assert!(leaf.child(Side::Left, 1).is_none());
        assert!(leaf.child(Side::Right, 1).is_none());
        assert!(!leaf.has_modification());
        assert!(leaf.parent().is_none());
    }

    #[rstest]
    fn test_construction_wires_parent_back_references() {
        let left = Node::with_no_modification(None, None, 1).unwrap();
        let right = Node::with_no_modification(None, None, 9).unwrap();
        let root =
            Node::with_no_modification(Some(left.clone()), Some(right.clone()), 5).unwrap();

        assert_eq!(left.parent().map(|parent| *parent.value()), Some(5));
        assert_eq!(right.parent().map(|parent| *parent.value()), Some(5));
        assert!(root.parent().is_none());
    }

    #[rstest]
    fn test_construction_rejects_inverted_left_child() {
        let too_large = Node::with_no_modification(None, None, 9).unwrap();
        let result = Node::with_no_modification(Some(too_large), None, 5);
        assert_eq!(
            result.err(),
            Some(TreeError::OrderingViolation { side: Side::Left })
        );
    }

    #[rstest]
    fn test_construction_rejects_inverted_right_child() {
        let too_small = Node::with_no_modification(None, None, 1).unwrap();
        let result = Node::with_no_modification(None, Some(too_small), 5);
        assert_eq!(
            result.err(),
            Some(TreeError::OrderingViolation { side: Side::Right })
        );
    }

    #[rstest]
    fn test_with_left_modification_validates_target() {
        let birth_child = Node::with_no_modification(None, None, 3).unwrap();
        let bad_target = Node::with_no_modification(None, None, 9).unwrap();
        let result =
            Node::with_left_modification(Some(birth_child), None, 5, bad_target, 2);
        assert_eq!(
            result.err(),
            Some(TreeError::OrderingViolation { side: Side::Left })
        );
    }

    #[rstest]
    fn test_with_right_modification_is_visible_from_its_version() {
        let birth_child = Node::with_no_modification(None, None, 9).unwrap();
        let target = Node::with_no_modification(None, None, 8).unwrap();
        let root =
            Node::with_right_modification(None, Some(birth_child), 5, target, 3).unwrap();

        assert!(root.has_modification());
        assert_eq!(root.child(Side::Right, 2).map(|child| *child.value()), Some(9));
        assert_eq!(root.child(Side::Right, 3).map(|child| *child.value()), Some(8));
        assert_eq!(root.child(Side::Right, 4).map(|child| *child.value()), Some(8));
    }

    #[rstest]
    fn test_modification_on_one_side_leaves_other_side_untouched() {
        let left = Node::with_no_modification(None, None, 3).unwrap();
        let right = Node::with_no_modification(None, None, 9).unwrap();
        let root = Node::with_no_modification(Some(left), Some(right), 5).unwrap();

        let target = Node::with_no_modification(None, None, 2).unwrap();
        Node::set_modification(&root, Side::Left, target, 2).unwrap();

        assert_eq!(root.child(Side::Left, 1).map(|child| *child.value()), Some(3));
        assert_eq!(root.child(Side::Left, 2).map(|child| *child.value()), Some(2));
        // The right side always resolves to the birth-time child.
        assert_eq!(root.child(Side::Right, 1).map(|child| *child.value()), Some(9));
        assert_eq!(root.child(Side::Right, 2).map(|child| *child.value()), Some(9));
    }

    #[rstest]
    fn test_set_modification_rewires_target_parent() {
        let root = Node::with_no_modification(None, None, 5).unwrap();
        let target = Node::with_no_modification(None, None, 3).unwrap();
        Node::set_modification(&root, Side::Left, target.clone(), 2).unwrap();
        assert_eq!(target.parent().map(|parent| *parent.value()), Some(5));
    }

    #[rstest]
    fn test_set_modification_rejects_ordering_violation() {
        let root = Node::with_no_modification(None, None, 5).unwrap();
        let bad_target = Node::with_no_modification(None, None, 9).unwrap();
        assert_eq!(
            Node::set_modification(&root, Side::Left, bad_target, 2),
            Err(TreeError::OrderingViolation { side: Side::Left })
        );
        // The failed attempt must not consume the slot.
        assert!(!root.has_modification());
    }

    #[rstest]
    fn test_second_modification_is_rejected() {
        let root = Node::with_no_modification(None, None, 5).unwrap();
        let first = Node::with_no_modification(None, None, 3).unwrap();
        let second = Node::with_no_modification(None, None, 2).unwrap();

        Node::set_modification(&root, Side::Left, first, 2).unwrap();
        assert_eq!(
            Node::set_modification(&root, Side::Left, second, 3),
            Err(TreeError::AlreadyModified)
        );
        // Same for the other side: the slot is per node, not per side.
        let other = Node::with_no_modification(None, None, 9).unwrap();
        assert_eq!(
            Node::set_modification(&root, Side::Right, other, 3),
            Err(TreeError::AlreadyModified)
        );
    }
}
