//! Error types for versioned tree operations.
//!
//! This module provides the unified error type returned by the tree, the
//! algorithms and the node constructors. Errors fall into two groups:
//!
//! - **Caller errors** ([`NotFound`], [`KeyExists`], [`VersionOutOfRange`]):
//!   direct consequences of an invalid argument, surfaced immediately and
//!   never retried internally.
//! - **Invariant violations** ([`OrderingViolation`], [`AlreadyModified`]):
//!   signals of a bug in the calling code. The public [`VersionedTree`]
//!   surface never produces them; the path-copying branch of insertion
//!   exists precisely so that no node is ever modified twice.
//!
//! [`NotFound`]: TreeError::NotFound
//! [`KeyExists`]: TreeError::KeyExists
//! [`VersionOutOfRange`]: TreeError::VersionOutOfRange
//! [`OrderingViolation`]: TreeError::OrderingViolation
//! [`AlreadyModified`]: TreeError::AlreadyModified
//! [`VersionedTree`]: crate::tree::VersionedTree

use std::fmt;

use crate::node::Side;

/// Represents errors that can occur when operating on a versioned tree.
///
/// # Examples
///
/// ```rust
/// use chronotree::TreeError;
///
/// let error = TreeError::VersionOutOfRange { requested: 5, current: 2 };
/// assert_eq!(
///     format!("{}", error),
///     "requested version (5) exceeds current version (2)"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The key is absent at the requested version.
    ///
    /// Recoverable; returned by `find`-style operations. Membership tests
    /// return `false` instead of this error.
    NotFound,
    /// An equal item already exists in the latest version of the tree.
    ///
    /// Returned by plain insertion; `insert_or_replace` never produces it.
    KeyExists,
    /// The requested version exceeds the tree's current version count.
    VersionOutOfRange {
        /// The version number that was requested.
        requested: usize,
        /// The tree's current (highest) version number.
        current: usize,
    },
    /// A construction or modification would break the search-order
    /// invariant between a node and one of its children.
    OrderingViolation {
        /// The side on which the offending child was supplied.
        side: Side,
    },
    /// An attempt was made to write a node's modification slot a second
    /// time.
    ///
    /// Each node absorbs exactly one future change in place; a correct
    /// insertion algorithm copies the path instead of touching a full node
    /// again, so this error is unreachable from the public tree surface.
    AlreadyModified,
}

impl fmt::Display for TreeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(formatter, "key not found at the requested version"),
            Self::KeyExists => {
                write!(formatter, "item already exists in latest version of tree")
            }
            Self::VersionOutOfRange { requested, current } => write!(
                formatter,
                "requested version ({requested}) exceeds current version ({current})"
            ),
            Self::OrderingViolation { side: Side::Left } => write!(
                formatter,
                "left child would have value greater than parent node"
            ),
            Self::OrderingViolation { side: Side::Right } => write!(
                formatter,
                "right child would have value less than parent node"
            ),
            Self::AlreadyModified => {
                write!(formatter, "node already contains a modification")
            }
        }
    }
}

impl std::error::Error for TreeError {}
