//! The partially persistent tree aggregate.
//!
//! [`VersionedTree`] owns the append-only sequence of per-version roots,
//! validates version arguments, and is the only component exposing
//! version bookkeeping to the outside. Every read and write delegates to
//! [`crate::algorithms`] against the appropriate historical root.
//!
//! # Versions
//!
//! Versions are 1-indexed; version 0 denotes the implicit empty tree and
//! has no stored root. Each successful insertion appends exactly one new
//! root, which may be the *same* node as the previous root (the path only
//! consumed an idle modification slot) or a freshly constructed chain
//! (path-copying was required). The sequence only ever grows, so every
//! past version remains queryable for the lifetime of the tree.
//!
//! # Examples
//!
//! ```rust
//! use chronotree::VersionedTree;
//!
//! let mut tree = VersionedTree::new();
//! assert_eq!(tree.version(), 0);
//!
//! tree.insert(5).unwrap();
//! tree.insert(3).unwrap();
//!
//! // Version 1 predates the insertion of 3.
//! assert!(!tree.contains(1, &3).unwrap());
//! assert!(tree.contains(2, &3).unwrap());
//! assert_eq!(tree.find(2, &5), Ok(&5));
//! ```

use std::borrow::Borrow;
use std::fmt;

use crate::algorithms::{self, InOrderIterator};
use crate::error::TreeError;
use crate::node::{Node, NodeHandle};

/// A partially persistent ordered container.
///
/// Every past version remains queryable after later insertions, while
/// each insertion allocates only a bounded amount of new storage: O(1)
/// amortized when an idle modification slot is found near the leaf,
/// O(depth) when the whole path has to be copied.
///
/// The tree does not rebalance, does not support deletion, and retains
/// every version for its lifetime. It assumes a single writer performing
/// insertions sequentially; any already-published version may be read
/// freely, because published nodes are never mutated again.
///
/// # Examples
///
/// ```rust
/// use chronotree::{TreeError, VersionedTree};
///
/// let mut tree = VersionedTree::new();
/// tree.insert(2).unwrap();
/// tree.insert(1).unwrap();
/// tree.insert(3).unwrap();
///
/// assert_eq!(tree.version(), 3);
/// assert_eq!(tree.size(3), Ok(3));
/// assert_eq!(tree.size(1), Ok(1));
/// assert_eq!(tree.insert(2), Err(TreeError::KeyExists));
///
/// let values: Vec<i32> = tree.iter(3).unwrap().copied().collect();
/// assert_eq!(values, vec![1, 2, 3]);
/// ```
pub struct VersionedTree<T> {
    /// One root per created version, append-only, 1-indexed.
    versions: Vec<NodeHandle<T>>,
}

impl<T> VersionedTree<T> {
    /// Creates an empty tree at version 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chronotree::VersionedTree;
    ///
    /// let tree: VersionedTree<i32> = VersionedTree::new();
    /// assert_eq!(tree.version(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            versions: Vec::new(),
        }
    }

    /// Returns the current (highest) version number, 0 for an empty tree.
    ///
    /// After `n` successful insertions this is exactly `n`.
    #[inline]
    #[must_use]
    pub fn version(&self) -> usize {
        self.versions.len()
    }

    /// Rejects version arguments beyond the current version count.
    ///
    /// A malformed (negative or non-integer) version cannot be expressed
    /// at all: the argument type is `usize`.
    fn validate_version(&self, version: usize) -> Result<(), TreeError> {
        if version > self.versions.len() {
            Err(TreeError::VersionOutOfRange {
                requested: version,
                current: self.versions.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Returns the root published for `version`, or `None` for version 0.
    ///
    /// Callers must have validated `version` first.
    fn root_at(&self, version: usize) -> Option<&NodeHandle<T>> {
        version.checked_sub(1).map(|index| &self.versions[index])
    }

    /// Counts the items visible at `version`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::VersionOutOfRange`] if `version` exceeds the
    /// current version count.
    pub fn size(&self, version: usize) -> Result<usize, TreeError> {
        self.validate_version(version)?;
        Ok(self
            .root_at(version)
            .map_or(0, |root| algorithms::size(root, version)))
    }

    /// Returns a lazy in-order iterator over the values visible at
    /// `version`.
    ///
    /// The iterator borrows the tree; it is finite, yields values in
    /// ascending order, and a fresh one can be obtained at any time by
    /// calling `iter` again.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::VersionOutOfRange`] if `version` exceeds the
    /// current version count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chronotree::VersionedTree;
    ///
    /// let mut tree = VersionedTree::new();
    /// tree.insert(2).unwrap();
    /// tree.insert(1).unwrap();
    ///
    /// let at_first: Vec<i32> = tree.iter(1).unwrap().copied().collect();
    /// assert_eq!(at_first, vec![2]);
    /// let at_second: Vec<i32> = tree.iter(2).unwrap().copied().collect();
    /// assert_eq!(at_second, vec![1, 2]);
    /// ```
    pub fn iter(&self, version: usize) -> Result<InOrderIterator<'_, T>, TreeError> {
        self.validate_version(version)?;
        Ok(InOrderIterator::new(self.root_at(version), version))
    }

    /// Finds the value equal to `key` as visible at `version`.
    ///
    /// The key may be any borrowed form of the stored value, as long as
    /// the ordering on the borrowed form matches the ordering on the
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotFound`] if `key` is absent at `version`
    /// (version 0 is always empty), and [`TreeError::VersionOutOfRange`]
    /// if `version` exceeds the current version count.
    pub fn find<Q>(&self, version: usize, key: &Q) -> Result<&T, TreeError>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.validate_version(version)?;
        let root = self.root_at(version).ok_or(TreeError::NotFound)?;
        algorithms::find(root, version, key).map(|node| node.value())
    }

    /// Tests whether `key` is visible at `version`.
    ///
    /// Unlike [`find`](Self::find), an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::VersionOutOfRange`] if `version` exceeds the
    /// current version count.
    pub fn contains<Q>(&self, version: usize, key: &Q) -> Result<bool, TreeError>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.validate_version(version)?;
        Ok(self
            .root_at(version)
            .is_some_and(|root| algorithms::contains(root, version, key)))
    }
}

impl<T: Clone + Ord> VersionedTree<T> {
    /// Inserts `item`, publishing a new version, and returns the new
    /// version number.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::KeyExists`] if an equal item is already
    /// present at the latest version; no version is published in that
    /// case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chronotree::{TreeError, VersionedTree};
    ///
    /// let mut tree = VersionedTree::new();
    /// assert_eq!(tree.insert(5), Ok(1));
    /// assert_eq!(tree.insert(5), Err(TreeError::KeyExists));
    /// assert_eq!(tree.version(), 1);
    /// ```
    pub fn insert(&mut self, item: T) -> Result<usize, TreeError> {
        self.insert_with(item, false)
    }

    /// Inserts `item`, replacing an equal item if one exists, and returns
    /// the new version number.
    ///
    /// The replaced value stays visible at all prior versions; only the
    /// new version sees `item`.
    ///
    /// # Errors
    ///
    /// Never fails for an existing key. An error from this method
    /// indicates an internal invariant breach and should be treated as a
    /// bug.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chronotree::VersionedTree;
    ///
    /// let mut tree = VersionedTree::new();
    /// tree.insert(5).unwrap();
    ///
    /// // Replacing publishes a new version without growing the tree.
    /// assert_eq!(tree.insert_or_replace(5), Ok(2));
    /// assert_eq!(tree.size(1), Ok(1));
    /// assert_eq!(tree.size(2), Ok(1));
    /// ```
    pub fn insert_or_replace(&mut self, item: T) -> Result<usize, TreeError> {
        self.insert_with(item, true)
    }

    /// Shared insertion path: the new root is only published after the
    /// whole insertion has completed.
    fn insert_with(&mut self, item: T, allow_replace: bool) -> Result<usize, TreeError> {
        let root = match self.versions.last() {
            None => Node::with_no_modification(None, None, item)?,
            Some(root) => algorithms::insert(root, self.versions.len(), item, allow_replace)?,
        };
        self.versions.push(root);
        Ok(self.versions.len())
    }
}

impl<T> Default for VersionedTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for VersionedTree<T> {
    /// Formats the latest version's contents.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let latest = InOrderIterator::new(self.versions.last(), self.version());
        formatter
            .debug_struct("VersionedTree")
            .field("version", &self.version())
            .field("latest", &latest.collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::VersionedTree;
    use crate::error::TreeError;
    use rstest::rstest;

    #[rstest]
    fn test_version_zero_short_circuits_without_roots() {
        let tree: VersionedTree<i32> = VersionedTree::new();
        assert_eq!(tree.size(0), Ok(0));
        assert_eq!(tree.contains(0, &1), Ok(false));
        assert_eq!(tree.find(0, &1), Err(TreeError::NotFound));
        assert_eq!(tree.iter(0).unwrap().count(), 0);
    }

    #[rstest]
    fn test_out_of_range_version_is_rejected() {
        let mut tree = VersionedTree::new();
        tree.insert(1).unwrap();
        let out_of_range = TreeError::VersionOutOfRange {
            requested: 2,
            current: 1,
        };
        assert_eq!(tree.size(2), Err(out_of_range));
        assert_eq!(tree.contains(2, &1), Err(out_of_range));
        assert_eq!(tree.find(2, &1), Err(out_of_range));
        assert!(tree.iter(2).is_err());
    }

    #[rstest]
    fn test_debug_shows_latest_version() {
        let mut tree = VersionedTree::new();
        tree.insert(2).unwrap();
        tree.insert(1).unwrap();
        let rendered = format!("{tree:?}");
        assert!(rendered.contains("version: 2"));
        assert!(rendered.contains("[1, 2]"));
    }
}
