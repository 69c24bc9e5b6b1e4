//! Key-value convenience wrapper over the versioned tree.
//!
//! [`VersionedMap`] stores key-value pairs ordered by key, with every
//! write publishing a new version of the underlying
//! [`VersionedTree`](crate::tree::VersionedTree). Old bindings stay
//! visible through read-only [`MapView`] snapshots of past versions.
//!
//! The wrapper consumes only the tree's public operations; it never
//! reaches into node state.
//!
//! # Examples
//!
//! ```rust
//! use chronotree::VersionedMap;
//!
//! let mut map = VersionedMap::new();
//! map.insert("a", 1).unwrap();
//! map.insert("b", 2).unwrap();
//! map.insert("a", 10).unwrap();
//!
//! // The latest version sees the rebinding...
//! assert_eq!(map.get(&"a"), Some(&10));
//! assert_eq!(map.version(), 3);
//!
//! // ...while the binding as of version 2 is still queryable.
//! let view = map.view(2).unwrap();
//! assert_eq!(view.get(&"a"), Some(&1));
//! ```
//!
//! # Default values
//!
//! A map built with [`VersionedMap::with_default`] answers misses with
//! the stored default through [`get_or_default`](VersionedMap::get_or_default):
//!
//! ```rust
//! use chronotree::VersionedMap;
//!
//! let mut counters = VersionedMap::with_default(0);
//! counters.insert("hits", 3).unwrap();
//!
//! assert_eq!(counters.get_or_default(&"hits"), Some(&3));
//! assert_eq!(counters.get_or_default(&"misses"), Some(&0));
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use crate::algorithms::InOrderIterator;
use crate::error::TreeError;
use crate::tree::VersionedTree;

// =============================================================================
// Entry Definition
// =============================================================================

/// A key-value pair ordered and compared by key alone, so that rebinding
/// a key replaces the old entry instead of coexisting with it.
#[derive(Clone)]
struct MapEntry<K, V> {
    key: K,
    value: V,
}

impl<K: Ord, V> PartialEq for MapEntry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Ord, V> Eq for MapEntry<K, V> {}

impl<K: Ord, V> PartialOrd for MapEntry<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord, V> Ord for MapEntry<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl<K, V> Borrow<K> for MapEntry<K, V> {
    fn borrow(&self) -> &K {
        &self.key
    }
}

// =============================================================================
// VersionedMap Definition
// =============================================================================

/// A key-value map in which every past version remains queryable.
///
/// Each [`insert`](Self::insert) publishes a new version; reads default
/// to the latest version, and [`view`](Self::view) exposes any past one.
/// An optional default value answers misses through
/// [`get_or_default`](Self::get_or_default).
pub struct VersionedMap<K, V> {
    tree: VersionedTree<MapEntry<K, V>>,
    default_value: Option<V>,
}

impl<K, V> VersionedMap<K, V> {
    /// Creates an empty map with no default value.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tree: VersionedTree::new(),
            default_value: None,
        }
    }

    /// Creates an empty map that answers misses with `default_value`.
    #[inline]
    #[must_use]
    pub const fn with_default(default_value: V) -> Self {
        Self {
            tree: VersionedTree::new(),
            default_value: Some(default_value),
        }
    }

    /// Returns the current version number, 0 for an empty map.
    #[inline]
    #[must_use]
    pub fn version(&self) -> usize {
        self.tree.version()
    }

    /// Returns a read-only view of the map as of `version`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::VersionOutOfRange`] if `version` exceeds the
    /// current version count.
    pub fn view(&self, version: usize) -> Result<MapView<'_, K, V>, TreeError> {
        if version > self.tree.version() {
            return Err(TreeError::VersionOutOfRange {
                requested: version,
                current: self.tree.version(),
            });
        }
        Ok(MapView { map: self, version })
    }

    /// Returns a read-only view of the latest version.
    #[must_use]
    pub fn latest(&self) -> MapView<'_, K, V> {
        MapView {
            map: self,
            version: self.tree.version(),
        }
    }

    /// Returns the number of entries at the latest version.
    #[must_use]
    pub fn len(&self) -> usize {
        self.latest().len()
    }

    /// Returns `true` if the latest version holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the latest version's entries in
    /// ascending key order.
    #[must_use]
    pub fn iter(&self) -> MapIterator<'_, K, V> {
        self.latest().iter()
    }
}

impl<K: Ord, V> VersionedMap<K, V> {
    /// Returns the value bound to `key` at the latest version.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.latest().get(key)
    }

    /// Returns the value bound to `key` at the latest version, falling
    /// back to the map's default value when the key is absent.
    ///
    /// Returns `None` only when the key is absent and no default was
    /// configured.
    #[must_use]
    pub fn get_or_default(&self, key: &K) -> Option<&V> {
        self.latest().get_or_default(key)
    }

    /// Returns the value bound to `key` at the latest version.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotFound`] if the key is absent; the default
    /// value does not apply here.
    pub fn fetch(&self, key: &K) -> Result<&V, TreeError> {
        self.latest().fetch(key)
    }

    /// Tests whether `key` is bound at the latest version.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.latest().contains_key(key)
    }
}

impl<K: Clone + Ord, V: Clone> VersionedMap<K, V> {
    /// Binds `key` to `value`, publishing a new version, and returns the
    /// new version number.
    ///
    /// An existing binding for the key is replaced in the new version
    /// while remaining visible at all prior versions.
    ///
    /// # Errors
    ///
    /// Never fails for an existing key. An error from this method
    /// indicates an internal invariant breach and should be treated as a
    /// bug.
    pub fn insert(&mut self, key: K, value: V) -> Result<usize, TreeError> {
        self.tree.insert_or_replace(MapEntry { key, value })
    }
}

impl<K, V> Default for VersionedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for VersionedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iterable: I) -> Self {
        let mut map = Self::new();
        map.extend(iterable);
        map
    }
}

impl<K: Clone + Ord, V: Clone> Extend<(K, V)> for VersionedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterable: I) {
        for (key, value) in iterable {
            self.insert(key, value)
                .expect("replacement insertion never violates tree invariants");
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for VersionedMap<K, V> {
    /// Formats the latest version's bindings.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// MapView Definition
// =============================================================================

/// A read-only view of a [`VersionedMap`] pinned to one version.
///
/// Views are cheap to copy; they carry a borrow of the map and a version
/// number, nothing else. A view stays valid for as long as the map is
/// borrowed, and the version it is pinned to can never be mutated again.
pub struct MapView<'a, K, V> {
    map: &'a VersionedMap<K, V>,
    version: usize,
}

impl<K, V> Clone for MapView<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for MapView<'_, K, V> {}

impl<'a, K, V> MapView<'a, K, V> {
    /// Returns the version this view is pinned to.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> usize {
        self.version
    }

    /// Returns the number of entries visible in this view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.tree.size(self.version).unwrap_or(0)
    }

    /// Returns `true` if this view holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over this view's entries in ascending key
    /// order.
    ///
    /// The iterator borrows the map, not the view, so it outlives the
    /// view it was created from.
    #[must_use]
    pub fn iter(&self) -> MapIterator<'a, K, V> {
        MapIterator {
            inner: self.map.tree.iter(self.version).ok(),
        }
    }

    /// Returns an iterator over this view's keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> MapKeysIterator<'a, K, V> {
        MapKeysIterator { inner: self.iter() }
    }

    /// Returns an iterator over this view's values in ascending key
    /// order.
    #[must_use]
    pub fn values(&self) -> MapValuesIterator<'a, K, V> {
        MapValuesIterator { inner: self.iter() }
    }
}

impl<'a, K: Ord, V> MapView<'a, K, V> {
    /// Returns the value bound to `key` in this view.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&'a V> {
        self.map
            .tree
            .find(self.version, key)
            .ok()
            .map(|entry| &entry.value)
    }

    /// Returns the value bound to `key` in this view, falling back to
    /// the map's default value when the key is absent.
    #[must_use]
    pub fn get_or_default(&self, key: &K) -> Option<&'a V> {
        self.get(key).or(self.map.default_value.as_ref())
    }

    /// Returns the value bound to `key` in this view.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotFound`] if the key is absent in this
    /// view; the default value does not apply here.
    pub fn fetch(&self, key: &K) -> Result<&'a V, TreeError> {
        self.map
            .tree
            .find(self.version, key)
            .map(|entry| &entry.value)
    }

    /// Tests whether `key` is bound in this view.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.tree.contains(self.version, key).unwrap_or(false)
    }
}

impl<'a, K, V> IntoIterator for MapView<'a, K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = MapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for MapView<'_, K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MapView")
            .field("version", &self.version)
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over the `(key, value)` pairs of one version, in ascending
/// key order.
pub struct MapIterator<'a, K, V> {
    inner: Option<InOrderIterator<'a, MapEntry<K, V>>>,
}

impl<'a, K, V> Iterator for MapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .as_mut()?
            .next()
            .map(|entry| (&entry.key, &entry.value))
    }
}

impl<K, V> FusedIterator for MapIterator<'_, K, V> {}

/// Iterator over the keys of one version, in ascending order.
pub struct MapKeysIterator<'a, K, V> {
    inner: MapIterator<'a, K, V>,
}

impl<'a, K, V> Iterator for MapKeysIterator<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

impl<K, V> FusedIterator for MapKeysIterator<'_, K, V> {}

/// Iterator over the values of one version, in ascending key order.
pub struct MapValuesIterator<'a, K, V> {
    inner: MapIterator<'a, K, V>,
}

impl<'a, K, V> Iterator for MapValuesIterator<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }
}

impl<K, V> FusedIterator for MapValuesIterator<'_, K, V> {}
