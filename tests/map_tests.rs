//! Unit tests for the key-value wrapper.

use chronotree::{TreeError, VersionedMap};
use rstest::rstest;

// =============================================================================
// Basic Construction Tests
// =============================================================================

#[rstest]
fn test_new_map_is_empty_at_version_zero() {
    let map: VersionedMap<i32, String> = VersionedMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.version(), 0);
}

#[rstest]
fn test_default_map_is_empty() {
    let map: VersionedMap<i32, String> = VersionedMap::default();
    assert!(map.is_empty());
}

// =============================================================================
// Insert and Get Tests
// =============================================================================

#[rstest]
fn test_insert_and_get() {
    let mut map = VersionedMap::new();
    assert_eq!(map.insert("one", 1), Ok(1));
    assert_eq!(map.insert("two", 2), Ok(2));

    assert_eq!(map.get(&"one"), Some(&1));
    assert_eq!(map.get(&"two"), Some(&2));
    assert_eq!(map.get(&"three"), None);
    assert_eq!(map.len(), 2);
}

#[rstest]
fn test_rebinding_a_key_publishes_a_new_version() {
    let mut map = VersionedMap::new();
    map.insert("key", 1).unwrap();
    map.insert("key", 2).unwrap();

    assert_eq!(map.version(), 2);
    assert_eq!(map.get(&"key"), Some(&2));
    assert_eq!(map.len(), 1);
}

#[rstest]
fn test_old_bindings_stay_visible_through_views() {
    let mut map = VersionedMap::new();
    map.insert("a", 1).unwrap();
    map.insert("b", 2).unwrap();
    map.insert("a", 10).unwrap();

    assert_eq!(map.view(1).unwrap().get(&"a"), Some(&1));
    assert_eq!(map.view(2).unwrap().get(&"a"), Some(&1));
    assert_eq!(map.view(3).unwrap().get(&"a"), Some(&10));
    assert_eq!(map.view(1).unwrap().get(&"b"), None);
    assert_eq!(map.view(0).unwrap().len(), 0);
}

// =============================================================================
// Default Value Tests
// =============================================================================

#[rstest]
fn test_get_or_default_falls_back_to_the_stored_default() {
    let mut map = VersionedMap::with_default(0);
    map.insert("hits", 3).unwrap();

    assert_eq!(map.get_or_default(&"hits"), Some(&3));
    assert_eq!(map.get_or_default(&"misses"), Some(&0));
    // Plain get does not apply the default.
    assert_eq!(map.get(&"misses"), None);
}

#[rstest]
fn test_get_or_default_without_a_default_behaves_like_get() {
    let map: VersionedMap<&str, i32> = VersionedMap::new();
    assert_eq!(map.get_or_default(&"anything"), None);
}

#[rstest]
fn test_fetch_ignores_the_default() {
    let map: VersionedMap<&str, i32> = VersionedMap::with_default(0);
    assert_eq!(map.fetch(&"missing"), Err(TreeError::NotFound));
}

// =============================================================================
// Membership Tests
// =============================================================================

#[rstest]
fn test_contains_key_per_version() {
    let mut map = VersionedMap::new();
    map.insert("a", 1).unwrap();
    map.insert("b", 2).unwrap();

    assert!(map.contains_key(&"a"));
    assert!(!map.contains_key(&"c"));
    assert!(!map.view(1).unwrap().contains_key(&"b"));
    assert!(map.view(2).unwrap().contains_key(&"b"));
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[rstest]
fn test_iteration_is_ordered_by_key() {
    let mut map = VersionedMap::new();
    map.insert("cherry", 3).unwrap();
    map.insert("apple", 1).unwrap();
    map.insert("banana", 2).unwrap();

    let pairs: Vec<(&&str, &i32)> = map.iter().collect();
    assert_eq!(
        pairs,
        vec![(&"apple", &1), (&"banana", &2), (&"cherry", &3)]
    );

    let view = map.latest();
    let keys: Vec<&&str> = view.keys().collect();
    assert_eq!(keys, vec![&"apple", &"banana", &"cherry"]);
    let values: Vec<&i32> = view.values().collect();
    assert_eq!(values, vec![&1, &2, &3]);
}

#[rstest]
fn test_view_iteration_reflects_its_version() {
    let mut map = VersionedMap::new();
    map.insert(2, "two").unwrap();
    map.insert(1, "one").unwrap();
    map.insert(3, "three").unwrap();

    let view = map.view(2).unwrap();
    let keys: Vec<&i32> = view.keys().collect();
    assert_eq!(keys, vec![&1, &2]);

    let pairs: Vec<(&i32, &&str)> = view.into_iter().collect();
    assert_eq!(pairs, vec![(&1, &"one"), (&2, &"two")]);
}

#[rstest]
fn test_view_outlives_later_insertions() {
    let mut map = VersionedMap::new();
    map.insert("a", 1).unwrap();
    map.insert("a", 2).unwrap();
    map.insert("a", 3).unwrap();

    // Views pinned to published versions never change.
    for (version, expected) in [(1, 1), (2, 2), (3, 3)] {
        let view = map.view(version).unwrap();
        assert_eq!(view.get(&"a"), Some(&expected));
        assert_eq!(view.version(), version);
    }
}

// =============================================================================
// Collection Protocol Tests
// =============================================================================

#[rstest]
fn test_from_iterator_collects_pairs() {
    let map: VersionedMap<i32, &str> =
        [(2, "two"), (1, "one"), (3, "three")].into_iter().collect();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&1), Some(&"one"));
    // One version per pair.
    assert_eq!(map.version(), 3);
}

#[rstest]
fn test_extend_rebinds_existing_keys() {
    let mut map: VersionedMap<i32, &str> = [(1, "one")].into_iter().collect();
    map.extend([(1, "ONE"), (2, "two")]);
    assert_eq!(map.get(&1), Some(&"ONE"));
    assert_eq!(map.len(), 2);
}

#[rstest]
fn test_debug_formats_latest_bindings() {
    let mut map = VersionedMap::new();
    map.insert(2, "two").unwrap();
    map.insert(1, "one").unwrap();
    assert_eq!(format!("{map:?}"), r#"{1: "one", 2: "two"}"#);
}

// =============================================================================
// Version Validation Tests
// =============================================================================

#[rstest]
fn test_view_of_a_future_version_is_rejected() {
    let mut map = VersionedMap::new();
    map.insert("a", 1).unwrap();
    let result = map.view(2);
    assert_eq!(
        result.err(),
        Some(TreeError::VersionOutOfRange {
            requested: 2,
            current: 1,
        })
    );
}
