//! Assertion functions for aggregation results.

use crate::aggregator::Aggregator;
use crate::runner::{ExecMode, Runner};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that `actual` and `expected` hold the same elements in the same order.
///
/// # Panics
///
/// Panics at the first differing position, or on a length mismatch.
///
/// # Example
///
/// ```
/// use ironfold::testing::assert_collections_equal;
///
/// assert_collections_equal(&["a", "b"], &["a", "b"]);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    if let Some(i) = actual.iter().zip(expected).position(|(a, e)| a != e) {
        panic!(
            "Collection mismatch at index {i}: expected {:?}, got {:?}\n  Expected: {expected:?}\n  Actual: {actual:?}",
            expected[i], actual[i]
        );
    }
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that `actual` and `expected` are equal as multisets: order is
/// ignored, multiplicity is not.
///
/// # Panics
///
/// Panics listing the elements that occur more often on one side.
///
/// # Example
///
/// ```
/// use ironfold::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 1, 2], &[1, 2, 3, 1]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    let mut balance: HashMap<&T, isize> = HashMap::new();
    for x in expected {
        *balance.entry(x).or_default() += 1;
    }
    for x in actual {
        *balance.entry(x).or_default() -= 1;
    }
    let missing: Vec<_> = balance.iter().filter(|(_, n)| **n > 0).map(|(x, _)| *x).collect();
    let extra: Vec<_> = balance.iter().filter(|(_, n)| **n < 0).map(|(x, _)| *x).collect();
    assert!(
        missing.is_empty() && extra.is_empty(),
        "Collection content mismatch:\n  Missing: {missing:?}\n  Extra: {extra:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that two key/value containers hold the same entries, whatever
/// container type or iteration order each uses.
///
/// # Panics
///
/// Panics on a missing key, an unexpected key, a differing value, or a
/// key that occurs twice on either side.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use ironfold::testing::assert_maps_unordered_equal;
///
/// let actual = HashMap::from([("b", 2), ("a", 1)]);
/// assert_maps_unordered_equal(actual, [("a", 1), ("b", 2)]);
/// ```
pub fn assert_maps_unordered_equal<K, V, L, R>(actual: L, expected: R)
where
    K: Debug + Ord,
    V: Debug + PartialEq,
    L: IntoIterator<Item = (K, V)>,
    R: IntoIterator<Item = (K, V)>,
{
    let actual = sorted_entries(actual, "actual");
    let expected = sorted_entries(expected, "expected");

    for (key, expected_value) in &expected {
        match actual.get(key) {
            Some(actual_value) if actual_value == expected_value => {}
            Some(actual_value) => panic!(
                "Map value mismatch for key {key:?}:\n  Expected: {expected_value:?}\n  Actual: {actual_value:?}"
            ),
            None => panic!(
                "Map missing key: {key:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
            ),
        }
    }
    let extra: Vec<_> = actual.keys().filter(|k| !expected.contains_key(k)).collect();
    assert!(
        extra.is_empty(),
        "Map has unexpected keys: {extra:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

fn sorted_entries<K: Debug + Ord, V>(
    entries: impl IntoIterator<Item = (K, V)>,
    side: &str,
) -> BTreeMap<K, V> {
    let mut out = BTreeMap::new();
    for (key, value) in entries {
        assert!(!out.contains_key(&key), "Key {key:?} occurs twice in {side} map");
        out.insert(key, value);
    }
    out
}

/// Run `agg` over `items` sequentially, partition-and-merge in parallel, and
/// concurrently, and assert that all three results are equal.
///
/// Several partition counts and merge fanouts are tried so that both the
/// single-element and the uneven-partition edge cases are covered. Returns the
/// sequential result.
///
/// # Panics
///
/// Panics if any run fails or if any result differs from the sequential one.
pub fn assert_modes_agree<I, A, O>(agg: &Aggregator<I, A, O>, items: &[I]) -> O
where
    I: Clone + Send,
    A: Send + Sync,
    O: Debug + PartialEq + Send,
{
    let expected = match Runner::new(ExecMode::Sequential).run(agg, items.to_vec()) {
        Ok(out) => out,
        Err(e) => panic!("Sequential run failed: {e:#}"),
    };

    let mut runners = Vec::new();
    for partitions in [1, 2, 3, 7] {
        for fanout in [None, Some(2)] {
            runners.push(Runner {
                mode: ExecMode::Parallel {
                    threads: None,
                    partitions: Some(partitions),
                },
                fanout,
                ..Runner::default()
            });
        }
        runners.push(Runner::new(ExecMode::Concurrent {
            threads: None,
            partitions: Some(partitions),
        }));
    }

    for runner in runners {
        match runner.run(agg, items.to_vec()) {
            Ok(actual) => assert_eq!(
                actual, expected,
                "Execution modes disagree:\n  Mode: {:?} (fanout {:?})\n  Sequential: {expected:?}\n  This mode: {actual:?}",
                runner.mode, runner.fanout
            ),
            Err(e) => panic!("Run failed in mode {:?}: {e:#}", runner.mode),
        }
    }
    expected
}
