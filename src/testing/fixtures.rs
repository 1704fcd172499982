//! Pre-built integer datasets.
//!
//! The same shapes an aggregator has to handle correctly whatever its
//! execution mode: nothing at all, one element, long ascending and descending
//! runs, and inputs where every value occurs more than once.

use super::builders::TestDataBuilder;

#[must_use]
pub fn empty_data() -> Vec<i32> {
    Vec::new()
}

#[must_use]
pub fn singleton_data() -> Vec<i32> {
    vec![1]
}

/// `0..n`, ascending.
#[must_use]
pub fn ascending_data(n: i32) -> Vec<i32> {
    (0..n).collect()
}

/// `0..n`, descending.
#[must_use]
pub fn descending_data(n: i32) -> Vec<i32> {
    (0..n).rev().collect()
}

/// `0..n` twice over, so every value is a duplicate.
#[must_use]
pub fn duplicated_data(n: i32) -> Vec<i32> {
    TestDataBuilder::new()
        .add_values(0..n)
        .doubled()
        .build()
}

/// Every fixture, named, for table-driven tests.
///
/// # Example
///
/// ```
/// use ironfold::counting;
/// use ironfold::testing::standard_datasets;
///
/// for (name, data) in standard_datasets() {
///     let n = counting().aggregate(data.clone()).unwrap();
///     assert_eq!(n as usize, data.len(), "{name}");
/// }
/// ```
#[must_use]
pub fn standard_datasets() -> Vec<(&'static str, Vec<i32>)> {
    vec![
        ("empty", empty_data()),
        ("singleton", singleton_data()),
        ("ascending-10", ascending_data(10)),
        ("descending-10", descending_data(10)),
        ("ascending-1000", ascending_data(1000)),
        ("descending-1000", descending_data(1000)),
        ("duplicated-100", duplicated_data(100)),
    ]
}

/// `true` when `data` holds some value more than once.
#[must_use]
pub fn has_duplicates(data: &[i32]) -> bool {
    let mut seen = std::collections::HashSet::with_capacity(data.len());
    !data.iter().all(|x| seen.insert(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_duplicated_fixture_repeats_values() {
        for (name, data) in standard_datasets() {
            assert_eq!(has_duplicates(&data), name.starts_with("duplicated"), "{name}");
        }
    }
}
