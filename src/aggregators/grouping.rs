//! Group-by: classify elements by key and aggregate each group with a downstream.
//!
//! Keys are created lazily: a group exists only once an element maps to it.
//! Every group gets its own downstream accumulator, so the downstream sees the
//! group's elements in encounter order. Merging two partial results combines
//! the accumulators of shared keys with the downstream combiner and moves the
//! rest across unchanged; finishing rebinds the container to the downstream's
//! result type.
//!
//! ```
//! use std::collections::HashMap;
//! use ironfold::{group_by, group_by_with, counting};
//!
//! let by_mod3 = group_by(|x: &i32| x % 3).aggregate(1..=6)?;
//! assert_eq!(by_mod3, HashMap::from([(0, vec![3, 6]), (1, vec![1, 4]), (2, vec![2, 5])]));
//!
//! let lengths = group_by_with(|w: &&str| w.len(), counting()).aggregate(["a", "bb", "c"])?;
//! assert_eq!(lengths, HashMap::from([(1, 2), (2, 1)]));
//! # anyhow::Result::<()>::Ok(())
//! ```

use super::collections::to_list;
use crate::aggregator::{Aggregator, SharedAccumulateFn};
use crate::characteristics::Characteristics;
use crate::containers::ResultMap;
use anyhow::Result;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Group elements into lists, keyed by `classifier(element)`.
pub fn group_by<T, K, F>(classifier: F) -> Aggregator<T, HashMap<K, Vec<T>>, HashMap<K, Vec<T>>>
where
    T: 'static,
    K: Eq + Hash + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    group_by_into(classifier, HashMap::new, to_list())
}

/// Group elements by key, aggregating each group with `downstream`.
pub fn group_by_with<T, K, A, D, F>(
    classifier: F,
    downstream: Aggregator<T, A, D>,
) -> Aggregator<T, HashMap<K, A>, HashMap<K, D>>
where
    T: 'static,
    K: Eq + Hash + 'static,
    A: 'static,
    D: 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    group_by_into(classifier, HashMap::new, downstream)
}

/// Group elements by key into the container `factory` creates.
///
/// Declares `UNORDERED` unless the container preserves insertion order, and
/// `IDENTITY_FINISH` when the downstream does.
pub fn group_by_into<T, K, A, D, M, F, S>(
    classifier: F,
    factory: S,
    downstream: Aggregator<T, A, D>,
) -> Aggregator<T, M, M::Rebind<D>>
where
    T: 'static,
    K: 'static,
    A: 'static,
    D: 'static,
    M: ResultMap<K, A> + 'static,
    M::Rebind<D>: 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
    S: Fn() -> M + Send + Sync + 'static,
{
    let mut characteristics = Characteristics::empty();
    characteristics.set(Characteristics::UNORDERED, !M::PRESERVES_ORDER);
    characteristics.set(
        Characteristics::IDENTITY_FINISH,
        downstream.has(Characteristics::IDENTITY_FINISH),
    );
    build(Arc::new(classifier), factory, downstream, None, characteristics)
}

/// The sequential half of every group-by: exclusive accumulation, key-wise
/// merge and the value-rebinding finish.
fn build<T, K, A, D, M, F, S>(
    classifier: Arc<F>,
    factory: S,
    downstream: Aggregator<T, A, D>,
    shared: Option<SharedAccumulateFn<M, T>>,
    characteristics: Characteristics,
) -> Aggregator<T, M, M::Rebind<D>>
where
    T: 'static,
    K: 'static,
    A: 'static,
    D: 'static,
    M: ResultMap<K, A> + 'static,
    M::Rebind<D>: 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
    S: Fn() -> M + Send + Sync + 'static,
{
    let accumulator = {
        let down = downstream.clone();
        move |groups: &mut M, item: T| -> Result<()> {
            let key = classifier(&item);
            groups.update(key, || down.create_state(), |acc| down.accumulate(acc, item))
        }
    };
    let combiner = {
        let down = downstream.clone();
        move |groups: &mut M, other: M| -> Result<()> {
            for (key, acc) in other {
                groups.insert_or_merge(key, acc, |_, left, right| down.combine(left, right))?;
            }
            Ok(())
        }
    };
    let finisher = move |groups: M| groups.try_map_values(|acc| downstream.finish(acc));

    let exclusive = characteristics.difference(Characteristics::CONCURRENT);
    let mut agg = Aggregator::try_of(factory, accumulator, combiner, finisher, exclusive);
    if shared.is_some() {
        agg.shared = shared;
        agg.characteristics = characteristics;
    }
    agg
}

#[cfg(feature = "concurrent")]
pub use concurrent::{group_by_concurrent, group_by_concurrent_into, group_by_concurrent_with};

#[cfg(feature = "concurrent")]
mod concurrent {
    use super::build;
    use crate::aggregator::{Aggregator, SharedAccumulateFn};
    use crate::aggregators::to_list;
    use crate::characteristics::Characteristics;
    use crate::containers::ConcurrentResultMap;
    use dashmap::DashMap;
    use std::hash::Hash;
    use std::sync::Arc;

    /// Concurrent group-by into lists, backed by a [`DashMap`].
    pub fn group_by_concurrent<T, K, F>(
        classifier: F,
    ) -> Aggregator<T, DashMap<K, Vec<T>>, DashMap<K, Vec<T>>>
    where
        T: Send + Sync + 'static,
        K: Eq + Hash + Send + Sync + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        group_by_concurrent_into(classifier, DashMap::new, to_list())
    }

    /// Concurrent group-by with a downstream, backed by a [`DashMap`].
    pub fn group_by_concurrent_with<T, K, A, D, F>(
        classifier: F,
        downstream: Aggregator<T, A, D>,
    ) -> Aggregator<T, DashMap<K, A>, DashMap<K, D>>
    where
        T: 'static,
        K: Eq + Hash + Send + Sync + 'static,
        A: Send + Sync + 'static,
        D: 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        group_by_concurrent_into(classifier, DashMap::new, downstream)
    }

    /// Group-by whose accumulator many threads may fill at once.
    ///
    /// Always `UNORDERED`, and `IDENTITY_FINISH` when the downstream is.
    /// Declares `CONCURRENT` only when `downstream` is
    /// concurrent too; then elements of the same key are folded into the
    /// group's accumulator through the downstream's shared path. Otherwise the
    /// shared path still exists, serializing each key's accumulator behind the
    /// container's per-key lock, but the runner will not use it unasked.
    pub fn group_by_concurrent_into<T, K, A, D, M, F, S>(
        classifier: F,
        factory: S,
        downstream: Aggregator<T, A, D>,
    ) -> Aggregator<T, M, M::Rebind<D>>
    where
        T: 'static,
        K: 'static,
        A: 'static,
        D: 'static,
        M: ConcurrentResultMap<K, A> + 'static,
        M::Rebind<D>: 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
        S: Fn() -> M + Send + Sync + 'static,
    {
        let classifier = Arc::new(classifier);
        let concurrent = downstream.is_concurrent();
        let mut characteristics = Characteristics::UNORDERED;
        characteristics.set(Characteristics::CONCURRENT, concurrent);
        characteristics.set(
            Characteristics::IDENTITY_FINISH,
            downstream.has(Characteristics::IDENTITY_FINISH),
        );

        let shared: SharedAccumulateFn<M, T> = {
            let classifier = Arc::clone(&classifier);
            let down = downstream.clone();
            if concurrent {
                Arc::new(move |groups: &M, item: T| {
                    let key = classifier(&item);
                    groups.read_shared(
                        key,
                        || down.create_state(),
                        |acc| down.accumulate_shared(acc, item),
                    )
                })
            } else {
                Arc::new(move |groups: &M, item: T| {
                    let key = classifier(&item);
                    groups.update_shared(
                        key,
                        || down.create_state(),
                        |acc| down.accumulate(acc, item),
                    )
                })
            }
        };

        build(classifier, factory, downstream, Some(shared), characteristics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregators::{counting, mapping, summing};
    use indexmap::IndexMap;
    use std::collections::BTreeMap;

    #[test]
    fn groups_only_keys_that_occur() -> Result<()> {
        let agg = group_by(|x: &i32| *x);
        assert!(agg.aggregate(Vec::new())?.is_empty());
        let groups = agg.aggregate(vec![5, 5])?;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&5], vec![5, 5]);
        Ok(())
    }

    #[test]
    fn merge_combines_shared_keys_with_downstream() -> Result<()> {
        let agg = group_by_with(|x: &i32| x % 2, summing(|x: i32| x));
        let left = agg.fold(vec![1, 2, 3])?;
        let right = agg.fold(vec![4, 5, 7])?;
        let merged = agg.finish(agg.combine(left, right)?)?;
        assert_eq!(merged, HashMap::from([(0, 6), (1, 16)]));
        Ok(())
    }

    #[test]
    fn ordered_container_is_not_unordered() -> Result<()> {
        let agg = group_by_into(|s: &&str| s.len(), IndexMap::new, counting());
        assert!(!agg.is_unordered());
        let out = agg.aggregate(["ccc", "a", "bb", "dd"])?;
        let keys: Vec<_> = out.keys().copied().collect();
        assert_eq!(keys, vec![3, 1, 2]);

        let hashed = group_by(|x: &i32| *x);
        assert!(hashed.is_unordered());
        Ok(())
    }

    #[test]
    fn identity_finish_follows_downstream() -> Result<()> {
        let agg = group_by_into(|x: &u8| *x % 2, BTreeMap::new, to_list());
        assert!(agg.has(Characteristics::IDENTITY_FINISH));
        let acc = agg.fold([1, 2, 3])?;
        assert_eq!(agg.finish_or_identity(acc)?, BTreeMap::from([(0, vec![2]), (1, vec![1, 3])]));

        let lengths = to_list::<u8>().and_then(|v| v.len());
        let sized = group_by_into(|x: &u8| *x, BTreeMap::new, lengths);
        assert!(!sized.has(Characteristics::IDENTITY_FINISH));
        Ok(())
    }

    #[test]
    fn two_level_grouping() -> Result<()> {
        let agg = group_by_into(
            |x: &i32| x % 2,
            BTreeMap::new,
            group_by_into(|x: &i32| x % 3, BTreeMap::new, mapping(|x: i32| x * 10, to_list())),
        );
        let out = agg.aggregate(1..=6)?;
        assert_eq!(out[&0][&0], vec![60]);
        assert_eq!(out[&1][&1], vec![10]);
        assert_eq!(out[&1].len(), 3);
        Ok(())
    }

    #[test]
    fn downstream_errors_abort_grouping() {
        let failing: Aggregator<i32, (), ()> = Aggregator::try_of(
            || (),
            |_, x| {
                anyhow::ensure!(x != 3, "rejected {x}");
                Ok(())
            },
            |_, _| Ok(()),
            Ok,
            Characteristics::empty(),
        );
        let agg = group_by_with(|x: &i32| *x, failing);
        assert!(agg.aggregate(1..=5).is_err());
    }

    #[cfg(feature = "concurrent")]
    mod concurrent {
        use super::*;
        use crate::aggregators::to_concurrent_map;
        use dashmap::DashMap;
        use std::thread;

        #[test]
        fn concurrent_group_by_over_plain_downstream_is_not_concurrent() -> Result<()> {
            let agg = group_by_concurrent(|x: &i32| x % 3);
            assert!(agg.is_unordered());
            assert!(!agg.is_concurrent());
            assert!(agg.supports_shared_accumulation());

            let groups = agg.create_state();
            thread::scope(|s| {
                for chunk in [vec![1, 2, 3], vec![4, 5, 6]] {
                    let agg = &agg;
                    let groups = &groups;
                    s.spawn(move || {
                        chunk
                            .into_iter()
                            .try_for_each(|x| agg.accumulate_shared(groups, x))
                    });
                }
            });
            let out = agg.finish(groups)?;
            let mut zeros = out.get(&0).map(|g| g.value().clone()).unwrap_or_default();
            zeros.sort_unstable();
            assert_eq!(zeros, vec![3, 6]);
            Ok(())
        }

        #[test]
        fn concurrent_downstream_makes_group_by_concurrent() -> Result<()> {
            let agg = group_by_concurrent_with(
                |w: &&str| w.len(),
                to_concurrent_map(|w: &&str| w.chars().next(), |_| 1u32, |a, b| a + b),
            );
            assert!(agg.is_concurrent());
            let groups: DashMap<usize, DashMap<Option<char>, u32>> = agg.create_state();
            for w in ["ab", "ac", "b", "bd"] {
                agg.accumulate_shared(&groups, w)?;
            }
            let out = agg.finish(groups)?;
            let twos = out.get(&2).map(|m| m.get(&Some('a')).map(|v| *v));
            assert_eq!(twos, Some(Some(2)));
            Ok(())
        }
    }
}
