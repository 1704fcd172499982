//! Key/value map building with duplicate detection or an explicit merge function.

use crate::aggregator::Aggregator;
use crate::characteristics::Characteristics;
use crate::containers::ResultMap;
use crate::error::AggregateError;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

type Resolve<K, V> = Arc<dyn Fn(&K, V, V) -> Result<V> + Send + Sync>;

/// Map each element to a key and a value; a repeated key fails the run with
/// [`AggregateError::DuplicateKey`](crate::AggregateError::DuplicateKey).
///
/// The key function borrows the element, the value function then consumes it.
///
/// ```
/// use ironfold::{to_map, AggregateError};
///
/// let agg = to_map(|w: &&str| w.len(), |w| w.to_uppercase());
/// let err = agg.aggregate(["ab", "cd"]).unwrap_err();
/// assert!(matches!(
///     err.downcast_ref::<AggregateError>(),
///     Some(AggregateError::DuplicateKey { .. })
/// ));
/// ```
pub fn to_map<T, K, V, FK, FV>(
    key_fn: FK,
    value_fn: FV,
) -> Aggregator<T, HashMap<K, V>, HashMap<K, V>>
where
    T: 'static,
    K: Eq + Hash + Debug + 'static,
    V: Debug + 'static,
    FK: Fn(&T) -> K + Send + Sync + 'static,
    FV: Fn(T) -> V + Send + Sync + 'static,
{
    build(key_fn, value_fn, reject_duplicates(), HashMap::new)
}

/// Like [`to_map`], resolving repeated keys with `merge(existing, incoming)`.
pub fn to_map_merging<T, K, V, FK, FV, FM>(
    key_fn: FK,
    value_fn: FV,
    merge: FM,
) -> Aggregator<T, HashMap<K, V>, HashMap<K, V>>
where
    T: 'static,
    K: Eq + Hash + 'static,
    V: 'static,
    FK: Fn(&T) -> K + Send + Sync + 'static,
    FV: Fn(T) -> V + Send + Sync + 'static,
    FM: Fn(V, V) -> V + Send + Sync + 'static,
{
    to_map_into(key_fn, value_fn, merge, HashMap::new)
}

/// Like [`to_map_merging`], into the container `factory` creates.
pub fn to_map_into<T, K, V, M, FK, FV, FM, S>(
    key_fn: FK,
    value_fn: FV,
    merge: FM,
    factory: S,
) -> Aggregator<T, M, M>
where
    T: 'static,
    K: 'static,
    V: 'static,
    M: ResultMap<K, V> + 'static,
    FK: Fn(&T) -> K + Send + Sync + 'static,
    FV: Fn(T) -> V + Send + Sync + 'static,
    FM: Fn(V, V) -> V + Send + Sync + 'static,
    S: Fn() -> M + Send + Sync + 'static,
{
    let resolve: Resolve<K, V> = Arc::new(move |_: &K, existing: V, incoming: V| -> Result<V> {
        Ok(merge(existing, incoming))
    });
    build(key_fn, value_fn, resolve, factory)
}

fn reject_duplicates<K: Debug + 'static, V: Debug + 'static>() -> Resolve<K, V> {
    Arc::new(|key: &K, existing: V, incoming: V| -> Result<V> {
        Err(AggregateError::duplicate_key(key, &existing, &incoming).into())
    })
}

fn build<T, K, V, M, FK, FV, S>(
    key_fn: FK,
    value_fn: FV,
    resolve: Resolve<K, V>,
    factory: S,
) -> Aggregator<T, M, M>
where
    T: 'static,
    K: 'static,
    V: 'static,
    M: ResultMap<K, V> + 'static,
    FK: Fn(&T) -> K + Send + Sync + 'static,
    FV: Fn(T) -> V + Send + Sync + 'static,
    S: Fn() -> M + Send + Sync + 'static,
{
    let accumulator = {
        let resolve = Arc::clone(&resolve);
        move |map: &mut M, item: T| {
            let key = key_fn(&item);
            map.insert_or_merge(key, value_fn(item), |k, a, b| resolve(k, a, b))
        }
    };
    let combiner = move |map: &mut M, other: M| -> Result<()> {
        for (key, value) in other {
            map.insert_or_merge(key, value, |k, a, b| resolve(k, a, b))?;
        }
        Ok(())
    };
    Aggregator::try_of(factory, accumulator, combiner, Ok, Characteristics::IDENTITY_FINISH)
}

#[cfg(feature = "concurrent")]
pub use concurrent::{to_concurrent_map, to_concurrent_map_into};

#[cfg(feature = "concurrent")]
mod concurrent {
    use crate::aggregator::Aggregator;
    use crate::characteristics::Characteristics;
    use crate::containers::ConcurrentResultMap;
    use anyhow::Result;
    use dashmap::DashMap;
    use std::hash::Hash;
    use std::sync::Arc;

    /// Concurrent map building into a [`DashMap`]; `merge` resolves repeated keys.
    pub fn to_concurrent_map<T, K, V, FK, FV, FM>(
        key_fn: FK,
        value_fn: FV,
        merge: FM,
    ) -> Aggregator<T, DashMap<K, V>, DashMap<K, V>>
    where
        T: 'static,
        K: Eq + Hash + Send + Sync + 'static,
        V: Send + Sync + 'static,
        FK: Fn(&T) -> K + Send + Sync + 'static,
        FV: Fn(T) -> V + Send + Sync + 'static,
        FM: Fn(V, V) -> V + Send + Sync + 'static,
    {
        to_concurrent_map_into(key_fn, value_fn, merge, DashMap::new)
    }

    /// Map building whose accumulator many threads may fill at once.
    ///
    /// Declares `CONCURRENT`, `UNORDERED` and `IDENTITY_FINISH`. Which of two
    /// racing values for a key ends up first in `merge` is unspecified.
    ///
    /// With a `DashMap` container, `merge` runs inside `DashMap::alter` while
    /// accumulating, so a panic in `merge` aborts the process.
    pub fn to_concurrent_map_into<T, K, V, M, FK, FV, FM, S>(
        key_fn: FK,
        value_fn: FV,
        merge: FM,
        factory: S,
    ) -> Aggregator<T, M, M>
    where
        T: 'static,
        K: 'static,
        V: 'static,
        M: ConcurrentResultMap<K, V> + 'static,
        FK: Fn(&T) -> K + Send + Sync + 'static,
        FV: Fn(T) -> V + Send + Sync + 'static,
        FM: Fn(V, V) -> V + Send + Sync + 'static,
        S: Fn() -> M + Send + Sync + 'static,
    {
        let merge = Arc::new(merge);
        let shared = {
            let merge = Arc::clone(&merge);
            move |map: &M, item: T| -> Result<()> {
                let key = key_fn(&item);
                map.insert_or_merge_shared(key, value_fn(item), |a, b| merge(a, b));
                Ok(())
            }
        };
        let combiner = move |map: &mut M, other: M| -> Result<()> {
            for (key, value) in other {
                map.insert_or_merge(key, value, |_, a, b| Ok(merge(a, b)))?;
            }
            Ok(())
        };
        Aggregator::of_concurrent(
            factory,
            shared,
            combiner,
            Ok,
            Characteristics::UNORDERED | Characteristics::IDENTITY_FINISH,
        )
    }
}
