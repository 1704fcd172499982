//! Result containers for the map-building aggregators.
//!
//! Group-by and to-map are written once against [`ResultMap`]; the concurrent
//! variants additionally require [`ConcurrentResultMap`], whose operations take
//! `&self` and are atomic per key. The concrete container is fixed by the
//! factory's return type, so no runtime class checks are needed.
//!
//! Implementations are provided for:
//!
//! | container          | insertion order | concurrent |
//! |--------------------|-----------------|------------|
//! | `HashMap<K, V>`    | no              | no         |
//! | `BTreeMap<K, V>`   | no (sorted)     | no         |
//! | `IndexMap<K, V>`   | yes             | no         |
//! | `DashMap<K, V>`    | no              | yes        |

use anyhow::Result;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// A mutable key/value container an aggregation run can own.
pub trait ResultMap<K, V>: IntoIterator<Item = (K, V)> + Sized {
    /// The same container kind holding `W` values (the finished output).
    type Rebind<W>;

    /// Whether iteration order follows insertion order.
    const PRESERVES_ORDER: bool;

    /// Run `f` on the value stored under `key`, inserting `create()` first if
    /// the key is absent.
    fn update<R>(&mut self, key: K, create: impl FnOnce() -> V, f: impl FnOnce(&mut V) -> R) -> R;

    /// Store `value` under `key`; if the key is present, store
    /// `merge(&key, existing, value)` instead.
    ///
    /// # Errors
    /// Whatever `merge` returns; the aggregation is aborted in that case.
    fn insert_or_merge<F>(&mut self, key: K, value: V, merge: F) -> Result<()>
    where
        F: FnOnce(&K, V, V) -> Result<V>;

    /// Rebuild the container with every value transformed by `f`.
    ///
    /// # Errors
    /// The first error returned by `f`.
    fn try_map_values<W, F>(self, f: F) -> Result<Self::Rebind<W>>
    where
        F: FnMut(V) -> Result<W>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A [`ResultMap`] that supports atomic insert-if-absent from many threads.
pub trait ConcurrentResultMap<K, V>: ResultMap<K, V> + Send + Sync {
    /// Atomically insert `create()` if `key` is absent, then run `f` with
    /// exclusive access to the value. Different keys may proceed in parallel.
    fn update_shared<R>(&self, key: K, create: impl FnOnce() -> V, f: impl FnOnce(&mut V) -> R)
    -> R;

    /// Like [`update_shared`](Self::update_shared), but `f` only gets shared
    /// access, so callers working on the same key may run together. The value
    /// must synchronize its own mutation.
    fn read_shared<R>(&self, key: K, create: impl FnOnce() -> V, f: impl FnOnce(&V) -> R) -> R;

    /// Store `value` under `key`, or replace the stored value with
    /// `merge(existing, value)`, atomically with respect to other writers.
    ///
    /// The `DashMap` implementation merges in place through `DashMap::alter`,
    /// so a panicking `merge` aborts the process instead of unwinding.
    fn insert_or_merge_shared<F>(&self, key: K, value: V, merge: F)
    where
        F: FnOnce(V, V) -> V;
}

impl<K, V> ResultMap<K, V> for HashMap<K, V>
where
    K: Eq + Hash,
{
    type Rebind<W> = HashMap<K, W>;
    const PRESERVES_ORDER: bool = false;

    fn update<R>(&mut self, key: K, create: impl FnOnce() -> V, f: impl FnOnce(&mut V) -> R) -> R {
        f(self.entry(key).or_insert_with(create))
    }

    fn insert_or_merge<F>(&mut self, key: K, value: V, merge: F) -> Result<()>
    where
        F: FnOnce(&K, V, V) -> Result<V>,
    {
        match self.remove_entry(&key) {
            Some((key, existing)) => {
                let merged = merge(&key, existing, value)?;
                self.insert(key, merged);
            }
            None => {
                self.insert(key, value);
            }
        }
        Ok(())
    }

    fn try_map_values<W, F>(self, mut f: F) -> Result<HashMap<K, W>>
    where
        F: FnMut(V) -> Result<W>,
    {
        self.into_iter().map(|(k, v)| Ok((k, f(v)?))).collect()
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

impl<K, V> ResultMap<K, V> for BTreeMap<K, V>
where
    K: Ord,
{
    type Rebind<W> = BTreeMap<K, W>;
    const PRESERVES_ORDER: bool = false;

    fn update<R>(&mut self, key: K, create: impl FnOnce() -> V, f: impl FnOnce(&mut V) -> R) -> R {
        f(self.entry(key).or_insert_with(create))
    }

    fn insert_or_merge<F>(&mut self, key: K, value: V, merge: F) -> Result<()>
    where
        F: FnOnce(&K, V, V) -> Result<V>,
    {
        match self.remove_entry(&key) {
            Some((key, existing)) => {
                let merged = merge(&key, existing, value)?;
                self.insert(key, merged);
            }
            None => {
                self.insert(key, value);
            }
        }
        Ok(())
    }

    fn try_map_values<W, F>(self, mut f: F) -> Result<BTreeMap<K, W>>
    where
        F: FnMut(V) -> Result<W>,
    {
        self.into_iter().map(|(k, v)| Ok((k, f(v)?))).collect()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

impl<K, V> ResultMap<K, V> for IndexMap<K, V>
where
    K: Eq + Hash,
{
    type Rebind<W> = IndexMap<K, W>;
    const PRESERVES_ORDER: bool = true;

    fn update<R>(&mut self, key: K, create: impl FnOnce() -> V, f: impl FnOnce(&mut V) -> R) -> R {
        f(self.entry(key).or_insert_with(create))
    }

    // A collision keeps the key at its first-insertion position.
    fn insert_or_merge<F>(&mut self, key: K, value: V, merge: F) -> Result<()>
    where
        F: FnOnce(&K, V, V) -> Result<V>,
    {
        match self.swap_remove_full(&key) {
            Some((index, key, existing)) => {
                let merged = merge(&key, existing, value)?;
                self.insert(key, merged);
                let last = self.len() - 1;
                self.swap_indices(index, last);
            }
            None => {
                self.insert(key, value);
            }
        }
        Ok(())
    }

    fn try_map_values<W, F>(self, mut f: F) -> Result<IndexMap<K, W>>
    where
        F: FnMut(V) -> Result<W>,
    {
        self.into_iter().map(|(k, v)| Ok((k, f(v)?))).collect()
    }

    fn len(&self) -> usize {
        IndexMap::len(self)
    }
}

#[cfg(feature = "concurrent")]
mod concurrent {
    use super::{ConcurrentResultMap, ResultMap};
    use anyhow::Result;
    use dashmap::DashMap;
    use dashmap::mapref::entry::Entry;
    use std::hash::Hash;

    impl<K, V> ResultMap<K, V> for DashMap<K, V>
    where
        K: Eq + Hash,
    {
        type Rebind<W> = DashMap<K, W>;
        const PRESERVES_ORDER: bool = false;

        fn update<R>(
            &mut self,
            key: K,
            create: impl FnOnce() -> V,
            f: impl FnOnce(&mut V) -> R,
        ) -> R {
            f(&mut self.entry(key).or_insert_with(create))
        }

        fn insert_or_merge<F>(&mut self, key: K, value: V, merge: F) -> Result<()>
        where
            F: FnOnce(&K, V, V) -> Result<V>,
        {
            match self.remove(&key) {
                Some((key, existing)) => {
                    let merged = merge(&key, existing, value)?;
                    self.insert(key, merged);
                }
                None => {
                    self.insert(key, value);
                }
            }
            Ok(())
        }

        fn try_map_values<W, F>(self, mut f: F) -> Result<DashMap<K, W>>
        where
            F: FnMut(V) -> Result<W>,
        {
            self.into_iter().map(|(k, v)| Ok((k, f(v)?))).collect()
        }

        fn len(&self) -> usize {
            DashMap::len(self)
        }
    }

    impl<K, V> ConcurrentResultMap<K, V> for DashMap<K, V>
    where
        K: Eq + Hash + Send + Sync,
        V: Send + Sync,
    {
        fn update_shared<R>(
            &self,
            key: K,
            create: impl FnOnce() -> V,
            f: impl FnOnce(&mut V) -> R,
        ) -> R {
            // The entry guard holds the shard lock for the duration of `f`.
            f(&mut self.entry(key).or_insert_with(create))
        }

        fn read_shared<R>(&self, key: K, create: impl FnOnce() -> V, f: impl FnOnce(&V) -> R) -> R {
            let value = self.entry(key).or_insert_with(create).downgrade();
            f(&value)
        }

        fn insert_or_merge_shared<F>(&self, key: K, value: V, merge: F)
        where
            F: FnOnce(V, V) -> V,
        {
            match self.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(slot) => {
                    // Keys are never removed while accumulating, so the key is
                    // still present once the entry lock is released.
                    let key = slot.into_key();
                    self.alter(&key, |_, existing| merge(existing, value));
                }
            }
        }
    }
}
