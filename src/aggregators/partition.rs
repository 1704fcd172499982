//! Partition-by: split elements into exactly two groups by a predicate.

use super::collections::to_list;
use crate::aggregator::Aggregator;
use crate::characteristics::Characteristics;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

/// A result keyed by `true` and `false`.
///
/// Both keys are always present, even when no element satisfied (or failed)
/// the predicate: the missing side then holds the downstream's empty result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partitioned<T> {
    /// Elements for which the predicate held.
    pub matched: T,
    /// Everything else.
    pub rest: T,
}

impl<T> Partitioned<T> {
    pub const fn new(matched: T, rest: T) -> Self {
        Self { matched, rest }
    }

    pub const fn get(&self, key: bool) -> &T {
        if key { &self.matched } else { &self.rest }
    }

    pub fn get_mut(&mut self, key: bool) -> &mut T {
        if key { &mut self.matched } else { &mut self.rest }
    }

    /// Always 2.
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        2
    }

    /// `(true, matched)` then `(false, rest)`.
    pub fn iter(&self) -> impl Iterator<Item = (bool, &T)> {
        [(true, &self.matched), (false, &self.rest)].into_iter()
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Partitioned<U> {
        Partitioned {
            matched: f(self.matched),
            rest: f(self.rest),
        }
    }

    /// # Errors
    /// The first error returned by `f`, `true` side first.
    pub fn try_map<U>(self, mut f: impl FnMut(T) -> Result<U>) -> Result<Partitioned<U>> {
        Ok(Partitioned {
            matched: f(self.matched)?,
            rest: f(self.rest)?,
        })
    }

    pub fn into_map(self) -> HashMap<bool, T> {
        HashMap::from(<[(bool, T); 2]>::from(self))
    }
}

impl<T> From<Partitioned<T>> for [(bool, T); 2] {
    fn from(p: Partitioned<T>) -> Self {
        [(true, p.matched), (false, p.rest)]
    }
}

impl<T> IntoIterator for Partitioned<T> {
    type Item = (bool, T);
    type IntoIter = std::array::IntoIter<(bool, T), 2>;

    fn into_iter(self) -> Self::IntoIter {
        <[(bool, T); 2]>::from(self).into_iter()
    }
}

impl<T> Index<bool> for Partitioned<T> {
    type Output = T;

    fn index(&self, key: bool) -> &T {
        self.get(key)
    }
}

/// Split elements into those matching `predicate` and the rest, as lists.
///
/// ```
/// use ironfold::partition_by;
///
/// let parts = partition_by(|x: &i32| *x > 2).aggregate(vec![1, 2, 3, 4])?;
/// assert_eq!(parts[true], vec![3, 4]);
/// assert_eq!(parts[false], vec![1, 2]);
///
/// let none = partition_by(|x: &i32| *x > 2).aggregate(Vec::new())?;
/// assert_eq!(none.into_map().len(), 2);
/// # anyhow::Result::<()>::Ok(())
/// ```
pub fn partition_by<T, P>(predicate: P) -> Aggregator<T, Partitioned<Vec<T>>, Partitioned<Vec<T>>>
where
    T: 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    partition_by_with(predicate, to_list())
}

/// Split elements by `predicate`, aggregating each side with `downstream`.
///
/// Never `CONCURRENT`. `UNORDERED` and `IDENTITY_FINISH` are inherited from
/// the downstream.
pub fn partition_by_with<T, A, D, P>(
    predicate: P,
    downstream: Aggregator<T, A, D>,
) -> Aggregator<T, Partitioned<A>, Partitioned<D>>
where
    T: 'static,
    A: 'static,
    D: 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    let mut characteristics = Characteristics::empty();
    characteristics.set(Characteristics::UNORDERED, downstream.is_unordered());
    characteristics.set(
        Characteristics::IDENTITY_FINISH,
        downstream.has(Characteristics::IDENTITY_FINISH),
    );

    let supplier = {
        let down = downstream.clone();
        move || Partitioned::new(down.create_state(), down.create_state())
    };
    let accumulator = {
        let down = downstream.clone();
        move |parts: &mut Partitioned<A>, item: T| {
            let side = predicate(&item);
            down.accumulate(parts.get_mut(side), item)
        }
    };
    let combiner = {
        let down = downstream.clone();
        move |parts: &mut Partitioned<A>, other: Partitioned<A>| {
            down.combine_into(&mut parts.matched, other.matched)?;
            down.combine_into(&mut parts.rest, other.rest)
        }
    };
    let finisher = move |parts: Partitioned<A>| parts.try_map(|acc| downstream.finish(acc));

    Aggregator::try_of(supplier, accumulator, combiner, finisher, characteristics)
}
