//! Collecting elements into lists, sets and arbitrary `Extend` collections.

use crate::aggregator::Aggregator;
use crate::characteristics::Characteristics;
use std::collections::HashSet;
use std::hash::Hash;
use std::iter;

/// All elements, in encounter order.
pub fn to_list<T: 'static>() -> Aggregator<T, Vec<T>, Vec<T>> {
    Aggregator::of_identity(
        Vec::new,
        |v: &mut Vec<T>, x| v.push(x),
        |v, other| {
            if v.is_empty() {
                *v = other;
            } else {
                v.extend(other);
            }
        },
        Characteristics::empty(),
    )
}

/// Distinct elements; declares `UNORDERED`.
pub fn to_set<T>() -> Aggregator<T, HashSet<T>, HashSet<T>>
where
    T: Eq + Hash + 'static,
{
    Aggregator::of_identity(
        HashSet::new,
        |s: &mut HashSet<T>, x| {
            s.insert(x);
        },
        |s, other| {
            if s.len() < other.len() {
                let smaller = std::mem::replace(s, other);
                s.extend(smaller);
            } else {
                s.extend(other);
            }
        },
        Characteristics::UNORDERED,
    )
}

/// Elements collected into whatever `factory` creates, in encounter order.
///
/// ```
/// use std::collections::BTreeSet;
/// use ironfold::to_collection;
///
/// let sorted = to_collection(BTreeSet::new);
/// let out = sorted.aggregate(vec![3, 1, 2, 3])?;
/// assert_eq!(out.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
/// # anyhow::Result::<()>::Ok(())
/// ```
pub fn to_collection<T, C, S>(factory: S) -> Aggregator<T, C, C>
where
    T: 'static,
    C: Extend<T> + IntoIterator<Item = T> + 'static,
    S: Fn() -> C + Send + Sync + 'static,
{
    Aggregator::of_identity(
        factory,
        |c: &mut C, x| c.extend(iter::once(x)),
        |c, other| c.extend(other),
        Characteristics::empty(),
    )
}
