//! Counting, numeric folds, extrema and reductions.

use super::adapters::mapping;
use crate::aggregator::Aggregator;
use crate::characteristics::Characteristics;
use crate::combiners::{AverageF64, Count, Max, Min, Sum, Summarize, Summary};
use num_traits::AsPrimitive;
use std::cmp::Ordering;
use std::mem;
use std::ops::Add;
use std::sync::Arc;

/// Number of elements, as `u64`.
pub fn counting<T: 'static>() -> Aggregator<T, u64, u64> {
    Aggregator::from_combine_fn(Count)
}

/// Sum of `mapper(element)`; `N::default()` for an empty input.
pub fn summing<T, N, F>(mapper: F) -> Aggregator<T, N, N>
where
    T: 'static,
    N: Add<Output = N> + Default + Send + Sync + 'static,
    F: Fn(T) -> N + Send + Sync + 'static,
{
    mapping(mapper, Aggregator::from_combine_fn(Sum::new()))
}

/// Arithmetic mean of `mapper(element)`; `0.0` for an empty input.
///
/// Any primitive number works, including `i64` and `u64`; values are
/// widened with `as f64`.
pub fn averaging<T, V, F>(mapper: F) -> Aggregator<T, (f64, u64), f64>
where
    T: 'static,
    V: AsPrimitive<f64>,
    F: Fn(T) -> V + Send + Sync + 'static,
{
    mapping(mapper, Aggregator::from_combine_fn(AverageF64))
}

/// Count, sum, minimum and maximum of `mapper(element)` in one pass.
pub fn summarizing<T, V, F>(mapper: F) -> Aggregator<T, Summary, Summary>
where
    T: 'static,
    V: AsPrimitive<f64> + Send + Sync,
    F: Fn(T) -> V + Send + Sync + 'static,
{
    mapping(mapper, Aggregator::from_combine_fn(Summarize::new()))
}

/// Smallest element, `None` when empty.
pub fn minimum<T>() -> Aggregator<T, Option<T>, Option<T>>
where
    T: Ord + Send + Sync + 'static,
{
    Aggregator::from_combine_fn(Min::new())
}

/// Largest element, `None` when empty.
pub fn maximum<T>() -> Aggregator<T, Option<T>, Option<T>>
where
    T: Ord + Send + Sync + 'static,
{
    Aggregator::from_combine_fn(Max::new())
}

/// Smallest element under `compare`; on ties the earlier element wins.
pub fn min_by<T, C>(compare: C) -> Aggregator<T, Option<T>, Option<T>>
where
    T: 'static,
    C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    reducing_opt(move |a, b| if compare(&a, &b) == Ordering::Greater { b } else { a })
}

/// Largest element under `compare`; on ties the earlier element wins.
pub fn max_by<T, C>(compare: C) -> Aggregator<T, Option<T>, Option<T>>
where
    T: 'static,
    C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    reducing_opt(move |a, b| if compare(&a, &b) == Ordering::Less { b } else { a })
}

/// Left fold with `op`, starting from `identity`.
///
/// `identity` seeds every accumulator, so it must be a true identity of `op`
/// for parallel runs to agree with sequential ones.
///
/// Every accumulate and combine step clones `identity` to hold the
/// accumulator's place while `op` runs. For a `T` that is costly to clone,
/// [`reducing_opt`] moves values instead.
///
/// ```
/// use ironfold::reducing;
///
/// let product = reducing(1, |a: i32, b| a * b);
/// assert_eq!(product.aggregate(vec![2, 3, 4])?, 24);
/// assert_eq!(product.aggregate(Vec::new())?, 1);
/// # anyhow::Result::<()>::Ok(())
/// ```
pub fn reducing<T, F>(identity: T, op: F) -> Aggregator<T, T, T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T, T) -> T + Send + Sync + 'static,
{
    let op = Arc::new(op);
    let seed = identity.clone();
    let fold = {
        let op = Arc::clone(&op);
        let identity = identity.clone();
        move |acc: &mut T, x: T| {
            let cur = mem::replace(acc, identity.clone());
            *acc = op(cur, x);
        }
    };
    let merge = move |acc: &mut T, other: T| {
        let cur = mem::replace(acc, identity.clone());
        *acc = op(cur, other);
    };
    Aggregator::of_identity(move || seed.clone(), fold, merge, Characteristics::empty())
}

/// Left fold with `op` and no identity: `None` for an empty input.
pub fn reducing_opt<T, F>(op: F) -> Aggregator<T, Option<T>, Option<T>>
where
    T: 'static,
    F: Fn(T, T) -> T + Send + Sync + 'static,
{
    let op = Arc::new(op);
    let fold = {
        let op = Arc::clone(&op);
        move |acc: &mut Option<T>, x: T| {
            *acc = Some(match acc.take() {
                Some(cur) => op(cur, x),
                None => x,
            });
        }
    };
    let merge = move |acc: &mut Option<T>, other: Option<T>| {
        if let Some(x) = other {
            *acc = Some(match acc.take() {
                Some(cur) => op(cur, x),
                None => x,
            });
        }
    };
    Aggregator::of_identity(|| None, fold, merge, Characteristics::empty())
}

/// [`reducing`] over `mapper(element)`.
pub fn reducing_mapped<T, U, M, F>(identity: U, mapper: M, op: F) -> Aggregator<T, U, U>
where
    T: 'static,
    U: Clone + Send + Sync + 'static,
    M: Fn(T) -> U + Send + Sync + 'static,
    F: Fn(U, U) -> U + Send + Sync + 'static,
{
    mapping(mapper, reducing(identity, op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristics::Characteristics;
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    #[derive(Debug)]
    struct Tally {
        n: u64,
        clones: Arc<AtomicUsize>,
    }

    impl Clone for Tally {
        fn clone(&self) -> Self {
            self.clones.fetch_add(1, AtomicOrdering::SeqCst);
            Self {
                n: self.n,
                clones: Arc::clone(&self.clones),
            }
        }
    }

    fn add(a: Tally, b: Tally) -> Tally {
        Tally {
            n: a.n + b.n,
            clones: a.clones,
        }
    }

    #[test]
    fn identity_clones_once_per_step_and_optional_never() -> Result<()> {
        let clones = Arc::new(AtomicUsize::new(0));
        let tallies = || -> Vec<Tally> {
            (1..=4)
                .map(|n| Tally {
                    n,
                    clones: Arc::clone(&clones),
                })
                .collect()
        };

        let total = reducing_opt(add).aggregate(tallies())?;
        assert_eq!(total.map(|t| t.n), Some(10));
        assert_eq!(clones.load(AtomicOrdering::SeqCst), 0);

        let zero = Tally {
            n: 0,
            clones: Arc::clone(&clones),
        };
        let with_identity = reducing(zero, add);
        let before = clones.load(AtomicOrdering::SeqCst);
        assert_eq!(with_identity.aggregate(tallies())?.n, 10);
        // one for the fresh accumulator, one per element
        assert_eq!(clones.load(AtomicOrdering::SeqCst) - before, 5);
        Ok(())
    }

    #[test]
    fn counting_counts() -> Result<()> {
        let agg = counting::<&str>();
        assert_eq!(agg.aggregate(["a", "b", "c"])?, 3);
        assert_eq!(agg.aggregate(Vec::new())?, 0);
        assert!(agg.is_unordered());
        Ok(())
    }

    #[test]
    fn summing_and_averaging_over_mapped_values() -> Result<()> {
        let words = ["one", "three", "five"];
        assert_eq!(summing(|w: &str| w.len()).aggregate(words)?, 12);
        assert_eq!(averaging(|w: &str| w.len() as u32).aggregate(words)?, 4.0);
        assert_eq!(averaging(|x: i32| x).aggregate(Vec::new())?, 0.0);
        Ok(())
    }

    #[test]
    fn summarizing_tracks_extremes() -> Result<()> {
        let s = summarizing(|x: i32| x).aggregate(vec![4, -2, 9])?;
        assert_eq!((s.count, s.sum, s.min, s.max), (3, 11.0, -2.0, 9.0));
        Ok(())
    }

    #[test]
    fn extrema_of_empty_input_are_none() -> Result<()> {
        assert_eq!(minimum::<i32>().aggregate(Vec::new())?, None);
        assert_eq!(maximum::<i32>().aggregate(Vec::new())?, None);
        assert_eq!(maximum().aggregate(vec![3, 9, 1])?, Some(9));
        Ok(())
    }

    #[test]
    fn min_by_and_max_by_keep_first_on_ties() -> Result<()> {
        let pairs = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];
        let min = min_by(|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
        let max = max_by(|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
        assert_eq!(min.aggregate(pairs.clone())?, Some((0, 'b')));
        assert_eq!(max.aggregate(pairs)?, Some((1, 'a')));
        Ok(())
    }

    #[test]
    fn reducing_declares_identity_finish() -> Result<()> {
        let agg = reducing(0, |a: i32, b| a + b);
        assert!(agg.has(Characteristics::IDENTITY_FINISH));
        let left = agg.fold(1..=3)?;
        let right = agg.fold(4..=6)?;
        assert_eq!(agg.combine(left, right)?, 21);
        Ok(())
    }

    #[test]
    fn reducing_opt_is_none_only_when_empty() -> Result<()> {
        let longest = reducing_opt(|a: String, b: String| if b.len() > a.len() { b } else { a });
        assert_eq!(longest.aggregate(Vec::<String>::new())?, None);
        let words = ["ab", "abc", "x"].map(String::from);
        assert_eq!(longest.aggregate(words)?.as_deref(), Some("abc"));
        Ok(())
    }

    #[test]
    fn reducing_mapped_folds_projections() -> Result<()> {
        let total_len = reducing_mapped(0usize, |s: &str| s.len(), |a, b| a + b);
        assert_eq!(total_len.aggregate(["ab", "cde", ""])?, 5);
        Ok(())
    }
}
