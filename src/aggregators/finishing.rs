//! Finishing transforms: post-processing one result, or merging two.

use crate::aggregator::{Aggregator, SharedAccumulateFn};
use crate::characteristics::Characteristics;
use anyhow::Result;
use std::sync::Arc;

/// Free-function form of [`Aggregator::and_then`].
///
/// ```
/// use ironfold::{and_then, to_list};
///
/// let frozen = and_then(to_list(), Vec::into_boxed_slice);
/// let out: Box<[i32]> = frozen.aggregate(vec![1, 2])?;
/// assert_eq!(&*out, &[1, 2]);
/// # anyhow::Result::<()>::Ok(())
/// ```
pub fn and_then<I, A, O, R, F>(downstream: Aggregator<I, A, O>, finisher: F) -> Aggregator<I, A, R>
where
    I: 'static,
    A: 'static,
    O: 'static,
    R: 'static,
    F: Fn(O) -> R + Send + Sync + 'static,
{
    downstream.and_then(finisher)
}

/// Feed every element to both `first` and `second`, then combine their results
/// with `merger`.
///
/// Characteristics are the intersection of both sides, minus
/// `IDENTITY_FINISH`. A shared accumulation path exists when both sides have one.
///
/// ```
/// use ironfold::{counting, summing, teeing};
///
/// let mean = teeing(summing(|x: i64| x), counting(), |sum, n| sum as f64 / n as f64);
/// assert_eq!(mean.aggregate(vec![2, 4, 9])?, 5.0);
/// # anyhow::Result::<()>::Ok(())
/// ```
pub fn teeing<T, A1, R1, A2, R2, R, F>(
    first: Aggregator<T, A1, R1>,
    second: Aggregator<T, A2, R2>,
    merger: F,
) -> Aggregator<T, (A1, A2), R>
where
    T: Clone + 'static,
    A1: 'static,
    R1: 'static,
    A2: 'static,
    R2: 'static,
    R: 'static,
    F: Fn(R1, R2) -> R + Send + Sync + 'static,
{
    let characteristics = first
        .characteristics()
        .intersection(second.characteristics())
        .difference(Characteristics::IDENTITY_FINISH);

    let shared: Option<SharedAccumulateFn<(A1, A2), T>> =
        match (first.shared.clone(), second.shared.clone()) {
            (Some(left), Some(right)) => Some(Arc::new(move |acc: &(A1, A2), item: T| {
                left(&acc.0, item.clone())?;
                right(&acc.1, item)
            })),
            _ => None,
        };

    let supplier = {
        let (first, second) = (first.clone(), second.clone());
        move || (first.create_state(), second.create_state())
    };
    let accumulator = {
        let (first, second) = (first.clone(), second.clone());
        move |acc: &mut (A1, A2), item: T| -> Result<()> {
            first.accumulate(&mut acc.0, item.clone())?;
            second.accumulate(&mut acc.1, item)
        }
    };
    let combiner = {
        let (first, second) = (first.clone(), second.clone());
        move |acc: &mut (A1, A2), other: (A1, A2)| -> Result<()> {
            first.combine_into(&mut acc.0, other.0)?;
            second.combine_into(&mut acc.1, other.1)
        }
    };
    let finisher = move |acc: (A1, A2)| -> Result<R> {
        let left = first.finish(acc.0)?;
        let right = second.finish(acc.1)?;
        Ok(merger(left, right))
    };

    let mut agg = Aggregator::try_of(
        supplier,
        accumulator,
        combiner,
        finisher,
        characteristics.difference(Characteristics::CONCURRENT),
    );
    if shared.is_some() {
        agg.shared = shared;
        agg.characteristics = characteristics;
    }
    agg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregators::{counting, maximum, minimum, to_list, to_set};

    #[test]
    fn and_then_post_processes() -> Result<()> {
        let agg = and_then(to_list(), |v: Vec<i32>| v.len());
        assert_eq!(agg.aggregate(vec![4, 5, 6])?, 3);
        assert!(!agg.has(Characteristics::IDENTITY_FINISH));
        Ok(())
    }

    #[test]
    fn teeing_sees_every_element_twice() -> Result<()> {
        let range = teeing(minimum(), maximum(), |lo, hi| lo.zip(hi));
        assert_eq!(range.aggregate(vec![3, 8, 1, 5])?, Some((1, 8)));
        assert_eq!(range.aggregate(Vec::new())?, None);
        Ok(())
    }

    #[test]
    fn teeing_combines_both_sides() -> Result<()> {
        let agg = teeing(to_list(), counting(), |items, n| (items, n));
        let left = agg.fold(vec!['a'])?;
        let right = agg.fold(vec!['b', 'c'])?;
        assert_eq!(agg.finish(agg.combine(left, right)?)?, (vec!['a', 'b', 'c'], 3));
        Ok(())
    }

    #[test]
    fn teeing_intersects_characteristics() {
        let both_unordered = teeing(to_set::<u8>(), counting(), |s, n| (s.len(), n));
        assert!(both_unordered.is_unordered());
        assert!(!both_unordered.has(Characteristics::IDENTITY_FINISH));

        let mixed = teeing(to_list::<u8>(), counting(), |v, n| (v, n));
        assert!(!mixed.is_unordered());
    }
}
