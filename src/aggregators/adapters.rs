//! Element-transforming adapters: `mapping`, `try_mapping`, `filtering`, `flat_mapping`.
//!
//! Each adapter wraps a downstream aggregator and only changes what reaches its
//! accumulator; supplier, combiner, finisher and characteristics are the
//! downstream's own. A shared accumulation path is kept when the downstream has one.

use crate::aggregator::{AccumulateFn, Aggregator, SharedAccumulateFn};
use anyhow::Result;
use std::sync::Arc;

/// Apply `mapper` to every element before handing it to `downstream`.
///
/// ```
/// use ironfold::{mapping, to_list};
///
/// let lens = mapping(|s: &str| s.len(), to_list());
/// assert_eq!(lens.aggregate(["a", "bcd", ""])?, vec![1, 3, 0]);
/// # anyhow::Result::<()>::Ok(())
/// ```
pub fn mapping<T, U, A, R, F>(mapper: F, downstream: Aggregator<U, A, R>) -> Aggregator<T, A, R>
where
    T: 'static,
    U: 'static,
    A: 'static,
    R: 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    try_mapping(move |t| Ok(mapper(t)), downstream)
}

/// Like [`mapping`] with a fallible transform; the first error aborts the run.
pub fn try_mapping<T, U, A, R, F>(mapper: F, downstream: Aggregator<U, A, R>) -> Aggregator<T, A, R>
where
    T: 'static,
    U: 'static,
    A: 'static,
    R: 'static,
    F: Fn(T) -> Result<U> + Send + Sync + 'static,
{
    let mapper = Arc::new(mapper);

    let accumulator: AccumulateFn<A, T> = {
        let mapper = Arc::clone(&mapper);
        let down = Arc::clone(&downstream.accumulator);
        Arc::new(move |acc: &mut A, t: T| down(acc, mapper(t)?))
    };
    let shared = downstream.shared.clone().map(|down| -> SharedAccumulateFn<A, T> {
        Arc::new(move |acc: &A, t: T| down(acc, mapper(t)?))
    });

    downstream.with_input(accumulator, shared)
}

/// Only elements matching `predicate` reach `downstream`.
pub fn filtering<T, A, R, P>(predicate: P, downstream: Aggregator<T, A, R>) -> Aggregator<T, A, R>
where
    T: 'static,
    A: 'static,
    R: 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);

    let accumulator: AccumulateFn<A, T> = {
        let predicate = Arc::clone(&predicate);
        let down = Arc::clone(&downstream.accumulator);
        Arc::new(move |acc: &mut A, t: T| if predicate(&t) { down(acc, t) } else { Ok(()) })
    };
    let shared = downstream.shared.clone().map(|down| -> SharedAccumulateFn<A, T> {
        Arc::new(move |acc: &A, t: T| if predicate(&t) { down(acc, t) } else { Ok(()) })
    });

    downstream.with_input(accumulator, shared)
}

/// The result of a flat-mapping transform: nothing, or a finite sequence.
///
/// `Empty` is the explicit "no values" case; it contributes zero downstream
/// accumulations, exactly like an empty `Items`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expansion<S> {
    Empty,
    Items(S),
}

impl<S> Expansion<S> {
    #[must_use]
    pub const fn empty() -> Self {
        Self::Empty
    }

    #[must_use]
    pub const fn of(items: S) -> Self {
        Self::Items(items)
    }
}

impl<S> From<Option<S>> for Expansion<S> {
    fn from(items: Option<S>) -> Self {
        items.map_or(Self::Empty, Self::Items)
    }
}

impl<S: IntoIterator> IntoIterator for Expansion<S> {
    type Item = S::Item;
    type IntoIter = std::iter::Flatten<std::option::IntoIter<S>>;

    fn into_iter(self) -> Self::IntoIter {
        let items = match self {
            Self::Empty => None,
            Self::Items(items) => Some(items),
        };
        items.into_iter().flatten()
    }
}

/// Expand every element into zero or more values, each handed to `downstream`
/// in order.
///
/// The expansion's iterator is dropped (releasing whatever it holds) before the
/// next input element is processed, including when the downstream fails midway.
pub fn flat_mapping<T, U, S, A, R, F>(
    expand: F,
    downstream: Aggregator<U, A, R>,
) -> Aggregator<T, A, R>
where
    T: 'static,
    U: 'static,
    A: 'static,
    R: 'static,
    S: IntoIterator<Item = U>,
    F: Fn(T) -> S + Send + Sync + 'static,
{
    let expand = Arc::new(expand);

    let accumulator: AccumulateFn<A, T> = {
        let expand = Arc::clone(&expand);
        let down = Arc::clone(&downstream.accumulator);
        Arc::new(move |acc: &mut A, t: T| {
            for u in expand(t) {
                down(acc, u)?;
            }
            Ok(())
        })
    };
    let shared = downstream.shared.clone().map(|down| -> SharedAccumulateFn<A, T> {
        Arc::new(move |acc: &A, t: T| {
            for u in expand(t) {
                down(acc, u)?;
            }
            Ok(())
        })
    });

    downstream.with_input(accumulator, shared)
}
