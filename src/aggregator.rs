//! The aggregation protocol.
//!
//! An [`Aggregator<I, A, O>`] describes how a sequence of `I` is folded into an
//! `O` through a mutable accumulator `A`:
//!
//! - **supplier** -- creates an empty accumulator (`create_state`)
//! - **accumulator** -- folds one element into an accumulator (`accumulate`)
//! - **combiner** -- merges a right-hand partial accumulator into a left-hand one (`combine`)
//! - **finisher** -- turns the final accumulator into the result (`finish`)
//!
//! plus a declared [`Characteristics`] set. Aggregators are immutable descriptors:
//! every operation is stored behind an `Arc`, so cloning one is cheap and a single
//! descriptor may drive any number of runs on any number of threads. Accumulators
//! are created per run (or per partition) and are owned by that run.
//!
//! Composition never subclasses: adapters such as [`mapping`](crate::aggregators::mapping)
//! or [`group_by_with`](crate::aggregators::group_by_with) build a fresh
//! `Aggregator` out of the parts of an existing one.
//!
//! Concurrent aggregators additionally carry a *shared* accumulation function
//! taking `&A`; the accumulator's own internal synchronization is what makes
//! sharing it safe.

use crate::characteristics::Characteristics;
use crate::error::AggregateError;
use anyhow::Result;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

pub(crate) type SupplierFn<A> = Arc<dyn Fn() -> A + Send + Sync>;
pub(crate) type AccumulateFn<A, I> = Arc<dyn Fn(&mut A, I) -> Result<()> + Send + Sync>;
pub(crate) type SharedAccumulateFn<A, I> = Arc<dyn Fn(&A, I) -> Result<()> + Send + Sync>;
pub(crate) type CombineIntoFn<A> = Arc<dyn Fn(&mut A, A) -> Result<()> + Send + Sync>;
pub(crate) type FinishFn<A, O> = Arc<dyn Fn(A) -> Result<O> + Send + Sync>;

/// User-implementable combiner: the trait-based way to define an aggregator.
///
/// Implementors describe the four steps as methods; [`Aggregator::from_combine_fn`]
/// turns any `CombineFn` into an [`Aggregator`].
pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    fn create(&self) -> A;
    fn add_input(&self, acc: &mut A, v: V);
    fn merge(&self, acc: &mut A, other: A);
    fn finish(&self, acc: A) -> O;

    /// Declared characteristics; none by default.
    fn characteristics(&self) -> Characteristics {
        Characteristics::empty()
    }
}

/// An immutable four-function aggregation descriptor.
pub struct Aggregator<I, A, O> {
    pub(crate) supplier: SupplierFn<A>,
    pub(crate) accumulator: AccumulateFn<A, I>,
    pub(crate) shared: Option<SharedAccumulateFn<A, I>>,
    pub(crate) combiner: CombineIntoFn<A>,
    pub(crate) finisher: FinishFn<A, O>,
    pub(crate) characteristics: Characteristics,
}

impl<I, A, O> Clone for Aggregator<I, A, O> {
    fn clone(&self) -> Self {
        Self {
            supplier: Arc::clone(&self.supplier),
            accumulator: Arc::clone(&self.accumulator),
            shared: self.shared.clone(),
            combiner: Arc::clone(&self.combiner),
            finisher: Arc::clone(&self.finisher),
            characteristics: self.characteristics,
        }
    }
}

impl<I, A, O> fmt::Debug for Aggregator<I, A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("characteristics", &self.characteristics)
            .field("shared", &self.shared.is_some())
            .finish_non_exhaustive()
    }
}

impl<I, A, O> Aggregator<I, A, O>
where
    I: 'static,
    A: 'static,
    O: 'static,
{
    /// Build an aggregator from fallible closures.
    ///
    /// `CONCURRENT` is dropped from `characteristics`: a concurrent aggregator
    /// needs a shared accumulation path, see [`Aggregator::of_concurrent`].
    /// Declaring `IDENTITY_FINISH` when `A` and `O` differ is a contract violation
    /// and fails fast in debug builds.
    pub fn try_of<S, F, C, Fin>(
        supplier: S,
        accumulator: F,
        combiner: C,
        finisher: Fin,
        mut characteristics: Characteristics,
    ) -> Self
    where
        S: Fn() -> A + Send + Sync + 'static,
        F: Fn(&mut A, I) -> Result<()> + Send + Sync + 'static,
        C: Fn(&mut A, A) -> Result<()> + Send + Sync + 'static,
        Fin: Fn(A) -> Result<O> + Send + Sync + 'static,
    {
        if characteristics.contains(Characteristics::CONCURRENT) {
            tracing::warn!("Concurrent declared without a shared accumulation path; ignoring");
            characteristics.remove(Characteristics::CONCURRENT);
        }
        debug_assert_identity::<A, O>(characteristics);
        Self {
            supplier: Arc::new(supplier),
            accumulator: Arc::new(accumulator),
            shared: None,
            combiner: Arc::new(combiner),
            finisher: Arc::new(finisher),
            characteristics,
        }
    }

    /// Build an aggregator from infallible closures.
    ///
    /// ```
    /// use ironfold::{Aggregator, Characteristics};
    ///
    /// // average of doubled values, as (sum, count)
    /// let avg2x = Aggregator::of(
    ///     || (0i64, 0u64),
    ///     |a: &mut (i64, u64), x: i32| {
    ///         a.0 += i64::from(x) * 2;
    ///         a.1 += 1;
    ///     },
    ///     |a, b| {
    ///         a.0 += b.0;
    ///         a.1 += b.1;
    ///     },
    ///     |a| if a.1 == 0 { 0.0 } else { a.0 as f64 / a.1 as f64 },
    ///     Characteristics::empty(),
    /// );
    /// assert_eq!(avg2x.aggregate(vec![1, 2, 3]).unwrap(), 4.0);
    /// ```
    pub fn of<S, F, C, Fin>(
        supplier: S,
        accumulator: F,
        combiner: C,
        finisher: Fin,
        characteristics: Characteristics,
    ) -> Self
    where
        S: Fn() -> A + Send + Sync + 'static,
        F: Fn(&mut A, I) + Send + Sync + 'static,
        C: Fn(&mut A, A) + Send + Sync + 'static,
        Fin: Fn(A) -> O + Send + Sync + 'static,
    {
        Self::try_of(
            supplier,
            move |acc: &mut A, item: I| {
                accumulator(acc, item);
                Ok(())
            },
            move |acc: &mut A, other: A| {
                combiner(acc, other);
                Ok(())
            },
            move |acc: A| Ok(finisher(acc)),
            characteristics,
        )
    }

    /// Build a concurrent aggregator: `shared` folds elements into an accumulator
    /// that many threads hold at once, so `A` must synchronize internally.
    ///
    /// Declares `CONCURRENT` in addition to `characteristics`. The exclusive
    /// accumulation path delegates to `shared`.
    pub fn of_concurrent<S, F, C, Fin>(
        supplier: S,
        shared: F,
        combiner: C,
        finisher: Fin,
        characteristics: Characteristics,
    ) -> Self
    where
        S: Fn() -> A + Send + Sync + 'static,
        F: Fn(&A, I) -> Result<()> + Send + Sync + 'static,
        C: Fn(&mut A, A) -> Result<()> + Send + Sync + 'static,
        Fin: Fn(A) -> Result<O> + Send + Sync + 'static,
    {
        let characteristics = characteristics | Characteristics::CONCURRENT;
        debug_assert_identity::<A, O>(characteristics);
        let shared: SharedAccumulateFn<A, I> = Arc::new(shared);
        let exclusive = Arc::clone(&shared);
        Self {
            supplier: Arc::new(supplier),
            accumulator: Arc::new(move |acc: &mut A, item: I| exclusive(acc, item)),
            shared: Some(shared),
            combiner: Arc::new(combiner),
            finisher: Arc::new(finisher),
            characteristics,
        }
    }

    /// Adapt a [`CombineFn`] into an aggregator.
    pub fn from_combine_fn<C>(comb: C) -> Self
    where
        C: CombineFn<I, A, O>,
    {
        let comb = Arc::new(comb);
        let characteristics = comb
            .characteristics()
            .difference(Characteristics::CONCURRENT);
        debug_assert_identity::<A, O>(characteristics);

        let supplier = {
            let comb = Arc::clone(&comb);
            Arc::new(move || comb.create())
        };
        let accumulator = {
            let comb = Arc::clone(&comb);
            Arc::new(move |acc: &mut A, v: I| {
                comb.add_input(acc, v);
                Ok(())
            })
        };
        let combiner = {
            let comb = Arc::clone(&comb);
            Arc::new(move |acc: &mut A, other: A| {
                comb.merge(acc, other);
                Ok(())
            })
        };
        let finisher = Arc::new(move |acc: A| Ok(comb.finish(acc)));

        Self {
            supplier,
            accumulator,
            shared: None,
            combiner,
            finisher,
            characteristics,
        }
    }

    /// Wrap the finisher: the new result is `f(original_finish(acc))`.
    ///
    /// `IDENTITY_FINISH` is always cleared; everything else is inherited.
    #[must_use]
    pub fn and_then<R, F>(self, f: F) -> Aggregator<I, A, R>
    where
        R: 'static,
        F: Fn(O) -> R + Send + Sync + 'static,
    {
        self.try_and_then(move |out| Ok(f(out)))
    }

    /// Like [`and_then`](Self::and_then) with a fallible post-processing step.
    #[must_use]
    pub fn try_and_then<R, F>(self, f: F) -> Aggregator<I, A, R>
    where
        R: 'static,
        F: Fn(O) -> Result<R> + Send + Sync + 'static,
    {
        let finisher = self.finisher;
        Aggregator {
            supplier: self.supplier,
            accumulator: self.accumulator,
            shared: self.shared,
            combiner: self.combiner,
            finisher: Arc::new(move |acc: A| f(finisher(acc)?)),
            characteristics: self
                .characteristics
                .difference(Characteristics::IDENTITY_FINISH),
        }
    }
}

impl<I, A, O> Aggregator<I, A, O> {
    /// Replace the input side, keeping supplier, combiner, finisher and
    /// characteristics. Used by the element-transforming adapters.
    pub(crate) fn with_input<J>(
        self,
        accumulator: AccumulateFn<A, J>,
        shared: Option<SharedAccumulateFn<A, J>>,
    ) -> Aggregator<J, A, O> {
        Aggregator {
            supplier: self.supplier,
            accumulator,
            shared,
            combiner: self.combiner,
            finisher: self.finisher,
            characteristics: self.characteristics,
        }
    }

    pub fn create_state(&self) -> A {
        (self.supplier)()
    }

    /// Fold one element into an exclusively held accumulator.
    ///
    /// # Errors
    /// Propagates failures of the aggregator or of any user function it wraps.
    pub fn accumulate(&self, acc: &mut A, item: I) -> Result<()> {
        (self.accumulator)(acc, item)
    }

    /// Fold one element into an accumulator other threads may be using too.
    ///
    /// # Errors
    /// [`AggregateError::SharedAccumulationUnsupported`] when the aggregator has
    /// no shared path; otherwise whatever the accumulation raises.
    pub fn accumulate_shared(&self, acc: &A, item: I) -> Result<()> {
        match &self.shared {
            Some(f) => f(acc, item),
            None => Err(AggregateError::SharedAccumulationUnsupported.into()),
        }
    }

    /// Whether [`accumulate_shared`](Self::accumulate_shared) is available.
    /// This may hold even when `CONCURRENT` is not declared.
    pub fn supports_shared_accumulation(&self) -> bool {
        self.shared.is_some()
    }

    /// Merge `other` into `acc` as if `other`'s elements had been accumulated
    /// into `acc` after its own.
    ///
    /// # Errors
    /// Propagates merge failures, e.g. a duplicate key.
    pub fn combine_into(&self, acc: &mut A, other: A) -> Result<()> {
        (self.combiner)(acc, other)
    }

    /// Owned form of [`combine_into`](Self::combine_into).
    ///
    /// # Errors
    /// Propagates merge failures.
    pub fn combine(&self, mut left: A, right: A) -> Result<A> {
        (self.combiner)(&mut left, right)?;
        Ok(left)
    }

    /// # Errors
    /// Propagates failures of a fallible post-processing step.
    pub fn finish(&self, acc: A) -> Result<O> {
        (self.finisher)(acc)
    }

    pub const fn characteristics(&self) -> Characteristics {
        self.characteristics
    }

    pub const fn has(&self, c: Characteristics) -> bool {
        self.characteristics.contains(c)
    }

    pub const fn is_concurrent(&self) -> bool {
        self.has(Characteristics::CONCURRENT)
    }

    pub const fn is_unordered(&self) -> bool {
        self.has(Characteristics::UNORDERED)
    }

    /// Sequentially fold `items` into a fresh accumulator.
    ///
    /// # Errors
    /// Stops at, and returns, the first accumulation failure.
    pub fn fold<It>(&self, items: It) -> Result<A>
    where
        It: IntoIterator<Item = I>,
    {
        let mut acc = self.create_state();
        for item in items {
            self.accumulate(&mut acc, item)?;
        }
        Ok(acc)
    }

    /// Run the whole protocol sequentially: create, accumulate every item, finish.
    ///
    /// # Errors
    /// Any failure aborts the run; no partial result is produced.
    pub fn aggregate<It>(&self, items: It) -> Result<O>
    where
        It: IntoIterator<Item = I>,
    {
        let acc = self.fold(items)?;
        self.finish(acc)
    }
}

impl<I, A> Aggregator<I, A, A>
where
    I: 'static,
    A: 'static,
{
    /// An aggregator whose accumulator is its result; declares `IDENTITY_FINISH`.
    pub fn of_identity<S, F, C>(
        supplier: S,
        accumulator: F,
        combiner: C,
        characteristics: Characteristics,
    ) -> Self
    where
        S: Fn() -> A + Send + Sync + 'static,
        F: Fn(&mut A, I) + Send + Sync + 'static,
        C: Fn(&mut A, A) + Send + Sync + 'static,
    {
        let characteristics = characteristics | Characteristics::IDENTITY_FINISH;
        Self::of(supplier, accumulator, combiner, |acc| acc, characteristics)
    }

    /// Finish, skipping the finisher when `IDENTITY_FINISH` is declared.
    ///
    /// # Errors
    /// Propagates finisher failures when the finisher runs.
    pub fn finish_or_identity(&self, acc: A) -> Result<A> {
        if self.has(Characteristics::IDENTITY_FINISH) {
            Ok(acc)
        } else {
            self.finish(acc)
        }
    }
}

fn debug_assert_identity<A: 'static, O: 'static>(characteristics: Characteristics) {
    debug_assert!(
        !characteristics.contains(Characteristics::IDENTITY_FINISH)
            || TypeId::of::<A>() == TypeId::of::<O>(),
        "IdentityFinish declared but accumulator and output types differ"
    );
}
