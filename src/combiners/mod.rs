//! Built-in [`CombineFn`](crate::CombineFn) implementations.
//!
//! These are the primitive numeric folds the standard aggregators in
//! [`aggregators`](crate::aggregators) are built from:
//!
//! - [`Count`] -- number of elements.
//! - [`Sum<T>`] -- sum of values.
//! - [`Min<T>`] / [`Max<T>`] -- smallest / largest value, `None` when empty.
//! - [`AverageF64`] -- average as `f64` (values convertible to `f64`), `0.0` when empty.
//! - [`Summarize<V>`] -- count, sum, min and max in one pass.
//!
//! Each combiner specifies its accumulator type (`A`) and output type (`O`).
//! Any of them can be turned into an [`Aggregator`](crate::Aggregator) with
//! [`Aggregator::from_combine_fn`](crate::Aggregator::from_combine_fn).
//!
//! # Examples
//! ```
//! use ironfold::Aggregator;
//! use ironfold::combiners::{AverageF64, Max, Sum};
//!
//! let sum = Aggregator::from_combine_fn(Sum::<u64>::new());
//! assert_eq!(sum.aggregate(vec![1, 2, 3])?, 6);
//!
//! let max = Aggregator::from_combine_fn(Max::<u32>::new());
//! assert_eq!(max.aggregate(vec![3, 7, 5])?, Some(7));
//!
//! let avg: Aggregator<u32, _, f64> = Aggregator::from_combine_fn(AverageF64);
//! assert_eq!(avg.aggregate(vec![1, 2, 3])?, 2.0);
//! # anyhow::Result::<()>::Ok(())
//! ```

mod basic;
mod statistical;

pub use basic::{Count, Max, Min, Sum};
pub use statistical::{AverageF64, Summarize, Summary};
