//! # Ironfold
//!
//! A **composable aggregation framework** for Rust. Ironfold describes how a
//! sequence of elements is reduced to one result as a small four-step protocol,
//! and ships a standard library of aggregators built on it: group-by,
//! partition-by, to-map, reductions, string joining, and the mapping /
//! filtering / flat-mapping adapters that wrap them.
//!
//! Every aggregator produces the same result whether it runs strictly in order
//! on one thread, split into partitions that are folded independently and
//! merged, or (when it says it can) with many threads feeding one shared
//! accumulator.
//!
//! ## Key Features
//!
//! - **One protocol** - create, accumulate, combine, finish; see [`Aggregator`]
//! - **Composition without subclassing** - adapters build new aggregators from
//!   the parts of a downstream one
//! - **Declared characteristics** - `CONCURRENT`, `UNORDERED`, `IDENTITY_FINISH`,
//!   propagated correctly through composition
//! - **Pluggable result containers** - `HashMap`, `BTreeMap`, `IndexMap`, and
//!   `DashMap` for concurrent runs
//! - **Sequential, parallel and concurrent execution** - via [`Runner`]
//! - **Type-safe** - container types are fixed by factories at compile time
//!
//! ## Quick Start
//!
//! ```
//! use ironfold::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let words = vec!["apple", "avocado", "banana", "blueberry", "cherry"];
//!
//! // words grouped by first letter, counted
//! let by_letter = group_by_with(|w: &&str| w.chars().next(), counting());
//! let counts = by_letter.aggregate(words.clone())?;
//! assert_eq!(counts[&Some('b')], 2);
//!
//! // the same aggregator, run in parallel
//! let runner = Runner::new(ExecMode::Parallel { threads: None, partitions: Some(3) });
//! assert_eq!(runner.run(&by_letter, words)?, counts);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Aggregator
//!
//! An [`Aggregator<I, A, O>`] folds elements `I` into an accumulator `A` and
//! finishes it into an `O`. It is an immutable descriptor: clone it freely and
//! run it as often as you like. Build one from closures
//! ([`Aggregator::of`], [`Aggregator::try_of`], [`Aggregator::of_concurrent`]),
//! from a [`CombineFn`] implementation ([`Aggregator::from_combine_fn`]), or
//! take one from the [`aggregators`] library.
//!
//! ### Characteristics
//!
//! [`Characteristics`] tell an execution driver what it may do:
//! - `CONCURRENT` - one accumulator may be fed from many threads
//! - `UNORDERED` - encounter order does not affect the result
//! - `IDENTITY_FINISH` - the finisher can be skipped
//!
//! ### Containers
//!
//! Group-by and to-map are written against the [`ResultMap`] trait;
//! their concurrent variants require [`ConcurrentResultMap`].
//!
//! ### Errors
//!
//! Everything fallible returns [`anyhow::Result`]. Failures raised by the
//! framework itself are [`AggregateError`]s (for example a duplicate key in
//! [`to_map`]); errors from user closures pass through unchanged.
//!
//! ## Feature Flags
//!
//! - `concurrent` (default) - `DashMap` containers, `group_by_concurrent*` and
//!   `to_concurrent_map*`
//!
//! ## Module Overview
//!
//! - [`aggregator`] - the protocol and the `CombineFn` seam
//! - [`aggregators`] - the standard aggregator library
//! - [`characteristics`] - declared aggregator properties
//! - [`combiners`] - built-in `CombineFn`s (Count, Sum, Min, Max, averages)
//! - [`containers`] - result container traits and implementations
//! - [`error`] - framework error types
//! - [`runner`] - execution engine (sequential, parallel, concurrent)
//! - [`testing`] - assertions, builders and fixtures for tests

pub mod aggregator;
pub mod aggregators;
pub mod characteristics;
pub mod combiners;
pub mod containers;
pub mod error;
pub mod runner;
pub mod testing;

// General re-exports
pub use aggregator::{Aggregator, CombineFn};
pub use aggregators::*;
pub use characteristics::Characteristics;
pub use combiners::{AverageF64, Count, Max, Min, Sum, Summarize, Summary};
pub use containers::{ConcurrentResultMap, ResultMap};
pub use error::AggregateError;
pub use runner::{ExecMode, Runner};
