//! Testing utilities for aggregators.
//!
//! Helpers for writing tests against [`Aggregator`](crate::Aggregator)s and
//! the results they produce:
//!
//! - **Assertions**: compare lists, sets and maps with detailed failure messages,
//!   and check that every execution mode produces the same result
//! - **Test data builders**: assemble input vectors fluently
//! - **Fixtures**: the standard integer datasets aggregators are exercised on
//!
//! # Quick Start
//!
//! ```
//! use ironfold::{group_by, summing};
//! use ironfold::testing::*;
//!
//! let data = TestDataBuilder::<i32>::new().add_range(1..=6).build();
//!
//! // sequential, parallel and concurrent runs must all agree
//! let total = assert_modes_agree(&summing(|x: i32| x), &data);
//! assert_eq!(total, 21);
//!
//! let groups = assert_modes_agree(&group_by(|x: &i32| x % 3), &data);
//! assert_maps_unordered_equal(groups, [(0, vec![3, 6]), (1, vec![1, 4]), (2, vec![2, 5])]);
//! ```
//!
//! # Assertion Functions
//!
//! - [`assert_collections_equal`]: exact order-dependent comparison
//! - [`assert_collections_unordered_equal`]: order-independent comparison
//! - [`assert_maps_unordered_equal`]: key/value comparison, independent of map order
//! - [`assert_modes_agree`]: run an aggregator in every mode and compare
//!
//! # Fixtures
//!
//! [`standard_datasets`] returns named integer inputs (empty, singleton,
//! ascending, descending, with duplicates, large) suitable for looping over.

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
