//! The standard aggregator library.
//!
//! Every function here returns a ready-to-run [`Aggregator`](crate::Aggregator).
//! The compositional ones take a *downstream* aggregator and build a new
//! descriptor around it, so they nest freely:
//!
//! ```
//! use std::collections::BTreeMap;
//! use ironfold::{filtering, group_by_into, joining_with, mapping};
//!
//! // words grouped by length, upper-cased, short words skipped, comma-joined
//! let agg = group_by_into(
//!     |w: &&str| w.len(),
//!     BTreeMap::new,
//!     filtering(|w: &&str| w.len() > 1, mapping(|w: &str| w.to_uppercase(), joining_with(","))),
//! );
//! let out = agg.aggregate(["ab", "c", "de", "fgh"])?;
//! assert_eq!(out, BTreeMap::from([(1, String::new()), (2, "AB,DE".into()), (3, "FGH".into())]));
//! # anyhow::Result::<()>::Ok(())
//! ```
//!
//! | family      | functions |
//! |-------------|-----------|
//! | primitive   | [`counting`], [`summing`], [`averaging`], [`summarizing`], [`minimum`], [`maximum`], [`min_by`], [`max_by`], [`reducing`], [`reducing_opt`], [`reducing_mapped`] |
//! | collections | [`to_list`], [`to_set`], [`to_collection`] |
//! | strings     | [`joining`], [`joining_with`], [`joining_full`] |
//! | adapters    | [`mapping`], [`try_mapping`], [`filtering`], [`flat_mapping`] |
//! | grouping    | [`group_by`], [`group_by_with`], [`group_by_into`], `group_by_concurrent*` |
//! | partition   | [`partition_by`], [`partition_by_with`] |
//! | maps        | [`to_map`], [`to_map_merging`], [`to_map_into`], `to_concurrent_map*` |
//! | finishing   | [`and_then`], [`teeing`] |

mod adapters;
mod collections;
mod finishing;
mod grouping;
mod joining;
mod partition;
mod primitive;
mod to_map;

pub use adapters::{Expansion, filtering, flat_mapping, mapping, try_mapping};
pub use collections::{to_collection, to_list, to_set};
pub use finishing::{and_then, teeing};
pub use grouping::{group_by, group_by_into, group_by_with};
pub use joining::{Joiner, joining, joining_full, joining_with};
pub use partition::{Partitioned, partition_by, partition_by_with};
pub use primitive::{
    averaging, counting, max_by, maximum, min_by, minimum, reducing, reducing_mapped,
    reducing_opt, summarizing, summing,
};
pub use to_map::{to_map, to_map_into, to_map_merging};

#[cfg(feature = "concurrent")]
pub use grouping::{group_by_concurrent, group_by_concurrent_into, group_by_concurrent_with};
#[cfg(feature = "concurrent")]
pub use to_map::{to_concurrent_map, to_concurrent_map_into};
