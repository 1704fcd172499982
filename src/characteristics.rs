//! Declared aggregator properties.
//!
//! A [`Characteristics`] set tells an execution driver which modes are valid for
//! an [`Aggregator`](crate::Aggregator):
//!
//! - [`Characteristics::CONCURRENT`]: one accumulator may be shared by many
//!   threads through the shared accumulation path; combine is not needed.
//! - [`Characteristics::UNORDERED`]: the result does not depend on encounter order.
//! - [`Characteristics::IDENTITY_FINISH`]: the finisher is the identity function
//!   and may be skipped.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Characteristics: u8 {
        const CONCURRENT = 1 << 0;
        const UNORDERED = 1 << 1;
        const IDENTITY_FINISH = 1 << 2;
    }
}
