//! Statistical combiners: `AverageF64`, `Summarize`

use crate::aggregator::CombineFn;
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/* ===================== AverageF64 ===================== */

/// Average of values as `f64`.
///
/// Values are widened with `as f64` semantics, so 64-bit integers are
/// accepted and may round above 2^53.
///
/// - Accumulator: `(sum_f64, count_u64)`
/// - Output: `f64`
///
/// Empty inputs produce `0.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AverageF64;

impl<V> CombineFn<V, (f64, u64), f64> for AverageF64
where
    V: AsPrimitive<f64>,
{
    fn create(&self) -> (f64, u64) {
        (0.0, 0)
    }

    fn add_input(&self, acc: &mut (f64, u64), v: V) {
        acc.0 += v.as_();
        acc.1 += 1;
    }

    fn merge(&self, acc: &mut (f64, u64), other: (f64, u64)) {
        acc.0 += other.0;
        acc.1 += other.1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: (f64, u64)) -> f64 {
        if acc.1 == 0 {
            0.0
        } else {
            acc.0 / (acc.1 as f64)
        }
    }
}

/* ===================== Summarize ===================== */

/// Count, sum, minimum and maximum of a stream of `f64`s.
///
/// An empty summary has `min = +inf` and `max = -inf`; [`Summary::average`]
/// is `0.0` for it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Summary {
    pub fn accept(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    pub fn combine(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Builds a [`Summary`] from any primitive number, widened as `as f64`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Summarize<V>(pub PhantomData<V>);
impl<V> Summarize<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V> CombineFn<V, Summary, Summary> for Summarize<V>
where
    V: AsPrimitive<f64> + Send + Sync,
{
    fn create(&self) -> Summary {
        Summary::default()
    }

    fn add_input(&self, acc: &mut Summary, v: V) {
        acc.accept(v.as_());
    }

    fn merge(&self, acc: &mut Summary, other: Summary) {
        acc.combine(&other);
    }

    fn finish(&self, acc: Summary) -> Summary {
        acc
    }

    fn characteristics(&self) -> crate::Characteristics {
        crate::Characteristics::IDENTITY_FINISH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_nothing_is_zero() {
        let avg = AverageF64;
        let acc = CombineFn::<u32, _, _>::create(&avg);
        assert_eq!(CombineFn::<u32, _, f64>::finish(&avg, acc), 0.0);
    }

    #[test]
    fn average_accepts_wide_integers() {
        let avg = AverageF64;
        let mut acc = CombineFn::<i64, _, f64>::create(&avg);
        for v in [i64::from(i32::MAX) * 4, -2, 2] {
            avg.add_input(&mut acc, v);
        }
        assert_eq!(CombineFn::<i64, _, f64>::finish(&avg, acc), f64::from(i32::MAX) * 4.0 / 3.0);
    }

    #[test]
    fn summary_combines_partials() {
        let mut left = Summary::default();
        left.accept(2.0);
        left.accept(8.0);
        let mut right = Summary::default();
        right.accept(-1.0);
        left.combine(&right);
        assert_eq!(left.count, 3);
        assert_eq!(left.sum, 9.0);
        assert_eq!(left.min, -1.0);
        assert_eq!(left.max, 8.0);
        assert_eq!(left.average(), 3.0);
    }

    #[test]
    fn empty_summary_average() {
        assert_eq!(Summary::default().average(), 0.0);
        let mut s = Summary::default();
        s.combine(&Summary::default());
        assert_eq!(s.count, 0);
    }
}
