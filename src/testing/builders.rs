//! Test data builders for creating aggregation inputs fluently.

use std::ops::RangeInclusive;

/// A fluent builder for test inputs.
///
/// # Example
///
/// ```
/// use ironfold::testing::TestDataBuilder;
///
/// // every key of 0..4 twice, plus one straggler
/// let input = TestDataBuilder::<i32>::new()
///     .add_range(0..=3)
///     .doubled()
///     .add_value(-1)
///     .build();
///
/// assert_eq!(input, vec![0, 1, 2, 3, 0, 1, 2, 3, -1]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TestDataBuilder<T> {
    data: Vec<T>,
}

impl<T> TestDataBuilder<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    #[must_use]
    pub fn add_value(mut self, value: T) -> Self {
        self.data.push(value);
        self
    }

    #[must_use]
    pub fn add_values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.data.extend(values);
        self
    }

    /// Add `count` copies of `value`.
    ///
    /// ```
    /// use ironfold::testing::TestDataBuilder;
    ///
    /// let data = TestDataBuilder::new().add_repeated("x", 3).build();
    /// assert_eq!(data, vec!["x", "x", "x"]);
    /// ```
    #[must_use]
    pub fn add_repeated(mut self, value: T, count: usize) -> Self
    where
        T: Clone,
    {
        self.data.extend(std::iter::repeat_n(value, count));
        self
    }

    /// Add `gen(0), gen(1), ..., gen(count - 1)`.
    #[must_use]
    pub fn add_generated(mut self, count: usize, generate: impl FnMut(usize) -> T) -> Self {
        self.data.extend((0..count).map(generate));
        self
    }

    /// Append everything added so far once more, producing guaranteed duplicates.
    #[must_use]
    pub fn doubled(mut self) -> Self
    where
        T: Clone,
    {
        self.data.extend_from_within(..);
        self
    }

    /// Reverse the order of everything added so far.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.data.reverse();
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<T> {
        self.data
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: From<i32>> TestDataBuilder<T> {
    /// Add every integer of `range`, converted to `T`.
    ///
    /// ```
    /// use ironfold::testing::TestDataBuilder;
    ///
    /// let wide = TestDataBuilder::<i64>::new().add_range(-2..=2).build();
    /// assert_eq!(wide, vec![-2, -1, 0, 1, 2]);
    /// ```
    #[must_use]
    pub fn add_range(mut self, range: RangeInclusive<i32>) -> Self {
        self.data.extend(range.map(T::from));
        self
    }
}
