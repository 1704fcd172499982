//! Execution driver.
//!
//! A [`Runner`] applies an [`Aggregator`] to an in-memory input in one of three
//! modes:
//!
//! - [`ExecMode::Sequential`] -- one accumulator, strict encounter order, the
//!   combiner is never called.
//! - [`ExecMode::Parallel`] -- the input is split into contiguous partitions, each
//!   folded into its own accumulator on a rayon pool; the partial accumulators
//!   are then merged in partition order, at most `fanout` per merge.
//! - [`ExecMode::Concurrent`] -- every partition folds into one shared
//!   accumulator through the aggregator's shared path. Only used when the
//!   aggregator declares both `CONCURRENT` and `UNORDERED`; anything else falls
//!   back to `Parallel`.
//!
//! All modes call the finisher exactly once.
//!
//! Runners are plain configuration and can be loaded from JSON:
//!
//! ```
//! use ironfold::{ExecMode, Runner};
//!
//! let runner = Runner::from_json(r#"{ "mode": { "parallel": { "partitions": 4 } }, "fanout": 8 }"#)?;
//! assert_eq!(runner.mode, ExecMode::Parallel { threads: None, partitions: Some(4) });
//! assert_eq!(runner.fanout, Some(8));
//! # anyhow::Result::<()>::Ok(())
//! ```

use crate::aggregator::Aggregator;
use crate::error::AggregateError;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecMode {
    Sequential,
    Parallel {
        #[serde(default)]
        threads: Option<usize>,
        #[serde(default)]
        partitions: Option<usize>,
    },
    Concurrent {
        #[serde(default)]
        threads: Option<usize>,
        #[serde(default)]
        partitions: Option<usize>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Runner {
    pub mode: ExecMode,
    /// Partition count when the mode does not name one.
    pub default_partitions: usize,
    /// Maximum number of partial accumulators merged by one task; `None` merges
    /// everything in a single round.
    pub fanout: Option<usize>,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: None,
            },
            default_partitions: 2 * num_cpus::get().max(2),
            fanout: None,
        }
    }
}

impl Runner {
    #[must_use]
    pub fn new(mode: ExecMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parse a runner configuration; missing fields take their defaults.
    ///
    /// # Errors
    /// Malformed JSON or unknown modes.
    pub fn from_json(config: &str) -> Result<Self> {
        serde_json::from_str(config).context("invalid runner configuration")
    }

    /// Run `agg` over `items` and return its finished result.
    ///
    /// # Errors
    /// The first failure of any accumulation, merge or finish aborts the run;
    /// no partial result is returned. [`AggregateError::ThreadPool`] when a
    /// dedicated pool was requested and could not be built.
    pub fn run<I, A, O>(&self, agg: &Aggregator<I, A, O>, items: Vec<I>) -> Result<O>
    where
        I: Send,
        A: Send + Sync,
        O: Send,
    {
        match self.mode {
            ExecMode::Sequential => {
                debug!(len = items.len(), "sequential run");
                agg.aggregate(items)
            }
            ExecMode::Parallel { threads, partitions } => {
                let parts = partitions.unwrap_or(self.default_partitions);
                in_pool(threads, || self.run_parallel(agg, items, parts))
            }
            ExecMode::Concurrent { threads, partitions } => {
                let parts = partitions.unwrap_or(self.default_partitions);
                if agg.is_concurrent() && agg.is_unordered() {
                    in_pool(threads, || run_concurrent(agg, items, parts))
                } else {
                    debug!(
                        characteristics = ?agg.characteristics(),
                        "aggregator is not concurrent and unordered; falling back to partition-and-merge"
                    );
                    in_pool(threads, || self.run_parallel(agg, items, parts))
                }
            }
        }
    }

    fn run_parallel<I, A, O>(
        &self,
        agg: &Aggregator<I, A, O>,
        items: Vec<I>,
        partitions: usize,
    ) -> Result<O>
    where
        I: Send,
        A: Send,
    {
        let chunks = split_vec(items, partitions);
        debug!(partitions = chunks.len(), fanout = ?self.fanout, "partition-and-merge run");
        let partials = chunks
            .into_par_iter()
            .map(|chunk| agg.fold(chunk))
            .collect::<Result<Vec<A>>>()?;
        let acc = merge_rounds(agg, partials, self.fanout)?;
        agg.finish(acc)
    }
}

fn run_concurrent<I, A, O>(agg: &Aggregator<I, A, O>, items: Vec<I>, partitions: usize) -> Result<O>
where
    I: Send,
    A: Sync,
{
    let chunks = split_vec(items, partitions);
    debug!(partitions = chunks.len(), "concurrent run into one shared accumulator");
    let shared = agg.create_state();
    chunks.into_par_iter().try_for_each(|chunk| {
        chunk
            .into_iter()
            .try_for_each(|item| agg.accumulate_shared(&shared, item))
    })?;
    agg.finish(shared)
}

/// Run `f` on a dedicated pool of `threads` workers, or on the global pool.
fn in_pool<R, F>(threads: Option<usize>, f: F) -> Result<R>
where
    R: Send,
    F: FnOnce() -> Result<R> + Send,
{
    match threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| AggregateError::ThreadPool(e.to_string()))?;
            pool.install(f)
        }
        None => f(),
    }
}

/// Merge partial accumulators in order, `fanout` at a time, until one is left.
fn merge_rounds<I, A, O>(
    agg: &Aggregator<I, A, O>,
    mut partials: Vec<A>,
    fanout: Option<usize>,
) -> Result<A>
where
    A: Send,
{
    let width = fanout.unwrap_or(usize::MAX).max(2);
    let mut round = 0usize;
    while partials.len() > 1 {
        round += 1;
        trace!(round, inputs = partials.len(), width, "merge round");
        partials = chunk_owned(partials, width)
            .into_par_iter()
            .map(|group| merge_in_order(agg, group))
            .collect::<Result<Vec<A>>>()?;
    }
    Ok(partials.pop().unwrap_or_else(|| agg.create_state()))
}

fn merge_in_order<I, A, O>(agg: &Aggregator<I, A, O>, group: Vec<A>) -> Result<A> {
    let mut it = group.into_iter();
    let Some(mut acc) = it.next() else {
        return Ok(agg.create_state());
    };
    for next in it {
        agg.combine_into(&mut acc, next)?;
    }
    Ok(acc)
}

/// Split `v` into at most `n` contiguous, near-equal partitions (at least one).
fn split_vec<T>(v: Vec<T>, n: usize) -> Vec<Vec<T>> {
    let len = v.len();
    if n <= 1 || len <= 1 {
        return vec![v];
    }
    chunk_owned(v, len.div_ceil(n))
}

fn chunk_owned<T>(v: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut out = Vec::with_capacity(v.len().div_ceil(size));
    let mut it = v.into_iter().peekable();
    while it.peek().is_some() {
        out.push(it.by_ref().take(size).collect());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregators::{joining_with, to_list};
    use crate::characteristics::Characteristics;

    #[test]
    fn split_vec_is_contiguous_and_capped() {
        let parts = split_vec((0..10).collect::<Vec<_>>(), 3);
        assert_eq!(parts, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
        assert_eq!(split_vec(vec![1, 2], 8).len(), 2);
        assert_eq!(split_vec(Vec::<u8>::new(), 4), vec![Vec::<u8>::new()]);
        assert_eq!(split_vec(vec![1, 2, 3], 0).len(), 1);
    }

    #[test]
    fn merge_rounds_preserve_partition_order() -> Result<()> {
        let agg = joining_with("");
        let partials: Vec<_> = ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(|s| agg.fold([s]))
            .collect::<Result<_>>()?;
        let merged = merge_rounds(&agg, partials, Some(2))?;
        assert_eq!(agg.finish(merged)?, "abcde");
        Ok(())
    }

    #[test]
    fn default_runner_is_parallel() {
        let runner = Runner::default();
        assert!(matches!(runner.mode, ExecMode::Parallel { .. }));
        assert!(runner.default_partitions >= 4);
        assert_eq!(runner.fanout, None);
    }

    #[test]
    fn from_json_fills_defaults() -> Result<()> {
        let runner = Runner::from_json(r#"{ "mode": "sequential" }"#)?;
        assert_eq!(runner.mode, ExecMode::Sequential);
        assert_eq!(runner.default_partitions, Runner::default().default_partitions);
        assert!(Runner::from_json(r#"{ "mode": "sideways" }"#).is_err());
        Ok(())
    }

    #[test]
    fn parallel_run_calls_combiner_and_finisher_once() -> Result<()> {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);
        let agg = Aggregator::of(
            Vec::new,
            |v: &mut Vec<u32>, x| v.push(x),
            |v, other| v.extend(other),
            move |v| {
                counter.fetch_add(1, Ordering::SeqCst);
                v.iter().sum::<u32>()
            },
            Characteristics::empty(),
        );
        let runner = Runner {
            mode: ExecMode::Parallel {
                threads: Some(2),
                partitions: Some(4),
            },
            fanout: Some(2),
            ..Runner::default()
        };
        assert_eq!(runner.run(&agg, (1..=100).collect())?, 5050);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn concurrent_mode_falls_back_for_ordered_aggregators() -> Result<()> {
        let runner = Runner::new(ExecMode::Concurrent {
            threads: None,
            partitions: Some(3),
        });
        let out = runner.run(&to_list(), (0..9).collect())?;
        assert_eq!(out, (0..9).collect::<Vec<_>>());
        Ok(())
    }
}
