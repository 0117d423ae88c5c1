// Sequential and parallel summation of integer slices.
//
// The parallel path partitions the slice, runs one worker per chunk, waits
// for every worker, then adds the partial sums in chunk order. Elements are
// widened into a 128-bit accumulator before adding, so the parallel and
// sequential totals agree for every input regardless of chunking.

mod affinity;
mod pool;
mod threads;

use std::any::Any;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, trace};

use crate::error::{ReduceError, Result};
use crate::partition::{partition, Chunk};

/// Fixed-width integer that can be summed by the reducer.
pub trait Element: Copy + Send + Sync {
    /// Accumulator wide enough that summing any in-memory slice cannot overflow.
    type Acc: Copy
        + Send
        + Sync
        + Default
        + Add<Output = Self::Acc>
        + Sum
        + PartialEq
        + fmt::Debug
        + fmt::Display
        + Serialize;

    fn widen(self) -> Self::Acc;
}

macro_rules! impl_element {
    ($acc:ty => $($t:ty),+) => {
        $(
            impl Element for $t {
                type Acc = $acc;

                #[inline]
                fn widen(self) -> $acc {
                    self as $acc
                }
            }
        )+
    };
}

impl_element!(i128 => i8, i16, i32, i64, isize);
impl_element!(u128 => u8, u16, u32, u64, usize);

/// How workers are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One scoped OS thread per chunk.
    #[default]
    Threads,
    /// A dedicated rayon pool with one thread per chunk.
    Pool,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Threads => f.write_str("threads"),
            Strategy::Pool => f.write_str("pool"),
        }
    }
}

/// Outcome of one reduction call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reduction<A> {
    pub total: A,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub workers: usize,
    /// Partial sums in chunk order. Empty for the sequential path.
    pub partials: Vec<A>,
}

impl<A> Reduction<A> {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Parallel reducer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reducer {
    workers: usize,
    strategy: Strategy,
    pin_workers: bool,
}

impl Reducer {
    pub fn new(workers: usize) -> Self {
        Reducer {
            workers,
            strategy: Strategy::default(),
            pin_workers: false,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Pin worker `i` to core `i % cores` before it starts summing.
    pub fn with_pinned_workers(mut self, pin: bool) -> Self {
        self.pin_workers = pin;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Partition `seq`, sum every chunk concurrently and combine in chunk order.
    ///
    /// The elapsed time covers partitioning, dispatch, the join and the combine.
    pub fn reduce<T: Element>(&self, seq: &[T]) -> Result<Reduction<T::Acc>> {
        let start = Instant::now();

        let chunks = partition(seq.len(), self.workers)?;
        let partials = self.partial_sums(seq, &chunks)?;
        let total = combine(&partials);

        let elapsed = start.elapsed();
        debug!(
            len = seq.len(),
            workers = self.workers,
            strategy = %self.strategy,
            %total,
            elapsed_us = elapsed.as_micros() as u64,
            "parallel reduction finished"
        );

        Ok(Reduction {
            total,
            elapsed,
            workers: self.workers,
            partials,
        })
    }

    /// Run one worker per chunk and return their sums in chunk order.
    ///
    /// Returns only after every worker has finished. If any worker fails, the
    /// failure of the lowest chunk index is returned and no sums are.
    pub fn partial_sums<T: Element>(&self, seq: &[T], chunks: &[Chunk]) -> Result<Vec<T::Acc>> {
        let cores = if self.pin_workers {
            affinity::available_cores()
        } else {
            None
        };

        debug!(
            chunks = chunks.len(),
            strategy = %self.strategy,
            pinned = cores.is_some(),
            "dispatching workers"
        );

        let work = |index: usize, chunk: Chunk| sum_chunk(seq, index, chunk);
        let slots = match self.strategy {
            Strategy::Threads => threads::run(chunks, cores.as_deref(), work),
            Strategy::Pool => pool::run(chunks, cores, work)?,
        };

        collect_slots(slots)
    }
}

/// Single-threaded sum over the whole slice; the correctness oracle and baseline.
pub fn reduce_sequential<T: Element>(seq: &[T]) -> Reduction<T::Acc> {
    let start = Instant::now();
    let total = sum_of(seq);
    let elapsed = start.elapsed();

    Reduction {
        total,
        elapsed,
        workers: 1,
        partials: Vec::new(),
    }
}

/// Parallel sum with `workers` scoped threads.
pub fn reduce_parallel<T: Element>(seq: &[T], workers: usize) -> Result<Reduction<T::Acc>> {
    Reducer::new(workers).reduce(seq)
}

/// A result slot, written once by the worker that owns it.
type Slot<A> = Option<Result<A>>;

fn empty_slots<A>(n: usize) -> Vec<Slot<A>> {
    (0..n).map(|_| None).collect()
}

fn collect_slots<A>(slots: Vec<Slot<A>>) -> Result<Vec<A>> {
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| {
                Err(ReduceError::WorkerFailure {
                    chunk: index,
                    reason: "worker finished without reporting a result".to_string(),
                })
            })
        })
        .collect()
}

fn sum_of<T: Element>(values: &[T]) -> T::Acc {
    values.iter().map(|&v| v.widen()).sum()
}

fn combine<A: Copy + Sum>(partials: &[A]) -> A {
    partials.iter().copied().sum()
}

/// Body shared by every worker: bounds-checked slice, then a plain sum.
fn sum_chunk<T: Element>(seq: &[T], index: usize, chunk: Chunk) -> Result<T::Acc> {
    let values = seq.get(chunk.range()).ok_or_else(|| ReduceError::WorkerFailure {
        chunk: index,
        reason: format!("chunk {} is outside a sequence of length {}", chunk, seq.len()),
    })?;

    let partial = sum_of(values);
    trace!(chunk = index, start = chunk.start, end = chunk.end, %partial, "partial sum");
    Ok(partial)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("worker panicked: {msg}")
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRATEGIES: [Strategy; 2] = [Strategy::Threads, Strategy::Pool];

    #[test]
    fn test_eight_elements_four_workers() {
        let seq: Vec<u32> = (1..=8).collect();
        for strategy in STRATEGIES {
            let result = Reducer::new(4).with_strategy(strategy).reduce(&seq).unwrap();
            assert_eq!(result.partials, vec![3, 7, 11, 15]);
            assert_eq!(result.total, 36);
            assert_eq!(result.workers, 4);
        }
    }

    #[test]
    fn test_single_element_three_workers() {
        let result = reduce_parallel(&[5i32], 3).unwrap();
        assert_eq!(result.partials, vec![0, 0, 5]);
        assert_eq!(result.total, 5);
    }

    #[test]
    fn test_empty_sequence() {
        let seq: [u64; 0] = [];
        for strategy in STRATEGIES {
            let result = Reducer::new(5).with_strategy(strategy).reduce(&seq).unwrap();
            assert_eq!(result.total, 0);
            assert_eq!(result.partials, vec![0; 5]);
        }
        assert_eq!(reduce_sequential(&seq).total, 0);
    }

    #[test]
    fn test_one_worker_matches_sequential() {
        let seq: Vec<i64> = (0..1000).map(|i| i * 7 - 300).collect();
        let par = reduce_parallel(&seq, 1).unwrap();
        assert_eq!(par.partials.len(), 1);
        assert_eq!(par.total, reduce_sequential(&seq).total);
    }

    #[test]
    fn test_zero_workers_rejected() {
        for strategy in STRATEGIES {
            let err = Reducer::new(0).with_strategy(strategy).reduce(&[1u8, 2, 3]).unwrap_err();
            assert!(matches!(err, ReduceError::InvalidConfiguration(_)));
        }
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let seq = vec![i64::MAX, i64::MAX, i64::MIN, 1, i64::MAX];
        let expected = 2 * i64::MAX as i128;
        assert_eq!(expected, seq.iter().map(|&v| v as i128).sum::<i128>());
        assert_eq!(reduce_sequential(&seq).total, expected);
        for workers in 1..=6 {
            assert_eq!(reduce_parallel(&seq, workers).unwrap().total, expected);
        }

        let seq = vec![u64::MAX; 4];
        assert_eq!(reduce_parallel(&seq, 3).unwrap().total, 4 * u64::MAX as u128);
    }

    #[test]
    fn test_out_of_range_chunk_is_a_worker_failure() {
        let seq = [1u32, 2, 3, 4];
        let chunks = [Chunk::new(0, 2), Chunk::new(2, 6)];
        for strategy in STRATEGIES {
            let err = Reducer::new(2)
                .with_strategy(strategy)
                .partial_sums(&seq, &chunks)
                .unwrap_err();
            match err {
                ReduceError::WorkerFailure { chunk, .. } => assert_eq!(chunk, 1),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_inverted_chunk_is_a_worker_failure() {
        let seq = [1u32, 2, 3, 4];
        let chunks = [Chunk::new(3, 1)];
        let err = Reducer::new(1).partial_sums(&seq, &chunks).unwrap_err();
        assert!(matches!(err, ReduceError::WorkerFailure { chunk: 0, .. }));
    }

    #[test]
    fn test_lowest_failing_chunk_is_reported() {
        let seq = [1u8; 4];
        let chunks = [Chunk::new(0, 1), Chunk::new(5, 9), Chunk::new(8, 12)];
        let err = Reducer::new(3).partial_sums(&seq, &chunks).unwrap_err();
        assert!(matches!(err, ReduceError::WorkerFailure { chunk: 1, .. }));
    }

    #[test]
    fn test_repeated_calls_are_stable() {
        let seq: Vec<u16> = (0..5000).map(|i| (i % 100) as u16 + 1).collect();
        let first = reduce_parallel(&seq, 7).unwrap().total;
        for _ in 0..5 {
            assert_eq!(reduce_parallel(&seq, 7).unwrap().total, first);
            assert_eq!(reduce_sequential(&seq).total, first);
        }
    }

    #[test]
    fn test_pinned_workers_still_sum_correctly() {
        let seq: Vec<u32> = (1..=100).collect();
        for strategy in STRATEGIES {
            let result = Reducer::new(4)
                .with_strategy(strategy)
                .with_pinned_workers(true)
                .reduce(&seq)
                .unwrap();
            assert_eq!(result.total, 5050);
        }
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "worker panicked: boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bad"));
        assert_eq!(panic_message(payload.as_ref()), "worker panicked: bad");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "worker panicked");
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Threads.to_string(), "threads");
        assert_eq!(Strategy::Pool.to_string(), "pool");
    }
}
