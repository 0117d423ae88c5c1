// Sequential-vs-parallel comparison and the size x thread-count sweep.

use std::fmt::Display;

use serde::Serialize;
use tracing::info;

use crate::config::SweepConfig;
use crate::error::{ReduceError, Result};
use crate::reduce::{reduce_sequential, Element, Reducer, Reduction, Strategy};
use crate::workload::random_vector;

/// Both reductions of one vector plus the speedup of the parallel path.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison<A> {
    pub size: usize,
    pub threads: usize,
    pub strategy: Strategy,
    pub sequential: Reduction<A>,
    pub parallel: Reduction<A>,
    /// `sequential / parallel` elapsed time; `None` if the parallel time was zero.
    pub speedup: Option<f64>,
}

/// One timed parallel reduction in a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub size: usize,
    pub threads: usize,
    pub strategy: Strategy,
    pub elapsed_secs: f64,
    pub total: u128,
}

/// Fail with `EquivalenceMismatch` unless both totals agree.
pub fn check_equivalence<A: PartialEq + Display>(sequential: &A, parallel: &A, workers: usize) -> Result<()> {
    if sequential == parallel {
        Ok(())
    } else {
        Err(ReduceError::EquivalenceMismatch {
            sequential: sequential.to_string(),
            parallel: parallel.to_string(),
            workers,
        })
    }
}

/// Run the sequential baseline, then `reducer`, and check that the totals match.
pub fn compare<T: Element>(data: &[T], reducer: &Reducer) -> Result<Comparison<T::Acc>> {
    let sequential = reduce_sequential(data);
    let parallel = reducer.reduce(data)?;
    check_equivalence(&sequential.total, &parallel.total, reducer.workers())?;

    let par_secs = parallel.elapsed_secs();
    let speedup = (par_secs > 0.0).then(|| sequential.elapsed_secs() / par_secs);

    info!(
        size = data.len(),
        threads = reducer.workers(),
        seq_secs = sequential.elapsed_secs(),
        par_secs,
        "comparison finished"
    );

    Ok(Comparison {
        size: data.len(),
        threads: reducer.workers(),
        strategy: reducer.strategy(),
        sequential,
        parallel,
        speedup,
    })
}

/// Time the parallel path for every (size, thread count) pair in `config`.
///
/// The config is validated before any vector is generated. One vector is
/// generated per size and reused for all thread counts. Every parallel total
/// is checked against that vector's sequential total.
pub fn sweep(config: &SweepConfig) -> Result<Vec<SweepPoint>> {
    config.validate()?;

    let mut points = Vec::with_capacity(config.sizes.len() * config.thread_counts.len());

    for &size in &config.sizes {
        let data = random_vector(size, config.seed);
        let expected = reduce_sequential(&data).total;

        for &threads in &config.thread_counts {
            let reducer = Reducer::new(threads)
                .with_strategy(config.strategy)
                .with_pinned_workers(config.pin_workers);
            let result = reducer.reduce(&data)?;
            check_equivalence(&expected, &result.total, threads)?;

            info!(size, threads, secs = result.elapsed_secs(), "sweep point");
            points.push(SweepPoint {
                size,
                threads,
                strategy: config.strategy,
                elapsed_secs: result.elapsed_secs(),
                total: result.total,
            });
        }
    }

    Ok(points)
}
