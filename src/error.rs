// Error types for partitioning and reduction.

use thiserror::Error;

/// Errors produced while partitioning or reducing a sequence.
#[derive(Debug, Error)]
pub enum ReduceError {
    /// The requested configuration cannot be run (e.g. zero workers).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A worker could not produce its partial sum. Fatal to the whole reduction.
    #[error("worker for chunk {chunk} failed: {reason}")]
    WorkerFailure { chunk: usize, reason: String },

    /// The rayon pool for `Strategy::Pool` could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Parallel and sequential totals disagree.
    #[error("sequential sum {sequential} != parallel sum {parallel} with {workers} workers")]
    EquivalenceMismatch {
        sequential: String,
        parallel: String,
        workers: usize,
    },
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, ReduceError>;
