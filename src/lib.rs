//! Parallel vector summation.
//!
//! A slice is partitioned into one contiguous chunk per worker, every chunk is
//! summed concurrently, and the partial sums are combined in chunk order. The
//! result always equals the sequential sum of the same slice.

pub mod bench;
pub mod config;
pub mod error;
pub mod partition;
pub mod reduce;
pub mod report;
pub mod workload;

pub use error::{ReduceError, Result};
pub use partition::{partition, Chunk};
pub use reduce::{reduce_parallel, reduce_sequential, Element, Reducer, Reduction, Strategy};
