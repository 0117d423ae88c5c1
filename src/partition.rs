// Splits an index range into one contiguous chunk per worker.
// The remainder of len / workers always goes to the last chunk, so chunk
// boundaries are reproducible for a given (len, workers) pair.

use std::fmt;
use std::ops::Range;

use crate::error::{ReduceError, Result};

/// Half-open index range `[start, end)` handed to a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunk {
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn new(start: usize, end: usize) -> Self {
        Chunk { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Partition `len` elements into exactly `workers` chunks.
///
/// Every chunk but the last has `len / workers` elements; the last one ends at
/// `len`. With more workers than elements the leading chunks are empty.
pub fn partition(len: usize, workers: usize) -> Result<Vec<Chunk>> {
    if workers == 0 {
        return Err(ReduceError::InvalidConfiguration(
            "worker count must be at least 1".to_string(),
        ));
    }

    let base = len / workers;
    let chunks = (0..workers)
        .map(|i| {
            let start = i * base;
            let end = if i == workers - 1 { len } else { start + base };
            Chunk::new(start, end)
        })
        .collect();

    Ok(chunks)
}
