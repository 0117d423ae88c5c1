// Random input vectors for the benchmarks.
// Generation is kept out of every timed region by the callers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const MIN_VALUE: u32 = 1;
pub const MAX_VALUE: u32 = 100;

/// `len` values drawn uniformly from `[MIN_VALUE, MAX_VALUE]`.
///
/// With a seed the vector is reproducible; without one the generator is
/// seeded from system entropy.
pub fn random_vector(len: usize, seed: Option<u64>) -> Vec<u32> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..len).map(|_| rng.gen_range(MIN_VALUE..=MAX_VALUE)).collect()
}
