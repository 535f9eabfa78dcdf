//! Small draws from the simulation's seeded stream.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

/// Uniform-enough index into a non-empty slice of length `len`.
pub(crate) fn random_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    debug_assert!(len > 0);
    (rng.next_u64() % len.max(1) as u64) as usize
}

/// True with probability `numerator / denominator`.
pub(crate) fn one_in(rng: &mut ChaCha8Rng, numerator: u64, denominator: u64) -> bool {
    rng.next_u64() % denominator.max(1) < numerator
}
