//! Injectable shuffling for exercise options and practice selection.
//!
//! All randomized ordering in the crate goes through [`Shuffler`], so tests can
//! swap in a deterministic permutation. None of these are cryptographically secure.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

pub trait Shuffler {
    /// Permutes `indices` in place.
    fn shuffle_indices(&mut self, indices: &mut [usize]);
}

/// Uniform Fisher–Yates shuffle over the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomShuffle;

impl Shuffler for RandomShuffle {
    fn shuffle_indices(&mut self, indices: &mut [usize]) {
        indices.shuffle(&mut rand::thread_rng());
    }
}

/// Fisher–Yates over a seeded ChaCha stream, reproducible across runs.
#[derive(Debug, Clone)]
pub struct SeededShuffle {
    rng: ChaCha8Rng,
}

impl SeededShuffle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Shuffler for SeededShuffle {
    fn shuffle_indices(&mut self, indices: &mut [usize]) {
        indices.shuffle(&mut self.rng);
    }
}

/// Leaves the order untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityShuffle;

impl Shuffler for IdentityShuffle {
    fn shuffle_indices(&mut self, _indices: &mut [usize]) {}
}

/// Reorders `items` by a permutation drawn from `shuffler`.
pub fn shuffle_vec<T>(shuffler: &mut dyn Shuffler, items: Vec<T>) -> Vec<T> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    shuffler.shuffle_indices(&mut order);

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|idx| slots.get_mut(idx).and_then(Option::take))
        .collect()
}
