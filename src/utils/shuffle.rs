// src/utils/shuffle.rs

use std::sync::Mutex;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Source of question orderings.
pub trait Shuffler: Send + Sync {
    /// Permutes `ids` in place.
    fn shuffle(&self, ids: &mut [i64]);
}

/// Uniform shuffle from the thread-local RNG. Every call is independent.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngShuffler;

impl Shuffler for ThreadRngShuffler {
    fn shuffle(&self, ids: &mut [i64]) {
        ids.shuffle(&mut rand::thread_rng());
    }
}

/// Reproducible shuffle from a fixed seed.
/// Successive calls still differ; the whole sequence repeats for the same seed.
#[derive(Debug)]
pub struct SeededShuffler {
    rng: Mutex<StdRng>,
}

impl SeededShuffler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Shuffler for SeededShuffler {
    fn shuffle(&self, ids: &mut [i64]) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ids.shuffle(&mut *rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
        ids.sort_unstable();
        ids
    }

    #[test]
    fn shuffles_are_permutations() {
        let original: Vec<i64> = (1..=50).collect();
        for shuffler in [
            Box::new(ThreadRngShuffler) as Box<dyn Shuffler>,
            Box::new(SeededShuffler::new(7)),
        ] {
            let mut ids = original.clone();
            shuffler.shuffle(&mut ids);
            assert_eq!(sorted(ids), original);
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = SeededShuffler::new(42);
        let b = SeededShuffler::new(42);
        for _ in 0..3 {
            let mut x: Vec<i64> = (1..=20).collect();
            let mut y = x.clone();
            a.shuffle(&mut x);
            b.shuffle(&mut y);
            assert_eq!(x, y);
        }
    }

    #[test]
    fn empty_and_single_are_untouched() {
        let s = SeededShuffler::new(1);
        let mut empty: Vec<i64> = vec![];
        s.shuffle(&mut empty);
        assert!(empty.is_empty());
        let mut one = vec![9];
        s.shuffle(&mut one);
        assert_eq!(one, vec![9]);
    }
}
