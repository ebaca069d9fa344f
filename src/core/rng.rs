//! Seeded randomness owned by each search.
//!
//! Move sampling for rollouts and random players, softmax sampling during
//! stochastic selection, and Dirichlet noise at the MCTS root all draw from
//! a [`GameRng`]. Two generators built from the same seed produce the same
//! stream, so searches with equal configurations are reproducible.
//!
//! ```
//! use board_search::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.index(4), b.index(4));
//! assert_eq!(a.index(0), None);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Gamma};

/// ChaCha8 generator remembering its seed.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform index in `0..len`, `None` when `len` is zero.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.inner.gen_range(0..len))
    }

    /// Index drawn in proportion to non-negative weights.
    ///
    /// `None` when there is no positive weight to draw from.
    pub fn choose_weighted(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
        if !(total > 0.0) || !total.is_finite() {
            return None;
        }

        let mut threshold = self.inner.gen::<f32>() * total;
        for (i, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            threshold -= weight;
            if threshold <= 0.0 {
                return Some(i);
            }
        }
        // Rounding left a sliver past the end.
        weights.iter().rposition(|&w| w > 0.0)
    }

    /// Symmetric Dirichlet sample with `n` components.
    ///
    /// Normalized Gamma(alpha, 1) draws; uniform when `alpha` is not
    /// positive or every draw underflows.
    pub fn dirichlet(&mut self, alpha: f32, n: usize) -> Vec<f32> {
        if n == 0 {
            return Vec::new();
        }
        let uniform = || vec![1.0 / n as f32; n];
        let Ok(gamma) = Gamma::new(alpha, 1.0) else {
            return uniform();
        };

        let samples: Vec<f32> = (0..n).map(|_| gamma.sample(&mut self.inner)).collect();
        let sum: f32 = samples.iter().sum();
        if sum <= 0.0 || !sum.is_finite() {
            return uniform();
        }
        samples.into_iter().map(|s| s / sum).collect()
    }
}
