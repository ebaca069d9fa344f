//! Sequential value search parameters.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SVSConfig {
    /// Rollouts per legal root move; the search runs `rollouts_per_move * moves` rollouts.
    pub rollouts_per_move: u32,

    /// Random plies played from the sampled child before the oracle values it.
    pub rollout_depth: u32,

    /// Dirichlet concentration of the root noise.
    pub noise_alpha: f32,

    /// Share of root priors replaced by noise (0 disables noise).
    pub noise_weight: f32,

    /// Losses credited to every root move before sampling starts.
    pub virtual_visits: u32,

    pub seed: u64,
}

impl Default for SVSConfig {
    fn default() -> Self {
        Self {
            rollouts_per_move: 10,
            rollout_depth: 5,
            noise_alpha: 0.3,
            noise_weight: 0.25,
            virtual_visits: 0,
            seed: 42,
        }
    }
}

impl SVSConfig {
    pub fn with_rollouts_per_move(mut self, rollouts: u32) -> Self {
        self.rollouts_per_move = rollouts;
        self
    }

    pub fn with_rollout_depth(mut self, depth: u32) -> Self {
        self.rollout_depth = depth;
        self
    }

    pub fn with_noise(mut self, alpha: f32, weight: f32) -> Self {
        self.noise_alpha = alpha;
        self.noise_weight = weight.clamp(0.0, 1.0);
        self
    }

    pub fn with_virtual_visits(mut self, visits: u32) -> Self {
        self.virtual_visits = visits;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
