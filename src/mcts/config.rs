//! MCTS configuration parameters.

use serde::{Deserialize, Serialize};

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MCTSConfig {
    /// Number of batches per search.
    pub max_iterations: u32,

    /// Leaves selected and evaluated together per iteration.
    pub batch_size: usize,

    /// PUCT exploration constant.
    pub exploration_constant: f32,

    /// Weight of the rollout outcome against the oracle value (1 = rollouts only).
    pub lambda: f32,

    /// Dirichlet concentration of the root noise.
    pub noise_alpha: f32,

    /// Share of root priors replaced by noise (0 disables noise).
    pub noise_weight: f32,

    /// Visits added to every node on a selected path until backpropagation.
    pub virtual_visits: u32,

    /// Value removed per virtual visit.
    pub virtual_loss: f32,

    /// Random seed for noise, rollouts and stochastic selection.
    /// Same seed produces deterministic searches.
    pub seed: u64,

    /// Keep the subtree of the position reached by the real moves between searches.
    ///
    /// Reuse needs the move counter to advance between searches and the new
    /// position to equal a stored one. Positions parsed from text restart
    /// their counter at 0, so searches fed parsed positions build fresh trees.
    pub preserve_subtree: bool,

    /// Pick the highest-scoring child instead of sampling from a softmax over scores.
    pub deterministic_selection: bool,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            batch_size: 1,
            exploration_constant: 5.0,
            lambda: 0.5,
            noise_alpha: 0.9,
            noise_weight: 0.25,
            virtual_visits: 5,
            virtual_loss: 1.0,
            seed: 42,
            preserve_subtree: false,
            deterministic_selection: true,
        }
    }
}

impl MCTSConfig {
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Create a new config with custom exploration constant.
    pub fn with_exploration(mut self, c: f32) -> Self {
        self.exploration_constant = c;
        self
    }

    pub fn with_lambda(mut self, lambda: f32) -> Self {
        self.lambda = lambda.clamp(0.0, 1.0);
        self
    }

    pub fn with_noise(mut self, alpha: f32, weight: f32) -> Self {
        self.noise_alpha = alpha;
        self.noise_weight = weight.clamp(0.0, 1.0);
        self
    }

    pub fn with_virtual_loss(mut self, visits: u32, loss: f32) -> Self {
        self.virtual_visits = visits;
        self.virtual_loss = loss;
        self
    }

    /// Create a new config with custom seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_subtree_preservation(mut self, enabled: bool) -> Self {
        self.preserve_subtree = enabled;
        self
    }

    pub fn with_deterministic_selection(mut self, enabled: bool) -> Self {
        self.deterministic_selection = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MCTSConfig::default();
        assert_eq!(config.exploration_constant, 5.0);
        assert_eq!(config.lambda, 0.5);
        assert_eq!(config.noise_alpha, 0.9);
        assert_eq!(config.noise_weight, 0.25);
        assert_eq!(config.virtual_visits, 5);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.seed, 42);
        assert!(config.deterministic_selection);
        assert!(!config.preserve_subtree);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MCTSConfig::default()
            .with_iterations(10)
            .with_batch_size(0)
            .with_exploration(2.0)
            .with_lambda(1.5)
            .with_noise(0.3, 0.0)
            .with_seed(123);

        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.exploration_constant, 2.0);
        assert_eq!(config.lambda, 1.0);
        assert_eq!(config.noise_weight, 0.0);
        assert_eq!(config.seed, 123);
    }

    #[test]
    fn test_serialization() {
        let config = MCTSConfig::default().with_subtree_preservation(true);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: MCTSConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
