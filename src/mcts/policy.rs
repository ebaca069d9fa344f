//! MCTS policies for selection and rollouts.
//!
//! Policies are trait-based to allow customization:
//! - `SelectionPolicy`: How to score children during descent (PUCT, UCB1)
//! - `RolloutPolicy`: How to play a position out to the end

use crate::core::GameRng;
use crate::rules::{Game, GameResult};

use super::config::MCTSConfig;
use super::node::MCTSNode;

// =============================================================================
// Selection Policy
// =============================================================================

/// Scores a child for selection; the descent follows the highest score.
pub trait SelectionPolicy<G: Game>: Send + Sync {
    fn score(&self, child: &MCTSNode<G>, parent_visits: u32, config: &MCTSConfig) -> f32;
}

/// PUCT selection policy (Predictor + UCB for Trees).
///
/// Uses prior probabilities from the oracle.
/// Formula: Q + c * P * sqrt(N) / (1 + n), with Q = W / (n + 1)
#[derive(Clone, Debug, Default)]
pub struct PUCT;

impl<G: Game> SelectionPolicy<G> for PUCT {
    fn score(&self, child: &MCTSNode<G>, parent_visits: u32, config: &MCTSConfig) -> f32 {
        let u = config.exploration_constant * child.prior * (parent_visits as f32).sqrt()
            / (1.0 + child.visits as f32);
        child.q() + u
    }
}

/// UCB1 (Upper Confidence Bound) selection policy, ignoring priors.
///
/// Formula: Q + c * sqrt(ln(N) / n); unvisited children score infinity.
#[derive(Clone, Debug, Default)]
pub struct UCB1;

impl<G: Game> SelectionPolicy<G> for UCB1 {
    fn score(&self, child: &MCTSNode<G>, parent_visits: u32, config: &MCTSConfig) -> f32 {
        if child.visits == 0 {
            return f32::INFINITY;
        }
        let ln_parent = (parent_visits.max(1) as f32).ln();
        child.mean_value() + config.exploration_constant * (ln_parent / child.visits as f32).sqrt()
    }
}

// =============================================================================
// Rollout Policy
// =============================================================================

/// Plays a position out to a result.
pub trait RolloutPolicy<G: Game>: Send + Sync {
    /// The game is modified during the rollout.
    fn rollout(&self, game: &mut G, rng: &mut GameRng) -> GameResult;
}

/// Uniformly random legal moves until the game ends.
#[derive(Clone, Debug, Default)]
pub struct RandomRollout;

impl<G: Game> RolloutPolicy<G> for RandomRollout {
    fn rollout(&self, game: &mut G, rng: &mut GameRng) -> GameResult {
        loop {
            if let Some(result) = game.result() {
                return result;
            }
            match game.random_move(rng) {
                Some(mut mv) => game.apply(&mut mv),
                None => return GameResult::Draw,
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Index of the highest score, first one on ties.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// Sample an index from a softmax over scores.
///
/// Infinite scores win outright (first one); non-finite sums fall back to argmax.
pub fn sample_softmax(scores: &[f32], rng: &mut GameRng) -> Option<usize> {
    if let Some(i) = scores.iter().position(|&s| s == f32::INFINITY) {
        return Some(i);
    }
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let weights: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    rng.choose_weighted(&weights).or_else(|| argmax(scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::ConnectFour;
    use crate::mcts::node::NodeId;

    fn child(visits: u32, value_sum: f32, prior: f32) -> MCTSNode<ConnectFour> {
        let mut node = MCTSNode::new(ConnectFour::new(), NodeId::new(0), None, prior, 1);
        node.visits = visits;
        node.value_sum = value_sum;
        node
    }

    #[test]
    fn test_puct_formula() {
        let config = MCTSConfig::default();
        let node = child(3, 2.0, 0.5);
        // 2/4 + 5 * 0.5 * sqrt(16) / 4
        let expected = 0.5 + 5.0 * 0.5 * 4.0 / 4.0;
        assert!((SelectionPolicy::score(&PUCT, &node, 16, &config) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_puct_uses_prior() {
        let config = MCTSConfig::default();
        let low = child(10, 5.0, 0.1);
        let high = child(10, 5.0, 0.9);
        assert!(PUCT.score(&high, 20, &config) > PUCT.score(&low, 20, &config));
    }

    #[test]
    fn test_ucb1_prefers_unvisited() {
        let config = MCTSConfig::default().with_exploration(1.4);
        let fresh = child(0, 0.0, 0.0);
        let visited = child(10, 8.0, 0.0);
        assert_eq!(UCB1.score(&fresh, 10, &config), f32::INFINITY);
        assert!(UCB1.score(&visited, 10, &config).is_finite());
    }

    #[test]
    fn test_random_rollout_ends_game() {
        let mut game = ConnectFour::new();
        let mut rng = GameRng::new(7);
        let result = RandomRollout.rollout(&mut game, &mut rng);
        assert!(game.is_over());
        assert_eq!(game.result(), Some(result));
    }

    #[test]
    fn test_argmax_and_sampling() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[]), None);

        let mut rng = GameRng::new(1);
        assert_eq!(sample_softmax(&[0.0, f32::INFINITY, 1.0], &mut rng), Some(1));
        for _ in 0..20 {
            let i = sample_softmax(&[0.0, 1.0, 2.0], &mut rng).unwrap();
            assert!(i < 3);
        }
        // A score far above the rest is picked almost surely.
        assert_eq!(sample_softmax(&[0.0, 100.0], &mut rng), Some(1));
    }
}
