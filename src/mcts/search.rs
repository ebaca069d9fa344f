//! Batched, oracle-guided MCTS.
//!
//! Each iteration selects a batch of leaves, marking every node on their
//! paths with virtual loss so later selections in the same batch spread
//! out. The whole batch goes to the oracle in one call, new leaves are
//! expanded with the returned priors, and leaf values blend the oracle's
//! estimate with a random rollout.

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::core::{GameRng, SearchError};
use crate::nn::{validate_batch, OracleOutput, PolicyOracle, UniformOracle};
use crate::rules::Game;

use super::config::MCTSConfig;
use super::node::{MCTSNode, NodeId};
use super::policy::{argmax, sample_softmax, RandomRollout, RolloutPolicy, SelectionPolicy, PUCT};
use super::stats::SearchStats;
use super::tree::MCTSTree;

/// Main MCTS search context.
///
/// Owns the oracle, the configuration and, between searches, the tree of
/// the last search.
pub struct MCTSSearch<G: Game, O> {
    oracle: O,

    config: MCTSConfig,

    /// Tree of the last search, kept for diagnostics and subtree reuse.
    tree: Option<MCTSTree<G>>,

    /// RNG for noise, rollouts and stochastic selection.
    rng: GameRng,

    selection: Box<dyn SelectionPolicy<G>>,

    rollout: Box<dyn RolloutPolicy<G>>,

    stats: SearchStats,

    /// Move counter of the position given to the last search.
    last_move_counter: Option<u32>,
}

impl<G: Game, O: PolicyOracle<G>> MCTSSearch<G, O> {
    pub fn new(oracle: O, config: MCTSConfig) -> Self {
        let rng = GameRng::new(config.seed);
        Self {
            oracle,
            config,
            tree: None,
            rng,
            selection: Box::new(PUCT),
            rollout: Box::new(RandomRollout),
            stats: SearchStats::default(),
            last_move_counter: None,
        }
    }

    /// Set a custom selection policy.
    pub fn with_selection<S: SelectionPolicy<G> + 'static>(mut self, selection: S) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Set a custom rollout policy.
    pub fn with_rollout<R: RolloutPolicy<G> + 'static>(mut self, rollout: R) -> Self {
        self.rollout = Box::new(rollout);
        self
    }

    /// Run `max_iterations` batches from `game` and return the most visited move.
    pub fn search(&mut self, game: &G) -> Result<G::Move, SearchError> {
        let start = Instant::now();
        self.stats.reset();

        if game.is_over() {
            return Err(SearchError::GameOver);
        }

        let mut tree = match self.reusable_tree(game) {
            Some(tree) => {
                self.stats.reused_subtree = true;
                tree
            }
            None => MCTSTree::new(game.copy(true)),
        };

        self.prepare_root(&mut tree)?;
        for _ in 0..self.config.max_iterations {
            self.run_batch(&mut tree);
            self.stats.iterations += 1;
        }

        let best = Self::most_visited_child(&tree)?;
        let node = tree.get(best);
        let best_move = node.mv.clone().ok_or(SearchError::EmptyTree)?;
        self.stats.best_visits = node.visits;
        self.stats.best_value = node.mean_value();
        self.stats.time_us = start.elapsed().as_micros() as u64;
        self.last_move_counter = Some(game.move_counter());

        debug!(
            game = G::NAME,
            best = %best_move,
            visits = self.stats.best_visits,
            value = self.stats.best_value,
            nodes = tree.len(),
            reused = self.stats.reused_subtree,
            time_us = self.stats.time_us,
            "mcts search finished"
        );

        self.tree = Some(tree);
        Ok(best_move)
    }

    /// The previous tree re-rooted at `game`, if subtree reuse applies.
    ///
    /// Reuse is attempted only when the move counter has advanced since the
    /// last search; the new root is looked up among the nodes at most two
    /// plies below the old root.
    fn reusable_tree(&mut self, game: &G) -> Option<MCTSTree<G>> {
        if !self.config.preserve_subtree {
            return None;
        }
        let last = self.last_move_counter?;
        let mut tree = self.tree.take()?;
        if last >= game.move_counter() {
            debug!(last, current = game.move_counter(), "move counter did not advance, new tree");
            return None;
        }

        let found = tree
            .descendants(2)
            .into_iter()
            .find(|&id| tree.get(id).state == *game);
        match found {
            Some(id) => {
                tree.promote(id);
                Some(tree)
            }
            None => {
                debug!("position not found in previous tree, new tree");
                None
            }
        }
    }

    /// Root priors with fresh noise; expands the root if needed.
    fn prepare_root(&mut self, tree: &mut MCTSTree<G>) -> Result<(), SearchError> {
        let root = tree.root();
        let output = self
            .evaluate_batch(&[&tree.get(root).state])
            .pop()
            .ok_or(SearchError::EmptyTree)?;
        let priors = self.noisy_priors(&output);

        if tree.get(root).expanded {
            let children = tree.get(root).children.clone();
            for child in children {
                let node = tree.get_mut(child);
                if let Some(mv) = &node.mv {
                    node.prior = priors.get(G::action_index(mv)).copied().unwrap_or(0.0);
                }
            }
        } else {
            self.expand(tree, root, &output.moves, &priors);
        }
        tree.root_node_mut().visits += 1;

        if tree.root_node().children.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }
        Ok(())
    }

    /// `(1 - w) * prior + w * noise` over the legal moves.
    fn noisy_priors(&mut self, output: &OracleOutput<G::Move>) -> Vec<f32> {
        let mut priors = output.priors.clone();
        let weight = self.config.noise_weight;
        if weight <= 0.0 || output.moves.is_empty() {
            return priors;
        }
        let noise = self.rng.dirichlet(self.config.noise_alpha, output.moves.len());
        for (mv, eta) in output.moves.iter().zip(noise) {
            if let Some(p) = priors.get_mut(G::action_index(mv)) {
                *p = (1.0 - weight) * *p + weight * eta;
            }
        }
        priors
    }

    fn run_batch(&mut self, tree: &mut MCTSTree<G>) {
        let batch_size = self.config.batch_size.max(1);
        let leaves: Vec<NodeId> = (0..batch_size).map(|_| self.select_leaf(tree)).collect();

        let outputs = {
            let states: Vec<&G> = leaves.iter().map(|&id| &tree.get(id).state).collect();
            self.evaluate_batch(&states)
        };

        for (&leaf, output) in leaves.iter().zip(&outputs) {
            let node = tree.get(leaf);
            // A leaf picked twice in one batch is expanded once.
            if !node.terminal && !node.expanded {
                self.expand(tree, leaf, &output.moves, &output.priors);
            }
        }

        let mut values = Vec::with_capacity(leaves.len());
        for (&leaf, output) in leaves.iter().zip(&outputs) {
            values.push(self.leaf_value(&tree.get(leaf).state, output.value));
        }

        for (&leaf, value) in leaves.iter().zip(values) {
            self.backpropagate(tree, leaf, value);
        }
        self.stats.leaves += leaves.len() as u32;
        trace!(batch = leaves.len(), nodes = tree.len(), "batch evaluated");
    }

    /// Descend from the root to a leaf, adding virtual loss along the path.
    fn select_leaf(&mut self, tree: &mut MCTSTree<G>) -> NodeId {
        let mut current = tree.root();
        self.add_virtual_loss(tree, current);

        loop {
            let node = tree.get(current);
            if node.terminal || !node.expanded || node.children.is_empty() {
                return current;
            }

            let parent_visits = node.visits;
            let scores: Vec<f32> = node
                .children
                .iter()
                .map(|&child| self.selection.score(tree.get(child), parent_visits, &self.config))
                .collect();
            let pick = if self.config.deterministic_selection {
                argmax(&scores)
            } else {
                sample_softmax(&scores, &mut self.rng)
            };
            let Some(i) = pick else {
                return current;
            };

            current = node.children[i];
            self.stats.nodes += 1;
            self.add_virtual_loss(tree, current);
        }
    }

    fn add_virtual_loss(&self, tree: &mut MCTSTree<G>, id: NodeId) {
        let node = tree.get_mut(id);
        node.visits += self.config.virtual_visits;
        node.value_sum -= self.config.virtual_visits as f32 * self.config.virtual_loss;
    }

    /// Create one child per move, with priors indexed by action.
    fn expand(&mut self, tree: &mut MCTSTree<G>, id: NodeId, moves: &[G::Move], priors: &[f32]) {
        let state = tree.get(id).state.clone();
        for mv in moves {
            let mut mv = mv.clone();
            let mut child = state.clone();
            child.apply(&mut mv);
            let prior = priors.get(G::action_index(&mv)).copied().unwrap_or(0.0);
            tree.add_child(id, mv, child, prior);
        }
        tree.get_mut(id).expanded = true;
        self.stats.nodes_expanded += 1;
    }

    /// Value of a leaf for the player who moved into it.
    ///
    /// Terminal leaves score their exact outcome; others blend the oracle
    /// estimate and a rollout outcome by `lambda`.
    fn leaf_value(&mut self, state: &G, estimate: f32) -> f32 {
        let to_move = state.to_move();
        if let Some(result) = state.result() {
            return -result.value_for(to_move);
        }

        let lambda = self.config.lambda;
        let rollout = if lambda > 0.0 {
            let mut game = state.clone();
            let result = self.rollout.rollout(&mut game, &mut self.rng);
            self.stats.rollouts += 1;
            self.stats.nodes += u64::from(game.move_counter().saturating_sub(state.move_counter()));
            result.value_for(to_move)
        } else {
            0.0
        };
        let estimate = if lambda < 1.0 { estimate } else { 0.0 };

        (1.0 - lambda) * -estimate + lambda * -rollout
    }

    /// Remove virtual loss and add the real visit, flipping sign each ply.
    fn backpropagate(&self, tree: &mut MCTSTree<G>, leaf: NodeId, mut value: f32) {
        let virtual_visits = self.config.virtual_visits;
        let virtual_value = virtual_visits as f32 * self.config.virtual_loss;

        let mut current = leaf;
        while !current.is_none() {
            let node = tree.get_mut(current);
            node.visits = node.visits.saturating_sub(virtual_visits) + 1;
            node.value_sum += virtual_value + value;
            value = -value;
            current = node.parent;
        }
    }

    /// Evaluate states with the oracle, falling back to uniform priors.
    fn evaluate_batch(&mut self, states: &[&G]) -> Vec<OracleOutput<G::Move>> {
        let result = self
            .oracle
            .evaluate(states)
            .and_then(|outputs| validate_batch::<G>(states.len(), &outputs).map(|()| outputs));
        match result {
            Ok(outputs) => outputs,
            Err(err) => {
                warn!(%err, batch = states.len(), "oracle failed, using uniform priors");
                self.stats.oracle_failures += 1;
                states.iter().map(|game| UniformOracle::output(*game)).collect()
            }
        }
    }

    /// Root child with the most visits; the first one on ties.
    fn most_visited_child(tree: &MCTSTree<G>) -> Result<NodeId, SearchError> {
        let mut best: Option<(NodeId, u32)> = None;
        for &child in &tree.root_node().children {
            let visits = tree.get(child).visits;
            if best.map_or(true, |(_, most)| visits > most) {
                best = Some((child, visits));
            }
        }
        best.map(|(child, _)| child).ok_or(SearchError::EmptyTree)
    }

    fn root_children(&self) -> impl Iterator<Item = &MCTSNode<G>> {
        self.tree
            .iter()
            .flat_map(|tree| tree.root_node().children.iter().map(move |&c| tree.get(c)))
    }

    /// Root moves with their visit counts (for training).
    pub fn action_visits(&self) -> Vec<(G::Move, u32)> {
        self.root_children()
            .filter_map(|node| node.mv.clone().map(|mv| (mv, node.visits)))
            .collect()
    }

    /// Root moves with visit shares summing to 1 (uniform before any visit).
    pub fn action_probabilities(&self) -> Vec<(G::Move, f32)> {
        let visits = self.action_visits();
        let total: u32 = visits.iter().map(|(_, v)| v).sum();
        let count = visits.len().max(1) as f32;
        visits
            .into_iter()
            .map(|(mv, v)| {
                let p = if total == 0 { 1.0 / count } else { v as f32 / total as f32 };
                (mv, p)
            })
            .collect()
    }

    /// Visit shares laid out over the action space.
    pub fn policy_target(&self) -> Vec<f32> {
        let mut target = vec![0.0; G::ACTION_SPACE];
        for (mv, p) in self.action_probabilities() {
            target[G::action_index(&mv)] = p;
        }
        target
    }

    /// Get search statistics.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Tree of the last search.
    #[must_use]
    pub fn tree(&self) -> Option<&MCTSTree<G>> {
        self.tree.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{ConnectFour, ConnectFourMove, Othello};
    use crate::mcts::UCB1;
    use crate::nn::{HeuristicOracle, OracleError};

    struct FailingOracle;

    impl PolicyOracle<ConnectFour> for FailingOracle {
        fn evaluate(
            &self,
            _states: &[&ConnectFour],
        ) -> Result<Vec<OracleOutput<ConnectFourMove>>, OracleError> {
            Err(OracleError::Evaluation("no model".into()))
        }
    }

    fn config(iterations: u32) -> MCTSConfig {
        MCTSConfig::default().with_iterations(iterations).with_seed(12345)
    }

    #[test]
    fn test_search_returns_legal_move() {
        let game = Othello::new();
        let mut search = MCTSSearch::new(UniformOracle, config(50));
        let mv = search.search(&game).unwrap();
        assert!(game.legal_moves().contains(&mv));
    }

    #[test]
    fn test_root_visits_count_every_leaf() {
        let game = ConnectFour::new();
        let mut search = MCTSSearch::new(UniformOracle, config(30).with_batch_size(4));
        search.search(&game).unwrap();

        let tree = search.tree().unwrap();
        let root = tree.root_node();
        assert_eq!(root.visits, 30 * 4 + 1);
        let child_visits: u32 = root.children.iter().map(|&c| tree.get(c).visits).sum();
        assert!(root.visits >= child_visits);
        assert_eq!(search.stats().leaves, 120);
    }

    #[test]
    fn test_children_match_legal_moves() {
        let game = ConnectFour::new();
        let mut search = MCTSSearch::new(UniformOracle, config(40));
        search.search(&game).unwrap();

        let tree = search.tree().unwrap();
        for (_, node) in tree.iter() {
            if node.expanded {
                assert_eq!(node.children.len(), node.state.legal_moves().len());
            }
        }
    }

    #[test]
    fn test_takes_immediate_win() {
        let mut game = ConnectFour::new();
        for col in [0, 0, 1, 1, 2, 2] {
            game.play(col).unwrap();
        }
        let mut search = MCTSSearch::new(HeuristicOracle::default(), config(200));
        let mv = search.search(&game).unwrap();
        assert_eq!(mv.column(), 3);
        assert!(search.stats().best_value > 0.9);
    }

    #[test]
    fn test_search_deterministic() {
        let game = Othello::new();
        let mut a = MCTSSearch::new(UniformOracle, config(60).with_deterministic_selection(false));
        let mut b = MCTSSearch::new(UniformOracle, config(60).with_deterministic_selection(false));
        assert_eq!(a.search(&game).unwrap(), b.search(&game).unwrap());
        assert_eq!(a.action_visits(), b.action_visits());
    }

    #[test]
    fn test_oracle_failure_falls_back_to_uniform() {
        let game = ConnectFour::new();
        let mut search = MCTSSearch::new(FailingOracle, config(10));
        let mv = search.search(&game).unwrap();
        assert!(mv.column() < 7);
        assert_eq!(search.stats().oracle_failures, 11);
    }

    #[test]
    fn test_finished_game_is_an_error() {
        let mut game = ConnectFour::new();
        for col in [0, 1, 0, 1, 0, 1, 0] {
            game.play(col).unwrap();
        }
        let mut search = MCTSSearch::new(UniformOracle, config(10));
        assert!(matches!(search.search(&game), Err(SearchError::GameOver)));
    }

    #[test]
    fn test_action_probabilities() {
        let game = ConnectFour::new();
        let mut search = MCTSSearch::new(UniformOracle, config(50));
        search.search(&game).unwrap();

        let sum: f32 = search.action_probabilities().iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-4);
        let target = search.policy_target();
        assert_eq!(target.len(), 7);
        assert!((target.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_ucb1_selection() {
        let game = ConnectFour::new();
        let mut search =
            MCTSSearch::new(UniformOracle, config(30).with_exploration(1.4)).with_selection(UCB1);
        search.search(&game).unwrap();
        // UCB1 visits every root child before revisiting any.
        let tree = search.tree().unwrap();
        assert!(tree.root_node().children.iter().all(|&c| tree.get(c).visits > 0));
    }

    #[test]
    fn test_subtree_reuse() {
        let mut game = ConnectFour::new();
        let mut search = MCTSSearch::new(UniformOracle, config(100).with_subtree_preservation(true));

        let mut mv = search.search(&game).unwrap();
        game.apply(&mut mv);
        game.play(3).unwrap();

        search.search(&game).unwrap();
        assert!(search.stats().reused_subtree);
        assert_eq!(search.tree().unwrap().root_node().state, game.copy(true));

        // Same position again: counter did not advance, so a new tree is built.
        search.search(&game).unwrap();
        assert!(!search.stats().reused_subtree);
        assert_eq!(search.tree().unwrap().root_node().visits, 101);
    }
}
