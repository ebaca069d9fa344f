//! Prior-weighted sampling of root moves with short rollouts.
//!
//! Each sample picks a root move in proportion to its noisy prior, plays up
//! to `rollout_depth` random plies from the resulting position and either
//! scores the finished game exactly or queues the position for the oracle.
//! All queued positions go to the oracle in a single batch at the end.

use std::time::Instant;

use tracing::{debug, warn};

use crate::core::{GameRng, PlayerId, SearchError};
use crate::nn::{validate_batch, OracleOutput, PolicyOracle, UniformOracle};
use crate::rules::{Game, MoveList};

use super::config::SVSConfig;
use super::stats::SVSStats;

/// Sequential value search context.
pub struct SVSSearch<G: Game, O> {
    oracle: O,

    config: SVSConfig,

    rng: GameRng,

    stats: SVSStats,

    /// Root moves of the last search with their sample counts and value sums.
    moves: MoveList<G::Move>,
    visits: Vec<u32>,
    value_sums: Vec<f32>,
}

impl<G: Game, O: PolicyOracle<G>> SVSSearch<G, O> {
    pub fn new(oracle: O, config: SVSConfig) -> Self {
        let rng = GameRng::new(config.seed);
        Self {
            oracle,
            config,
            rng,
            stats: SVSStats::default(),
            moves: MoveList::new(),
            visits: Vec::new(),
            value_sums: Vec::new(),
        }
    }

    pub fn config(&self) -> &SVSConfig {
        &self.config
    }

    pub fn stats(&self) -> &SVSStats {
        &self.stats
    }

    /// Sample root moves, roll them out and return the best mean value.
    pub fn search(&mut self, game: &G) -> Result<G::Move, SearchError> {
        let start = Instant::now();
        self.stats.reset();
        self.moves.clear();
        self.visits.clear();
        self.value_sums.clear();

        if game.is_over() {
            return Err(SearchError::GameOver);
        }
        let root = game.copy(true);
        let output = self.evaluate_batch(&[&root]).pop().ok_or(SearchError::NoLegalMoves)?;
        let moves = output.moves.clone();
        match moves.len() {
            0 => return Err(SearchError::NoLegalMoves),
            1 => {
                self.stats.time_us = start.elapsed().as_micros() as u64;
                return Ok(moves[0].clone());
            }
            _ => {}
        }

        let priors = self.move_priors(&output);
        self.stats.prior_max = priors.iter().copied().fold(0.0, f32::max);

        let children: Vec<G> = moves
            .iter()
            .map(|mv| {
                let mut child = root.clone();
                let mut mv = mv.clone();
                child.apply(&mut mv);
                child
            })
            .collect();

        let virtual_visits = self.config.virtual_visits;
        self.visits = vec![virtual_visits; moves.len()];
        self.value_sums = vec![-(virtual_visits as f32); moves.len()];

        let player = root.to_move();
        let rollouts = self.config.rollouts_per_move as usize * moves.len();
        let mut pending: Vec<(usize, G)> = Vec::new();

        for _ in 0..rollouts {
            let i = match self.rng.choose_weighted(&priors) {
                Some(i) => i,
                None => self.rng.index(moves.len()).ok_or(SearchError::NoLegalMoves)?,
            };
            self.visits[i] += 1;
            self.stats.rollouts += 1;

            let leaf = self.rollout(&children[i]);
            match leaf.result() {
                Some(result) => self.value_sums[i] += result.value_for(player),
                None => pending.push((i, leaf)),
            }
        }

        if !pending.is_empty() {
            let states: Vec<&G> = pending.iter().map(|(_, leaf)| leaf).collect();
            let outputs = self.evaluate_batch(&states);
            self.stats.oracle_leaves = states.len() as u32;
            for ((i, leaf), output) in pending.iter().zip(&outputs) {
                self.value_sums[*i] += output.value * perspective(leaf.to_move(), player);
            }
        }

        let mut best: Option<(usize, f32)> = None;
        for i in 0..moves.len() {
            let value = self.mean_value(i);
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((i, value));
            }
        }
        let (best_index, best_value) = best.ok_or(SearchError::NoLegalMoves)?;
        let best_move = moves[best_index].clone();
        self.stats.best_value = best_value;
        self.stats.time_us = start.elapsed().as_micros() as u64;
        self.moves = moves;

        debug!(
            game = G::NAME,
            best = %best_move,
            value = best_value,
            rollouts = self.stats.rollouts,
            oracle_leaves = self.stats.oracle_leaves,
            time_us = self.stats.time_us,
            "svs search finished"
        );
        Ok(best_move)
    }

    /// Root moves of the last search with sample counts and mean values.
    ///
    /// Empty when the last search returned early.
    pub fn action_values(&self) -> Vec<(G::Move, u32, f32)> {
        self.moves
            .iter()
            .enumerate()
            .map(|(i, mv)| (mv.clone(), self.visits[i], self.mean_value(i)))
            .collect()
    }

    /// Value sum over samples plus one, so unsampled moves score 0.
    fn mean_value(&self, i: usize) -> f32 {
        self.value_sums[i] / (self.visits[i] + 1) as f32
    }

    fn rollout(&mut self, child: &G) -> G {
        let mut leaf = child.clone();
        for _ in 0..self.config.rollout_depth {
            self.stats.nodes += 1;
            if leaf.is_over() {
                break;
            }
            match leaf.random_move(&mut self.rng) {
                Some(mut mv) => leaf.apply(&mut mv),
                None => break,
            }
        }
        leaf
    }

    /// Priors per legal move, mixed with Dirichlet noise.
    fn move_priors(&mut self, output: &OracleOutput<G::Move>) -> Vec<f32> {
        let mut priors: Vec<f32> = output.moves.iter().map(|mv| output.prior(G::action_index(mv))).collect();
        let weight = self.config.noise_weight;
        if weight > 0.0 {
            let noise = self.rng.dirichlet(self.config.noise_alpha, priors.len());
            for (p, eta) in priors.iter_mut().zip(noise) {
                *p = (1.0 - weight) * *p + weight * eta;
            }
        }
        priors
    }

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
}

/// Sign turning a value for `side` into one for `player`.
fn perspective(side: PlayerId, player: PlayerId) -> f32 {
    if side == player {
        1.0
    } else {
        -1.0
    }
}
