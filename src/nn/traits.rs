//! Policy oracle traits for guiding search.
//!
//! An oracle maps a batch of positions to move priors and value estimates.
//! Neural networks plug in here; the baselines below need no model.

use thiserror::Error;

use crate::rules::{Game, MoveList};

/// Errors reported by an oracle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    #[error("oracle evaluation failed: {0}")]
    Evaluation(String),

    #[error("oracle returned {found} results for {expected} states")]
    BatchSize { expected: usize, found: usize },

    #[error("policy has {found} entries, action space is {expected}")]
    PolicySize { expected: usize, found: usize },
}

/// Oracle output for one position.
#[derive(Clone, Debug)]
pub struct OracleOutput<M> {
    /// Prior probability per action index (length `Game::ACTION_SPACE`).
    pub priors: Vec<f32>,

    /// Legal moves of the position.
    pub moves: MoveList<M>,

    /// Value estimate in `[-1, 1]` for the side to move.
    pub value: f32,
}

impl<M> OracleOutput<M> {
    /// Prior of one action index, 0 when out of range.
    #[must_use]
    pub fn prior(&self, action: usize) -> f32 {
        self.priors.get(action).copied().unwrap_or(0.0)
    }
}

/// Batched position evaluator.
///
/// Must return exactly one output per input state, in order.
pub trait PolicyOracle<G: Game> {
    fn evaluate(&self, states: &[&G]) -> Result<Vec<OracleOutput<G::Move>>, OracleError>;
}

/// Check an oracle's batch against its input.
pub fn validate_batch<G: Game>(states: usize, outputs: &[OracleOutput<G::Move>]) -> Result<(), OracleError> {
    if outputs.len() != states {
        return Err(OracleError::BatchSize {
            expected: states,
            found: outputs.len(),
        });
    }
    match outputs.iter().find(|o| o.priors.len() != G::ACTION_SPACE) {
        Some(bad) => Err(OracleError::PolicySize {
            expected: G::ACTION_SPACE,
            found: bad.priors.len(),
        }),
        None => Ok(()),
    }
}

/// Uniform priors over the legal moves of a position.
pub fn uniform_priors<G: Game>(moves: &[G::Move]) -> Vec<f32> {
    let mut priors = vec![0.0; G::ACTION_SPACE];
    if !moves.is_empty() {
        let p = 1.0 / moves.len() as f32;
        for mv in moves {
            priors[G::action_index(mv)] = p;
        }
    }
    priors
}

/// Uniform priors and zero value (baseline, and the fallback when an oracle fails).
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformOracle;

impl UniformOracle {
    /// Output for a single position.
    pub fn output<G: Game>(game: &G) -> OracleOutput<G::Move> {
        let moves = game.legal_moves();
        OracleOutput {
            priors: uniform_priors::<G>(&moves),
            moves,
            value: 0.0,
        }
    }
}

impl<G: Game> PolicyOracle<G> for UniformOracle {
    fn evaluate(&self, states: &[&G]) -> Result<Vec<OracleOutput<G::Move>>, OracleError> {
        Ok(states.iter().map(|game| Self::output(*game)).collect())
    }
}

/// Uniform priors with the game's static evaluation squashed into `[-1, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct HeuristicOracle {
    /// Evaluation magnitude mapped to `tanh(1)`.
    pub scale: f32,
}

impl Default for HeuristicOracle {
    fn default() -> Self {
        Self { scale: 10.0 }
    }
}

impl<G: Game> PolicyOracle<G> for HeuristicOracle {
    fn evaluate(&self, states: &[&G]) -> Result<Vec<OracleOutput<G::Move>>, OracleError> {
        Ok(states
            .iter()
            .map(|game| {
                let mut output = UniformOracle::output(*game);
                output.value = (game.evaluate() / self.scale).tanh();
                output
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{ConnectFour, Othello};

    #[test]
    fn test_uniform_oracle() {
        let game = Othello::new();
        let outputs = UniformOracle.evaluate(&[&game]).unwrap();
        assert_eq!(outputs.len(), 1);
        let out = &outputs[0];
        assert_eq!(out.priors.len(), Othello::ACTION_SPACE);
        assert_eq!(out.moves.len(), 4);
        for mv in &out.moves {
            assert!((out.prior(Othello::action_index(mv)) - 0.25).abs() < 1e-6);
        }
        assert_eq!(out.prior(1000), 0.0);
        assert_eq!(out.value, 0.0);
        assert!(validate_batch::<Othello>(1, &outputs).is_ok());
    }

    #[test]
    fn test_heuristic_oracle_value_range() {
        let mut game = ConnectFour::new();
        for col in [0, 1, 0, 1, 0, 1, 0] {
            game.play(col).unwrap();
        }
        let outputs = HeuristicOracle::default().evaluate(&[&game]).unwrap();
        // Yellow to move has lost.
        assert!((outputs[0].value + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_validate_batch() {
        let game = ConnectFour::new();
        let outputs = UniformOracle.evaluate(&[&game, &game]).unwrap();
        assert_eq!(
            validate_batch::<ConnectFour>(3, &outputs),
            Err(OracleError::BatchSize { expected: 3, found: 2 })
        );

        let mut bad = outputs.clone();
        bad[1].priors.pop();
        assert!(matches!(
            validate_batch::<ConnectFour>(2, &bad),
            Err(OracleError::PolicySize { .. })
        ));
    }
}
