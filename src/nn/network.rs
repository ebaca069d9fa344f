//! Adapter from a policy-value network to a [`PolicyOracle`].

use crate::nn::encoder::{encode_batch, masked_softmax, EncodedState};
use crate::nn::traits::{OracleError, OracleOutput, PolicyOracle};
use crate::rules::Game;

/// A network producing policy logits and a scalar value per batch row.
///
/// Input is a `[batch, features]` tensor. Logits cover the game's whole
/// action space; illegal entries are masked out by [`NetworkOracle`].
pub trait PolicyValueNetwork: Send + Sync {
    fn predict_batch(&self, batch: &EncodedState) -> Result<Vec<(Vec<f32>, f32)>, OracleError>;
}

/// Oracle backed by a [`PolicyValueNetwork`].
#[derive(Clone, Debug)]
pub struct NetworkOracle<N> {
    network: N,
}

impl<N> NetworkOracle<N> {
    pub fn new(network: N) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &N {
        &self.network
    }
}

impl<G: Game, N: PolicyValueNetwork> PolicyOracle<G> for NetworkOracle<N> {
    fn evaluate(&self, states: &[&G]) -> Result<Vec<OracleOutput<G::Move>>, OracleError> {
        let batch = encode_batch(states);
        let predictions = self.network.predict_batch(&batch)?;
        if predictions.len() != states.len() {
            return Err(OracleError::BatchSize {
                expected: states.len(),
                found: predictions.len(),
            });
        }

        states
            .iter()
            .zip(predictions)
            .map(|(game, (logits, value))| {
                if logits.len() != G::ACTION_SPACE {
                    return Err(OracleError::PolicySize {
                        expected: G::ACTION_SPACE,
                        found: logits.len(),
                    });
                }
                Ok(OracleOutput {
                    priors: masked_softmax(&logits, &game.action_mask()),
                    moves: game.legal_moves(),
                    value: value.clamp(-1.0, 1.0),
                })
            })
            .collect()
    }
}
