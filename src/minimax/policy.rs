//! Move ordering and leaf evaluation for alpha-beta.
//!
//! - `MoveOrdering`: order in which moves are searched at each node
//! - `LeafEvaluator`: value of a non-terminal position at depth 0

use tracing::warn;

use crate::nn::PolicyOracle;
use crate::rules::Game;

// =============================================================================
// Move Ordering
// =============================================================================

pub trait MoveOrdering<G: Game>: Send + Sync {
    /// Reorder `moves` in place. `preferred` is an action index to try first.
    fn order(&self, game: &G, moves: &mut [G::Move], preferred: Option<usize>);
}

/// Generation order, apart from the preferred move.
#[derive(Clone, Debug, Default)]
pub struct NoOrdering;

impl<G: Game> MoveOrdering<G> for NoOrdering {
    fn order(&self, _game: &G, moves: &mut [G::Move], preferred: Option<usize>) {
        if let Some(preferred) = preferred {
            if let Some(pos) = moves.iter().position(|m| G::action_index(m) == preferred) {
                moves[..=pos].rotate_right(1);
            }
        }
    }
}

/// The game's own ordering heuristic.
#[derive(Clone, Debug, Default)]
pub struct GameOrdering;

impl<G: Game> MoveOrdering<G> for GameOrdering {
    fn order(&self, game: &G, moves: &mut [G::Move], preferred: Option<usize>) {
        game.order_moves(moves, preferred);
    }
}

/// Orders moves by descending oracle prior.
///
/// Falls back to the game's ordering when the oracle fails.
#[derive(Clone, Debug)]
pub struct OracleOrdering<O> {
    oracle: O,
}

impl<O> OracleOrdering<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }
}

impl<G: Game, O: PolicyOracle<G> + Send + Sync> MoveOrdering<G> for OracleOrdering<O> {
    fn order(&self, game: &G, moves: &mut [G::Move], preferred: Option<usize>) {
        let output = match self.oracle.evaluate(&[game]) {
            Ok(mut outputs) if outputs.len() == 1 => outputs.swap_remove(0),
            Ok(outputs) => {
                warn!(found = outputs.len(), "oracle ordering returned a bad batch");
                return game.order_moves(moves, preferred);
            }
            Err(err) => {
                warn!(%err, "oracle ordering failed, using game ordering");
                return game.order_moves(moves, preferred);
            }
        };

        // Stable sort keeps generation order among equal priors.
        moves.sort_by(|a, b| {
            let pa = output.prior(G::action_index(a));
            let pb = output.prior(G::action_index(b));
            pb.total_cmp(&pa)
        });
        NoOrdering.order(game, moves, preferred);
    }
}

// =============================================================================
// Leaf Evaluation
// =============================================================================

pub trait LeafEvaluator<G: Game>: Send + Sync {
    /// Value of a non-terminal position for the side to move.
    fn evaluate(&self, game: &G) -> f32;
}

/// The game's static evaluation.
#[derive(Clone, Debug, Default)]
pub struct StaticEvaluator;

impl<G: Game> LeafEvaluator<G> for StaticEvaluator {
    fn evaluate(&self, game: &G) -> f32 {
        game.evaluate()
    }
}

/// Oracle value estimate, falling back to the static evaluation on failure.
#[derive(Clone, Debug)]
pub struct OracleEvaluator<O> {
    oracle: O,
}

impl<O> OracleEvaluator<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }
}

impl<G: Game, O: PolicyOracle<G> + Send + Sync> LeafEvaluator<G> for OracleEvaluator<O> {
    fn evaluate(&self, game: &G) -> f32 {
        match self.oracle.evaluate(&[game]) {
            Ok(outputs) if outputs.len() == 1 => outputs[0].value,
            Ok(_) => game.evaluate(),
            Err(err) => {
                warn!(%err, "oracle leaf evaluation failed, using static evaluation");
                game.evaluate()
            }
        }
    }
}
