//! Move sources: anything that picks a move for the side to move.
//!
//! The searches implement [`MoveSource`], alongside a player that follows an
//! oracle's policy directly and two baselines: a seeded random player and a
//! greedy one-ply player driven by a static evaluation function.

use tracing::debug;

use crate::core::{GameRng, SearchError};
use crate::games::{Othello, PositionalWeights};
use crate::mcts::policy::argmax;
use crate::mcts::MCTSSearch;
use crate::minimax::AlphaBetaSearch;
use crate::nn::{validate_batch, PolicyOracle};
use crate::rules::Game;
use crate::svs::SVSSearch;

/// Picks a move for the side to move in a position.
pub trait MoveSource<G: Game> {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Choose a legal move. Fails on finished games.
    fn select_move(&mut self, game: &G) -> Result<G::Move, SearchError>;

    /// Summary of the last decision.
    fn debug_info(&self) -> String {
        String::new()
    }
}

impl<G: Game> MoveSource<G> for AlphaBetaSearch<G> {
    fn name(&self) -> &str {
        "alpha-beta"
    }

    fn select_move(&mut self, game: &G) -> Result<G::Move, SearchError> {
        self.search(game).map(|outcome| outcome.best_move)
    }

    fn debug_info(&self) -> String {
        self.stats().to_string()
    }
}

impl<G: Game, O: PolicyOracle<G>> MoveSource<G> for MCTSSearch<G, O> {
    fn name(&self) -> &str {
        "mcts"
    }

    fn select_move(&mut self, game: &G) -> Result<G::Move, SearchError> {
        self.search(game)
    }

    fn debug_info(&self) -> String {
        self.stats().to_string()
    }
}

impl<G: Game, O: PolicyOracle<G>> MoveSource<G> for SVSSearch<G, O> {
    fn name(&self) -> &str {
        "svs"
    }

    fn select_move(&mut self, game: &G) -> Result<G::Move, SearchError> {
        self.search(game)
    }

    fn debug_info(&self) -> String {
        self.stats().to_string()
    }
}

// =============================================================================
// Policy Player
// =============================================================================

/// Plays straight from the oracle's priors, without search.
///
/// Deterministic players take the highest prior (the first one on ties);
/// otherwise the action is drawn in proportion to the priors. The chosen
/// action index must be legal, so an oracle putting weight on illegal
/// actions surfaces as [`SearchError::IllegalMove`].
pub struct PolicyPlayer<O> {
    oracle: O,
    deterministic: bool,
    rng: GameRng,
    value: f32,
}

impl<O> PolicyPlayer<O> {
    pub fn new(oracle: O, deterministic: bool, seed: u64) -> Self {
        Self {
            oracle,
            deterministic,
            rng: GameRng::new(seed),
            value: 0.0,
        }
    }

    /// Oracle value of the last position played from.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }
}

impl<G: Game, O: PolicyOracle<G>> MoveSource<G> for PolicyPlayer<O> {
    fn name(&self) -> &str {
        if self.deterministic {
            "policy-greedy"
        } else {
            "policy"
        }
    }

    fn select_move(&mut self, game: &G) -> Result<G::Move, SearchError> {
        if game.is_over() {
            return Err(SearchError::GameOver);
        }
        let outputs = self.oracle.evaluate(&[game])?;
        validate_batch::<G>(1, &outputs)?;
        let output = outputs.into_iter().next().ok_or(SearchError::NoLegalMoves)?;
        self.value = output.value;

        let action = if self.deterministic {
            argmax(&output.priors)
        } else {
            self.rng.choose_weighted(&output.priors)
        }
        .ok_or(SearchError::NoLegalMoves)?;
        debug!(action, value = self.value, "policy move chosen");
        game.find_move(action)
    }

    fn debug_info(&self) -> String {
        format!("Eval {:5.3}", self.value)
    }
}

// =============================================================================
// Random Player
// =============================================================================

/// Uniformly random legal moves from a seeded generator.
#[derive(Clone, Debug)]
pub struct RandomPlayer {
    rng: GameRng,
    last: Option<usize>,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
            last: None,
        }
    }
}

impl<G: Game> MoveSource<G> for RandomPlayer {
    fn name(&self) -> &str {
        "random"
    }

    fn select_move(&mut self, game: &G) -> Result<G::Move, SearchError> {
        if game.is_over() {
            return Err(SearchError::GameOver);
        }
        let mv = game.random_move(&mut self.rng).ok_or(SearchError::NoLegalMoves)?;
        self.last = Some(G::action_index(&mv));
        Ok(mv)
    }

    fn debug_info(&self) -> String {
        match self.last {
            Some(index) => format!("Random plays {index}"),
            None => String::new(),
        }
    }
}

// =============================================================================
// Greedy Player
// =============================================================================

type EvalFn<G> = Box<dyn Fn(&G) -> f32 + Send + Sync>;

/// One-ply greedy player.
///
/// Each legal move is scored as the negated evaluation of the position it
/// leads to, seen from the opponent who then has to move. The first best
/// move wins ties.
pub struct GreedyPlayer<G: Game> {
    evaluate: EvalFn<G>,
    best_evaluation: f32,
    name: String,
}

impl<G: Game> GreedyPlayer<G> {
    pub fn new<F>(name: impl Into<String>, evaluate: F) -> Self
    where
        F: Fn(&G) -> f32 + Send + Sync + 'static,
    {
        Self {
            evaluate: Box::new(evaluate),
            best_evaluation: f32::NEG_INFINITY,
            name: name.into(),
        }
    }

    /// Greedy player on the game's own static evaluation.
    pub fn static_eval() -> Self {
        Self::new("greedy", |game: &G| game.evaluate())
    }

    /// Score of the last chosen move.
    #[must_use]
    pub fn best_evaluation(&self) -> f32 {
        self.best_evaluation
    }
}

impl GreedyPlayer<Othello> {
    /// Positional weights, switching to disc count in the endgame.
    pub fn positional(weights: PositionalWeights) -> Self {
        Self::new("positional", move |game: &Othello| {
            if game.is_endgame() {
                endgame_material(game)
            } else {
                game.evaluate_with(&weights)
            }
        })
    }

    /// Corners and mobility, switching to disc count in the endgame.
    pub fn mobility() -> Self {
        Self::new("mobility", |game: &Othello| {
            if game.is_endgame() {
                endgame_material(game)
            } else {
                game.mobility_evaluate()
            }
        })
    }
}

fn endgame_material(game: &Othello) -> f32 {
    game.material_diff() as f32 * game.to_move().sign()
}

impl<G: Game> MoveSource<G> for GreedyPlayer<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, game: &G) -> Result<G::Move, SearchError> {
        if game.is_over() {
            return Err(SearchError::GameOver);
        }
        let mut work = game.copy(true);
        let mut best: Option<G::Move> = None;
        self.best_evaluation = f32::NEG_INFINITY;

        for mut mv in work.legal_moves() {
            work.apply(&mut mv);
            let score = -(self.evaluate)(&work);
            work.undo(&mv);
            if best.is_none() || score > self.best_evaluation {
                self.best_evaluation = score;
                best = Some(mv);
            }
        }

        let best = best.ok_or(SearchError::NoLegalMoves)?;
        debug!(player = %self.name, eval = self.best_evaluation, "greedy move chosen");
        Ok(best)
    }

    fn debug_info(&self) -> String {
        format!("Eval {:5.3}", self.best_evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::othello::BLACK;
    use crate::games::{ConnectFour, ConnectFourMove};
    use crate::mcts::MCTSConfig;
    use crate::minimax::AlphaBetaConfig;
    use crate::nn::{OracleError, OracleOutput, UniformOracle};
    use crate::svs::SVSConfig;

    /// Puts all weight on one column.
    struct ColumnOracle(usize);

    impl PolicyOracle<ConnectFour> for ColumnOracle {
        fn evaluate(
            &self,
            states: &[&ConnectFour],
        ) -> Result<Vec<OracleOutput<ConnectFourMove>>, OracleError> {
            Ok(states
                .iter()
                .map(|game| {
                    let mut priors = vec![0.0; ConnectFour::ACTION_SPACE];
                    priors[self.0] = 1.0;
                    OracleOutput {
                        priors,
                        moves: game.legal_moves(),
                        value: 0.5,
                    }
                })
                .collect())
        }
    }

    #[test]
    fn test_policy_player_takes_highest_prior() {
        let game = ConnectFour::new();
        let mut player = PolicyPlayer::new(ColumnOracle(4), true, 1);

        let mv = MoveSource::<ConnectFour>::select_move(&mut player, &game).unwrap();
        assert_eq!(mv.column(), 4);
        assert_eq!(player.value(), 0.5);
        assert_eq!(MoveSource::<ConnectFour>::debug_info(&player), "Eval 0.500");
    }

    #[test]
    fn test_policy_player_samples_legal_moves() {
        let game = ConnectFour::new();
        let mut a = PolicyPlayer::new(UniformOracle, false, 5);
        let mut b = PolicyPlayer::new(UniformOracle, false, 5);

        let mut columns = Vec::new();
        for _ in 0..30 {
            let ma = MoveSource::<ConnectFour>::select_move(&mut a, &game).unwrap();
            let mb = MoveSource::<ConnectFour>::select_move(&mut b, &game).unwrap();
            assert_eq!(ma, mb);
            columns.push(ma.column());
        }
        columns.sort_unstable();
        columns.dedup();
        assert!(columns.len() > 1);
        assert_eq!(MoveSource::<ConnectFour>::name(&a), "policy");
    }

    #[test]
    fn test_policy_player_rejects_illegal_action() {
        let mut game = ConnectFour::new();
        for _ in 0..6 {
            game.play(2).unwrap();
        }
        for deterministic in [true, false] {
            let mut player = PolicyPlayer::new(ColumnOracle(2), deterministic, 3);
            assert!(matches!(
                MoveSource::<ConnectFour>::select_move(&mut player, &game),
                Err(SearchError::IllegalMove(2))
            ));
        }
    }

    #[test]
    fn test_greedy_mobility_takes_corner() {
        let game = Othello::from_masks((1 << 2) | (1 << 20), (1 << 1) | (1 << 28), BLACK).unwrap();
        let mut player = GreedyPlayer::mobility();

        let mv = player.select_move(&game).unwrap();
        assert_eq!(Othello::action_index(&mv), 0);
        assert!(player.best_evaluation() > 5.0);
        assert!(player.debug_info().starts_with("Eval"));
    }

    #[test]
    fn test_greedy_positional_plays_legal_move() {
        let game = Othello::new();
        let mut player = GreedyPlayer::positional(PositionalWeights::default());
        let mv = player.select_move(&game).unwrap();
        assert!(game.legal_moves().contains(&mv));
        assert_eq!(MoveSource::<Othello>::name(&player), "positional");
    }

    #[test]
    fn test_random_player_deterministic() {
        let game = ConnectFour::new();
        let mut a = RandomPlayer::new(9);
        let mut b = RandomPlayer::new(9);

        for _ in 0..10 {
            let ma = MoveSource::<ConnectFour>::select_move(&mut a, &game).unwrap();
            let mb = MoveSource::<ConnectFour>::select_move(&mut b, &game).unwrap();
            assert_eq!(ma, mb);
            assert!(game.legal_moves().contains(&ma));
        }
        assert!(MoveSource::<ConnectFour>::debug_info(&a).starts_with("Random plays"));
    }

    #[test]
    fn test_finished_game_rejected() {
        let mut game = ConnectFour::new();
        for col in [0, 1, 0, 1, 0, 1, 0] {
            game.play(col).unwrap();
        }
        assert!(game.is_over());

        let mut random = RandomPlayer::new(1);
        assert!(matches!(
            MoveSource::<ConnectFour>::select_move(&mut random, &game),
            Err(SearchError::GameOver)
        ));
        let mut greedy = GreedyPlayer::<ConnectFour>::static_eval();
        assert!(matches!(greedy.select_move(&game), Err(SearchError::GameOver)));
    }

    #[test]
    fn test_boxed_sources_finish_game() {
        let mut sources: Vec<Box<dyn MoveSource<ConnectFour>>> = vec![
            Box::new(AlphaBetaSearch::<ConnectFour>::new(AlphaBetaConfig::default().with_depth(2))),
            Box::new(MCTSSearch::<ConnectFour, _>::new(
                UniformOracle,
                MCTSConfig::default().with_iterations(20),
            )),
        ];
        let mut game = ConnectFour::new();
        let mut turn = 0;

        while !game.is_over() {
            let source = &mut sources[turn % 2];
            let mut mv = source.select_move(&game).unwrap();
            assert!(game.legal_moves().contains(&mv));
            game.apply(&mut mv);
            assert!(!source.debug_info().is_empty());
            turn += 1;
        }
        assert!(game.result().is_some());
        assert!(turn <= 42);
    }

    #[test]
    fn test_svs_and_policy_sources_finish_game() {
        let mut sources: Vec<Box<dyn MoveSource<ConnectFour>>> = vec![
            Box::new(SVSSearch::<ConnectFour, _>::new(
                UniformOracle,
                SVSConfig::default().with_rollouts_per_move(2),
            )),
            Box::new(PolicyPlayer::new(UniformOracle, false, 11)),
        ];
        let mut game = ConnectFour::new();
        let mut turn = 0;

        while !game.is_over() {
            let source = &mut sources[turn % 2];
            let mut mv = source.select_move(&game).unwrap();
            assert!(game.legal_moves().contains(&mv));
            game.apply(&mut mv);
            assert!(!source.debug_info().is_empty());
            turn += 1;
        }
        assert!(game.result().is_some());
        assert!(turn <= 42);
    }
}
