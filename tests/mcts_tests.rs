//! MCTS integration tests on the bundled games.

use board_search::mcts::{MCTSConfig, MCTSSearch, PUCT, UCB1};
use board_search::nn::{HeuristicOracle, UniformOracle};
use board_search::{Checkers, ConnectFour, Game, Othello, SearchError};

fn config(iterations: u32, batch: usize) -> MCTSConfig {
    MCTSConfig::default().with_iterations(iterations).with_batch_size(batch)
}

// =============================================================================
// Basic Search Tests
// =============================================================================

#[test]
fn test_mcts_returns_legal_move_in_every_game() {
    let mut othello = MCTSSearch::new(UniformOracle, config(40, 2));
    let game = Othello::new();
    assert!(game.legal_moves().contains(&othello.search(&game).unwrap()));

    let mut checkers = MCTSSearch::new(UniformOracle, config(40, 2));
    let game = Checkers::new();
    assert!(game.legal_moves().contains(&checkers.search(&game).unwrap()));

    let mut connect = MCTSSearch::new(HeuristicOracle::default(), config(40, 2));
    let game = ConnectFour::new();
    assert!(game.legal_moves().contains(&connect.search(&game).unwrap()));
}

#[test]
fn test_mcts_with_low_iterations() {
    let game = Othello::new();
    let mut search = MCTSSearch::new(UniformOracle, config(1, 1));
    let mv = search.search(&game).unwrap();
    assert!(game.legal_moves().contains(&mv));
}

#[test]
fn test_mcts_rejects_finished_game() {
    let game = Othello::from_masks(u64::MAX, 0, board_search::games::othello::BLACK).unwrap();
    let mut search = MCTSSearch::new(UniformOracle, config(10, 1));
    assert!(matches!(search.search(&game), Err(SearchError::GameOver)));
}

// =============================================================================
// Visit Conservation
// =============================================================================

#[test]
fn test_root_visits_match_iterations_times_batch() {
    for (iterations, batch) in [(1, 1), (25, 1), (10, 8), (16, 3)] {
        let game = ConnectFour::new();
        let mut search = MCTSSearch::new(UniformOracle, config(iterations, batch));
        search.search(&game).unwrap();

        let tree = search.tree().unwrap();
        let expected = iterations * batch as u32;
        assert_eq!(tree.root_node().visits, expected + 1);

        let child_visits: u32 = search.action_visits().iter().map(|(_, v)| v).sum();
        assert_eq!(child_visits, expected);
        assert_eq!(search.stats().leaves, expected);
    }
}

#[test]
fn test_no_virtual_loss_left_behind() {
    let game = Othello::new();
    let mut search = MCTSSearch::new(UniformOracle, config(20, 6));
    search.search(&game).unwrap();

    // Every node's visits equal its children's plus its own evaluations.
    let tree = search.tree().unwrap();
    for (_, node) in tree.iter() {
        let below: u32 = node.children.iter().map(|&c| tree.get(c).visits).sum();
        assert!(node.visits >= below);
    }
}

// =============================================================================
// Determinism Tests
// =============================================================================

#[test]
fn test_mcts_deterministic_with_seed() {
    let game = Othello::new();
    let config = config(50, 4).with_seed(12345);

    let mut a = MCTSSearch::new(UniformOracle, config.clone());
    let mut b = MCTSSearch::new(UniformOracle, config);

    assert_eq!(a.search(&game).unwrap(), b.search(&game).unwrap());
    assert_eq!(a.action_visits(), b.action_visits());
}

#[test]
fn test_stochastic_selection_deterministic_with_seed() {
    let game = Checkers::new();
    let config = config(30, 2).with_seed(7).with_deterministic_selection(false);

    let mut a = MCTSSearch::new(UniformOracle, config.clone());
    let mut b = MCTSSearch::new(UniformOracle, config);

    assert_eq!(a.search(&game).unwrap(), b.search(&game).unwrap());
    assert_eq!(a.policy_target(), b.policy_target());
}

// =============================================================================
// Statistics Tests
// =============================================================================

#[test]
fn test_mcts_statistics() {
    let game = ConnectFour::new();
    let mut search = MCTSSearch::new(UniformOracle, config(30, 2));
    search.search(&game).unwrap();

    let stats = search.stats();
    assert_eq!(stats.iterations, 30);
    assert!(stats.nodes_expanded > 0);
    assert!(stats.rollouts > 0);
    assert_eq!(stats.oracle_failures, 0);
    assert!(stats.best_visits > 0);
    assert!((-1.0..=1.0).contains(&stats.best_value));
}

#[test]
fn test_mcts_tree_stats() {
    let game = Othello::new();
    let mut search = MCTSSearch::new(UniformOracle, config(40, 1));
    search.search(&game).unwrap();

    let stats = search.tree().unwrap().stats();
    assert_eq!(stats.node_count, search.tree().unwrap().len());
    assert!(stats.max_depth >= 1);
    assert!(stats.branching_factor() > 0.0);
}

#[test]
fn test_policy_target_covers_action_space() {
    let game = Othello::new();
    let mut search = MCTSSearch::new(UniformOracle, config(30, 2));
    search.search(&game).unwrap();

    let target = search.policy_target();
    assert_eq!(target.len(), Othello::ACTION_SPACE);
    assert!((target.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    let mask = game.action_mask();
    for (p, legal) in target.iter().zip(mask) {
        if !legal {
            assert_eq!(*p, 0.0);
        }
    }
}

// =============================================================================
// Policy Tests
// =============================================================================

#[test]
fn test_mcts_with_explicit_policies() {
    let game = ConnectFour::new();
    let mut puct = MCTSSearch::new(UniformOracle, config(20, 1)).with_selection(PUCT);
    let mut ucb = MCTSSearch::new(UniformOracle, config(20, 1).with_exploration(1.4)).with_selection(UCB1);

    assert!(game.legal_moves().contains(&puct.search(&game).unwrap()));
    assert!(game.legal_moves().contains(&ucb.search(&game).unwrap()));
}

#[test]
fn test_oracle_only_values() {
    let mut game = ConnectFour::new();
    for col in [3, 0, 3, 0, 3] {
        game.play(col).unwrap();
    }
    // Yellow must block column 3.
    let config = config(300, 1).with_lambda(0.0).with_noise(0.9, 0.0);
    let mut search = MCTSSearch::new(HeuristicOracle::default(), config);
    let mv = search.search(&game).unwrap();
    assert_eq!(ConnectFour::action_index(&mv), 3);
    assert_eq!(search.stats().rollouts, 0);
}

// =============================================================================
// Subtree Reuse
// =============================================================================

#[test]
fn test_subtree_reused_across_moves() {
    let config = config(60, 2).with_subtree_preservation(true);
    let mut search = MCTSSearch::new(UniformOracle, config);
    let mut game = Othello::new();

    let mut mv = search.search(&game).unwrap();
    assert!(!search.stats().reused_subtree);
    game.apply(&mut mv);
    let mut reply = game.legal_moves()[0].clone();
    game.apply(&mut reply);

    search.search(&game).unwrap();
    assert!(search.stats().reused_subtree);
    let tree = search.tree().unwrap();
    assert_eq!(tree.root_node().state, game.copy(true));
    assert!(tree.root_node().parent.is_none());
    assert_eq!(tree.root_node().depth, 0);
}

#[test]
fn test_subtree_not_reused_without_progress() {
    let config = config(20, 1).with_subtree_preservation(true);
    let mut search = MCTSSearch::new(UniformOracle, config);
    let game = ConnectFour::new();

    search.search(&game).unwrap();
    search.search(&game).unwrap();
    assert!(!search.stats().reused_subtree);
    assert_eq!(search.tree().unwrap().root_node().visits, 21);
}
