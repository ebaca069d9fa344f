//! Monte Carlo Tree Search guided by a policy oracle.
//!
//! ## Overview
//!
//! - **Batched evaluation**: leaves are collected in batches and sent to the
//!   oracle in one call, with virtual loss spreading out each batch
//! - **Arena tree**: nodes addressed by `NodeId`, each owning its position
//! - **Value blending**: oracle value estimates mixed with random rollouts
//! - **Root noise**: Dirichlet noise over the legal moves at the root
//! - **Subtree reuse**: the tree can be carried over to the next move
//!
//! ## Usage
//!
//! ```rust
//! use board_search::games::Othello;
//! use board_search::mcts::{MCTSConfig, MCTSSearch};
//! use board_search::nn::UniformOracle;
//!
//! let game = Othello::new();
//! let config = MCTSConfig::default().with_iterations(50).with_batch_size(4);
//! let mut search = MCTSSearch::new(UniformOracle, config);
//!
//! let mv = search.search(&game).unwrap();
//! println!("Best move: {mv}");
//!
//! // Visit distribution for training
//! for (mv, p) in search.action_probabilities() {
//!     println!("{}: {:.2}%", mv.algebraic(), p * 100.0);
//! }
//! ```

pub mod config;
pub mod node;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::MCTSConfig;
pub use node::{MCTSNode, NodeId};
pub use policy::{RandomRollout, RolloutPolicy, SelectionPolicy, PUCT, UCB1};
pub use search::MCTSSearch;
pub use stats::SearchStats;
pub use tree::{MCTSTree, TreeStats};
