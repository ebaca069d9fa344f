//! Sequential value search over the root moves.
//!
//! A flat alternative to [`crate::mcts`]: no tree is grown. Root moves are
//! sampled in proportion to their (noisy) oracle priors, each sample runs a
//! short random rollout from the chosen child, and every non-terminal rollout
//! end is valued by one batched oracle call. The move with the best mean
//! value wins.
//!
//! ```rust
//! use board_search::games::ConnectFour;
//! use board_search::nn::HeuristicOracle;
//! use board_search::svs::{SVSConfig, SVSSearch};
//!
//! let game = ConnectFour::new();
//! let mut search = SVSSearch::new(HeuristicOracle::default(), SVSConfig::default());
//! let mv = search.search(&game).unwrap();
//! println!("{mv}: {}", search.stats());
//! ```

pub mod config;
pub mod search;
pub mod stats;

pub use config::SVSConfig;
pub use search::SVSSearch;
pub use stats::SVSStats;
