//! Oracle integration for guided search.
//!
//! - **Traits**: [`PolicyOracle`] evaluates batches of positions into move
//!   priors and values.
//! - **Encoding**: flat tensors built from `Game::encode`.
//! - **Networks**: [`NetworkOracle`] wraps any [`PolicyValueNetwork`].
//! - **Baselines**: [`UniformOracle`] and [`HeuristicOracle`] need no model.

pub mod encoder;
pub mod network;
pub mod traits;

pub use encoder::{encode, encode_batch, masked_softmax, EncodedState};
pub use network::{NetworkOracle, PolicyValueNetwork};
pub use traits::{
    uniform_priors, validate_batch, HeuristicOracle, OracleError, OracleOutput, PolicyOracle,
    UniformOracle,
};
