//! Counters describing one sequential value search.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SVSStats {
    pub rollouts: u32,

    /// Rollout plies played, one per ply including the stopping one.
    pub nodes: u64,

    /// Rollout ends sent to the oracle.
    pub oracle_leaves: u32,

    /// Oracle calls replaced by uniform priors and zero values.
    pub oracle_failures: u32,

    /// Largest root prior after noise.
    pub prior_max: f32,

    /// Mean value of the chosen move, for the side to move at the root.
    pub best_value: f32,

    pub time_us: u64,
}

impl SVSStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn nodes_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.nodes as f64 * 1_000_000.0 / self.time_us as f64
        }
    }
}

impl fmt::Display for SVSStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nodes {:>11} | {:>8.2}kN/s | {:>6}ms | PMax {:4.2} | Eval {:5.3}",
            self.nodes,
            self.nodes_per_second() / 1000.0,
            self.time_us / 1000,
            self.prior_max,
            self.best_value
        )
    }
}
