//! Counters describing one MCTS search.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the last [`super::MCTSSearch::search`] call did.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Batches run.
    pub iterations: u32,

    /// Leaves evaluated, counting a leaf picked twice in one batch twice.
    pub leaves: u32,

    pub nodes_expanded: u32,

    pub rollouts: u32,

    /// Selection steps plus rollout plies.
    pub nodes: u64,

    /// Oracle calls replaced by uniform priors.
    pub oracle_failures: u32,

    /// Root carried over from the previous search.
    pub reused_subtree: bool,

    /// Visits of the chosen root child.
    pub best_visits: u32,

    /// Mean value of the chosen root child, for the side to move at the root.
    pub best_value: f32,

    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Leaves evaluated per oracle batch.
    #[must_use]
    pub fn leaves_per_batch(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            f64::from(self.leaves) / f64::from(self.iterations)
        }
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

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nodes {:>11} | {:>8.2}kN/s | {:>6}ms | Visits {:>6} | Eval {:.3}",
            self.nodes,
            self.nodes_per_second() / 1000.0,
            self.time_us / 1000,
            self.best_visits,
            self.best_value
        )?;
        if self.reused_subtree {
            write!(f, " | reused")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_with_zero_time() {
        let stats = SearchStats::new();
        assert_eq!(stats.nodes_per_second(), 0.0);
        assert_eq!(stats.leaves_per_batch(), 0.0);
    }

    #[test]
    fn test_rates() {
        let stats = SearchStats {
            iterations: 10,
            leaves: 80,
            nodes: 5_000,
            time_us: 500_000,
            ..SearchStats::default()
        };
        assert_eq!(stats.leaves_per_batch(), 8.0);
        assert_eq!(stats.nodes_per_second(), 10_000.0);
    }

    #[test]
    fn test_reset_clears_flags() {
        let mut stats = SearchStats {
            oracle_failures: 3,
            reused_subtree: true,
            ..SearchStats::default()
        };
        assert!(stats.to_string().ends_with("reused"));

        stats.reset();
        assert_eq!(stats.oracle_failures, 0);
        assert!(!stats.reused_subtree);
        assert!(stats.to_string().starts_with("Nodes"));
    }

    #[test]
    fn test_stats_json() {
        let stats = SearchStats {
            best_visits: 42,
            ..SearchStats::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        let back: SearchStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back.best_visits, 42);
    }
}
