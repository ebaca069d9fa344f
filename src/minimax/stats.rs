//! Alpha-beta search statistics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Statistics of the last alpha-beta search.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Nodes visited, leaves included.
    pub nodes: u64,

    /// Transposition table probes that returned a usable value.
    pub cache_hits: u64,

    /// Deepest completed iteration.
    pub depth: u32,

    /// Root value for the side to move.
    pub value: f32,

    /// Total time spent searching (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn nodes_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.nodes as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nodes {:>11} | {:>8.2}kN/s | {:>6}ms | Cache Hits {:>7} | Depth {:>2} | Eval {}",
            self.nodes,
            self.nodes_per_second() / 1000.0,
            self.time_us / 1000,
            self.cache_hits,
            self.depth,
            self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_per_second() {
        let mut stats = SearchStats::new();
        assert_eq!(stats.nodes_per_second(), 0.0);
        stats.nodes = 5000;
        stats.time_us = 500_000;
        assert_eq!(stats.nodes_per_second(), 10_000.0);
    }

    #[test]
    fn test_display() {
        let mut stats = SearchStats::new();
        stats.cache_hits = 12;
        stats.value = 1.5;
        let text = stats.to_string();
        assert!(text.contains("Cache Hits      12"));
        assert!(text.ends_with("Eval 1.5"));

        stats.reset();
        assert_eq!(stats.cache_hits, 0);
    }
}
