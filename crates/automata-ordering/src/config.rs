//! Configuration for Automata Ordering

use serde::{Deserialize, Serialize};

/// Ordering configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Maximum states accepted per automaton
    pub max_states: usize,
    /// Maximum output signals accepted per automaton
    pub max_output_signals: usize,
    /// Compute orbits on the rayon pool
    pub parallel_orbits: bool,
    /// Minimum number of state pairs before orbits go parallel
    pub parallel_threshold: usize,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            max_states: 256,
            max_output_signals: 256,
            parallel_orbits: true,
            parallel_threshold: 4,
        }
    }
}
