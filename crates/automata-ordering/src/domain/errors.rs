//! Error types for Automata Ordering

use super::value_objects::{Orderable, Pair};
use thiserror::Error;

/// Antisymmetry violation: both `(a, b)` and `(b, a)` would be required.
///
/// The only error the ordering core raises. It is recovered from inside the
/// search (by reverting an orbit or backtracking) and is terminal only when it
/// escapes orbit computation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Antisymmetry violated: {detail}")]
pub struct OrderConflict {
    pub detail: String,
}

impl OrderConflict {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn symmetric_pair<T: Orderable>(pair: &Pair<T>) -> Self {
        Self::new(format!("Found symmetric pair for pair {}", pair))
    }

    pub fn symmetric_pair_from_seed<T: Orderable>(pair: &Pair<T>, seed: &Pair<T>) -> Self {
        Self::new(format!(
            "Found symmetric pair for pair {} (seed pair {})",
            pair, seed
        ))
    }
}

/// Errors surfaced by the ordering service and IPC handler.
#[derive(Debug, Error)]
pub enum OrderingError {
    /// Antisymmetry violation raised by the core
    #[error(transparent)]
    Conflict(#[from] OrderConflict),

    /// Automaton has more states than allowed
    #[error("Too many states: {count} > {max}")]
    TooManyStates { count: usize, max: usize },

    /// Automaton has more output signals than allowed
    #[error("Too many output signals: {count} > {max}")]
    TooManyOutputSignals { count: usize, max: usize },

    /// Same state label declared twice
    #[error("Duplicate state: {0}")]
    DuplicateState(u32),

    /// Same input signal declared twice
    #[error("Duplicate input signal: {0}")]
    DuplicateInputSignal(String),

    /// Same output signal declared twice
    #[error("Duplicate output signal: {0}")]
    DuplicateOutputSignal(String),

    /// Transition or output references an undeclared state
    #[error("Unknown state: {0}")]
    UnknownState(u32),

    /// Transition or output references an undeclared input signal
    #[error("Unknown input signal: {0}")]
    UnknownInputSignal(String),

    /// Output table references an undeclared output signal
    #[error("Unknown output signal: {0}")]
    UnknownOutputSignal(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
