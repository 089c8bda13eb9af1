//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::{Automaton, LinearOrder, OrbitMap};
use crate::domain::errors::OrderingError;
use async_trait::async_trait;

/// Primary Automata Ordering API
#[async_trait]
pub trait AutomatonOrderingApi: Send + Sync {
    /// Compute a total order over states and one over output signals.
    ///
    /// This is the main entry point. It:
    /// 1. Computes the orbit of every state pair
    /// 2. Runs the backtracking search over orbits
    /// 3. Linearizes the output-signal relation
    ///
    /// `Err` is returned only for inputs rejected by configured limits; a
    /// missing order is reported as `LinearOrder::Failure`.
    async fn order_automaton(&self, automaton: Automaton) -> Result<LinearOrder, OrderingError>;

    /// Compute the orbit of every unordered state pair.
    ///
    /// An orbit containing some pair and its reverse is reported as
    /// `OrderingError::Conflict`.
    fn compute_orbits(&self, automaton: &Automaton) -> Result<OrbitMap, OrderingError>;
}
