//! Algorithms module for Automata Ordering
//!
//! Contains:
//! - Orbit computation (parallel, cached)
//! - Transitive closure with antisymmetry checks
//! - Backtracking order search
//! - Depth-first topological linearization

pub mod closure;
pub mod orbits;
pub mod search;
pub mod topological;

pub use closure::{is_order_constructed, revert, transitive_closure};
pub use orbits::{compute_all_orbits, find_all_state_pairs, output_orbit, transition_orbit, OrbitCache};
pub use search::{OrderSearch, SearchState, SearchStats};
pub use topological::{linearize, topological_linearization};
