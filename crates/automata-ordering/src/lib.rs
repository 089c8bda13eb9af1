//! # Automata Ordering
//!
//! Builds order-compatible linearizations of the states and output signals of
//! a Mealy automaton: a total order on states and one on output signals such
//! that every input signal maps ordered state pairs to ordered pairs.
//!
//! ## Architecture
//!
//! - **Domain**: Value objects (State, Pair, Relation), entities (Automaton, Orbit, LinearOrder)
//! - **Algorithms**: Orbit computation, transitive closure, backtracking search, linearization
//! - **Ports**: Inbound (AutomatonOrderingApi) and Outbound (AutomatonModel)
//! - **Application**: Service orchestration
//! - **IPC**: Request/response payloads and handler

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use application::service::AutomatonOrderingService;
pub use config::OrderingConfig;
pub use domain::entities::*;
pub use domain::errors::{OrderConflict, OrderingError};
pub use domain::value_objects::*;
pub use ipc::{AutomatonOrderingHandler, OrderAutomatonRequest, OrderAutomatonResponse};
pub use ports::inbound::AutomatonOrderingApi;
pub use ports::outbound::AutomatonModel;
