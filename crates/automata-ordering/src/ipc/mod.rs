//! IPC Module for Automata Ordering
//!
//! Serde payloads carrying an automaton in and its linear orders out, and a
//! handler that validates the payload before delegating to the service.

pub mod handler;
pub mod payloads;

pub use handler::AutomatonOrderingHandler;
pub use payloads::*;
