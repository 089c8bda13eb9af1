//! Application layer for Automata Ordering

pub mod service;

pub use service::AutomatonOrderingService;
