//! Ports module for Automata Ordering
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::AutomatonOrderingApi;
pub use outbound::AutomatonModel;
