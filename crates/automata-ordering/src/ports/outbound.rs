//! Outbound Ports (Driven Ports / SPI)
//!
//! The automaton representation is owned by the caller; the ordering core
//! only reads it through this trait.

use crate::domain::value_objects::{InputSignal, OutputSignal, State};

/// Read-only view of a finite deterministic Mealy automaton.
///
/// `target` and `output` are partial. `None` is an expected answer and prunes
/// the orbit expansion through that entry.
pub trait AutomatonModel: Send + Sync {
    /// States in declared order.
    fn states(&self) -> &[State];

    /// Input signals in declared order.
    fn input_signals(&self) -> &[InputSignal];

    /// Output signals in declared order. Linearization visits them in this order.
    fn output_signals(&self) -> &[OutputSignal];

    /// Successor of `state` under `input`.
    fn target(&self, state: &State, input: &InputSignal) -> Option<&State>;

    /// Output emitted by `state` under `input`.
    fn output(&self, state: &State, input: &InputSignal) -> Option<&OutputSignal>;
}
