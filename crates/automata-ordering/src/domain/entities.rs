//! Core entities for Automata Ordering

use super::value_objects::{InputSignal, OutputSignal, Pair, Relation, State};
use crate::ports::outbound::AutomatonModel;
use std::collections::HashMap;
use thiserror::Error;

/// Table-backed Mealy automaton.
///
/// Transitions and outputs may be partial: a missing entry is a
/// "don't care" and simply yields `None`.
#[derive(Clone, Debug)]
pub struct Automaton {
    states: Vec<State>,
    input_signals: Vec<InputSignal>,
    output_signals: Vec<OutputSignal>,
    transitions: HashMap<State, HashMap<InputSignal, State>>,
    outputs: HashMap<State, HashMap<InputSignal, OutputSignal>>,
}

impl Automaton {
    pub fn new(
        states: Vec<State>,
        input_signals: Vec<InputSignal>,
        output_signals: Vec<OutputSignal>,
    ) -> Self {
        Self {
            states,
            input_signals,
            output_signals,
            transitions: HashMap::new(),
            outputs: HashMap::new(),
        }
    }

    pub fn with_transition(mut self, from: State, input: InputSignal, to: State) -> Self {
        self.add_transition(from, input, to);
        self
    }

    pub fn with_output(mut self, state: State, input: InputSignal, output: OutputSignal) -> Self {
        self.add_output(state, input, output);
        self
    }

    pub fn add_transition(&mut self, from: State, input: InputSignal, to: State) {
        self.transitions.entry(from).or_default().insert(input, to);
    }

    pub fn add_output(&mut self, state: State, input: InputSignal, output: OutputSignal) {
        self.outputs.entry(state).or_default().insert(input, output);
    }

    /// Number of defined transitions
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(HashMap::len).sum()
    }
}

impl AutomatonModel for Automaton {
    fn states(&self) -> &[State] {
        &self.states
    }

    fn input_signals(&self) -> &[InputSignal] {
        &self.input_signals
    }

    fn output_signals(&self) -> &[OutputSignal] {
        &self.output_signals
    }

    fn target(&self, state: &State, input: &InputSignal) -> Option<&State> {
        self.transitions.get(state)?.get(input)
    }

    fn output(&self, state: &State, input: &InputSignal) -> Option<&OutputSignal> {
        self.outputs.get(state)?.get(input)
    }
}

/// Pairs that must be oriented together once a seed pair is oriented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Orbit {
    pub transition_orbit: Relation<State>,
    pub output_orbit: Relation<OutputSignal>,
}

impl Orbit {
    pub fn new(transition_orbit: Relation<State>, output_orbit: Relation<OutputSignal>) -> Self {
        Self {
            transition_orbit,
            output_orbit,
        }
    }

    /// Combined size, the sort key of the search heuristic.
    pub fn power(&self) -> usize {
        self.transition_orbit.len() + self.output_orbit.len()
    }
}

/// Orbits keyed by their seed pair.
pub type OrbitMap = HashMap<Pair<State>, Orbit>;

/// Why no linear order was produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FailureReason {
    /// An orbit requires both orientations of some pair
    #[error("antisymmetry violated during orbit calculation")]
    OrbitConflict { detail: String },

    /// The order is incomplete but every orbit seed is already decided
    #[error("no candidate pair left but order incomplete")]
    NoCandidatePair,

    /// Backtracking returned to the root of the step stack
    #[error("search space exhausted; no consistent total order exists under this heuristic")]
    SearchExhausted,
}

/// Result of ordering an automaton.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinearOrder {
    Success {
        /// Total order over states, reflexive pairs included
        state_order: Relation<State>,
        /// Total order over output signals, reflexive pairs included
        output_order: Relation<OutputSignal>,
        /// States from least to greatest
        state_sequence: Vec<State>,
        /// Output signals from least to greatest
        output_sequence: Vec<OutputSignal>,
    },
    Failure {
        reason: FailureReason,
    },
}

impl LinearOrder {
    pub fn failure(reason: FailureReason) -> Self {
        Self::Failure { reason }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason } => Some(reason),
        }
    }

    pub fn state_sequence(&self) -> Option<&[State]> {
        match self {
            Self::Success { state_sequence, .. } => Some(state_sequence),
            Self::Failure { .. } => None,
        }
    }

    pub fn output_sequence(&self) -> Option<&[OutputSignal]> {
        match self {
            Self::Success {
                output_sequence, ..
            } => Some(output_sequence),
            Self::Failure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> InputSignal {
        InputSignal::new("a")
    }

    #[test]
    fn test_partial_transitions_are_none() {
        let automaton = Automaton::new(
            vec![State::new(1), State::new(2)],
            vec![a()],
            vec![OutputSignal::new("x")],
        )
        .with_transition(State::new(1), a(), State::new(2))
        .with_output(State::new(1), a(), OutputSignal::new("x"));

        assert_eq!(automaton.target(&State::new(1), &a()), Some(&State::new(2)));
        assert_eq!(automaton.target(&State::new(2), &a()), None);
        assert_eq!(
            automaton.output(&State::new(1), &a()),
            Some(&OutputSignal::new("x"))
        );
        assert_eq!(automaton.output(&State::new(2), &a()), None);
        assert_eq!(automaton.transition_count(), 1);
    }

    #[test]
    fn test_orbit_power() {
        let transition_orbit: Relation<State> = [
            Pair::new(State::new(1), State::new(2)),
            Pair::new(State::new(3), State::new(4)),
        ]
        .into_iter()
        .collect();
        let output_orbit: Relation<OutputSignal> =
            [Pair::new(OutputSignal::new("x"), OutputSignal::new("y"))]
                .into_iter()
                .collect();

        assert_eq!(Orbit::new(transition_orbit, output_orbit).power(), 3);
    }

    #[test]
    fn test_failure_reasons_are_canonical() {
        assert_eq!(
            FailureReason::OrbitConflict {
                detail: "Found symmetric pair for pair (2, 1)".into()
            }
            .to_string(),
            "antisymmetry violated during orbit calculation"
        );
        assert_eq!(
            FailureReason::NoCandidatePair.to_string(),
            "no candidate pair left but order incomplete"
        );
        assert_eq!(
            FailureReason::SearchExhausted.to_string(),
            "search space exhausted; no consistent total order exists under this heuristic"
        );
    }

    #[test]
    fn test_linear_order_accessors() {
        let failure = LinearOrder::failure(FailureReason::SearchExhausted);
        assert!(!failure.is_resolved());
        assert_eq!(failure.reason(), Some(&FailureReason::SearchExhausted));
        assert!(failure.state_sequence().is_none());
    }
}
