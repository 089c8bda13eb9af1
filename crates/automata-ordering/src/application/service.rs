//! Automata Ordering Service
//!
//! Main service implementing AutomatonOrderingApi.

use crate::algorithms::{compute_all_orbits, find_all_state_pairs, OrderSearch};
use crate::config::OrderingConfig;
use crate::domain::entities::{Automaton, FailureReason, LinearOrder, OrbitMap};
use crate::domain::errors::OrderingError;
use crate::domain::invariants::{invariant_antisymmetric, invariant_total_order};
use crate::ports::inbound::AutomatonOrderingApi;
use crate::ports::outbound::AutomatonModel;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{error, info};

/// Automata Ordering Service
///
/// Orchestrates the ordering pipeline:
/// 1. Validate input against configured limits
/// 2. Compute orbits of all state pairs
/// 3. Run the backtracking search
/// 4. Return the linear order (or the reason there is none)
#[derive(Clone)]
pub struct AutomatonOrderingService {
    config: OrderingConfig,
}

impl AutomatonOrderingService {
    /// Create a new service with default config
    pub fn new() -> Self {
        Self {
            config: OrderingConfig::default(),
        }
    }

    /// Create a new service with custom config
    pub fn with_config(config: OrderingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrderingConfig {
        &self.config
    }

    /// Validate size limits, uniqueness and table references.
    ///
    /// Every target and output reachable from a declared state on a declared
    /// input must itself be declared; entries keyed by undeclared states or
    /// inputs are never consulted.
    pub fn validate<M: AutomatonModel + ?Sized>(&self, model: &M) -> Result<(), OrderingError> {
        let states = model.states();
        if states.len() > self.config.max_states {
            return Err(OrderingError::TooManyStates {
                count: states.len(),
                max: self.config.max_states,
            });
        }

        let outputs = model.output_signals();
        if outputs.len() > self.config.max_output_signals {
            return Err(OrderingError::TooManyOutputSignals {
                count: outputs.len(),
                max: self.config.max_output_signals,
            });
        }

        let mut declared_states = HashSet::with_capacity(states.len());
        for state in states {
            if !declared_states.insert(state) {
                return Err(OrderingError::DuplicateState(state.id()));
            }
        }

        let mut declared_inputs = HashSet::new();
        for input in model.input_signals() {
            if !declared_inputs.insert(input) {
                return Err(OrderingError::DuplicateInputSignal(input.name().to_string()));
            }
        }

        let mut declared_outputs = HashSet::with_capacity(outputs.len());
        for output in outputs {
            if !declared_outputs.insert(output) {
                return Err(OrderingError::DuplicateOutputSignal(output.name().to_string()));
            }
        }

        for state in states {
            for input in model.input_signals() {
                if let Some(target) = model.target(state, input) {
                    if !declared_states.contains(target) {
                        return Err(OrderingError::UnknownState(target.id()));
                    }
                }
                if let Some(output) = model.output(state, input) {
                    if !declared_outputs.contains(output) {
                        return Err(OrderingError::UnknownOutputSignal(output.name().to_string()));
                    }
                }
            }
        }

        Ok(())
    }

    /// Order an automaton on the calling thread.
    ///
    /// A conflict inside an orbit is not an error: it yields
    /// `LinearOrder::Failure` with `FailureReason::OrbitConflict`.
    pub fn order<M: AutomatonModel + ?Sized>(&self, model: &M) -> Result<LinearOrder, OrderingError> {
        self.validate(model)?;

        info!(
            state_count = model.states().len(),
            output_signal_count = model.output_signals().len(),
            "Ordering automaton"
        );

        let pairs = find_all_state_pairs(model.states());
        let orbits = match compute_all_orbits(model, &pairs, &self.config) {
            Ok(orbits) => orbits,
            Err(conflict) => {
                error!(error = %conflict, "Orbit computation rejected the automaton");
                return Ok(LinearOrder::failure(FailureReason::OrbitConflict {
                    detail: conflict.detail,
                }));
            }
        };

        let order = OrderSearch::new(model.states(), model.output_signals(), &orbits, &pairs).run();

        if let LinearOrder::Success {
            state_order,
            output_order,
            ..
        } = &order
        {
            debug_assert!(invariant_antisymmetric(state_order));
            debug_assert!(invariant_total_order(state_order, model.states()));
            debug_assert!(invariant_total_order(output_order, model.output_signals()));
        }

        match order.reason() {
            None => info!("Automaton ordering complete"),
            Some(reason) => info!(%reason, "Automaton has no linear order"),
        }

        Ok(order)
    }
}

impl Default for AutomatonOrderingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AutomatonOrderingApi for AutomatonOrderingService {
    async fn order_automaton(&self, automaton: Automaton) -> Result<LinearOrder, OrderingError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.order(&automaton))
            .await
            .map_err(|e| OrderingError::Internal(e.to_string()))?
    }

    fn compute_orbits(&self, automaton: &Automaton) -> Result<OrbitMap, OrderingError> {
        self.validate(automaton)?;
        let pairs = find_all_state_pairs(automaton.states());
        Ok(compute_all_orbits(automaton, &pairs, &self.config)?)
    }
}
