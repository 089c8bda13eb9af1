//! IPC Handler for Automata Ordering
//!
//! ## Validation
//!
//! - MUST enforce state and output signal limits
//! - MUST reject duplicate states (repeated signal names are collapsed)
//! - MUST reject table entries naming undeclared states or signals

use crate::application::service::AutomatonOrderingService;
use crate::config::OrderingConfig;
use crate::domain::entities::{Automaton, LinearOrder};
use crate::domain::errors::OrderingError;
use crate::domain::value_objects::{InputSignal, OutputSignal, State};
use crate::ipc::payloads::{OrderAutomatonRequest, OrderAutomatonResponse, OrderingMetrics};
use crate::ports::inbound::AutomatonOrderingApi;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{error, info, warn};

/// IPC Handler for Automata Ordering.
///
/// Validates the payload and delegates to the domain service.
pub struct AutomatonOrderingHandler {
    service: AutomatonOrderingService,
    config: OrderingConfig,
}

impl AutomatonOrderingHandler {
    /// Create a new handler with default config.
    pub fn new() -> Self {
        Self {
            service: AutomatonOrderingService::new(),
            config: OrderingConfig::default(),
        }
    }

    /// Create a new handler with custom config.
    pub fn with_config(config: OrderingConfig) -> Self {
        Self {
            service: AutomatonOrderingService::with_config(config.clone()),
            config,
        }
    }

    /// Handle an OrderAutomatonRequest.
    ///
    /// Never fails: rejected requests and automata without a linear order
    /// both come back with `success == false` and the reason in `error`.
    pub async fn handle_order_automaton(
        &self,
        request: OrderAutomatonRequest,
    ) -> OrderAutomatonResponse {
        let start_time = Instant::now();

        let automaton = match self.convert_to_automaton(&request) {
            Ok(automaton) => automaton,
            Err(e) => {
                warn!("[ordering] Rejected OrderAutomatonRequest: {}", e);
                return Self::rejected(&request, e.to_string());
            }
        };

        info!(
            "[ordering] Processing OrderAutomatonRequest with {} states and {} output signals",
            request.states.len(),
            request.output_signals.len()
        );

        let state_count = request.states.len();
        let mut metrics = OrderingMetrics {
            state_count: state_count as u32,
            output_signal_count: request.output_signals.len() as u32,
            state_pair_count: (state_count * state_count.saturating_sub(1) / 2) as u32,
            ordering_time_ms: 0,
        };

        match self.service.order_automaton(automaton).await {
            Ok(LinearOrder::Success {
                state_sequence,
                output_sequence,
                ..
            }) => {
                metrics.ordering_time_ms = start_time.elapsed().as_millis() as u64;

                info!(
                    "[ordering] Ordered {} states and {} output signals in {} ms",
                    state_sequence.len(),
                    output_sequence.len(),
                    metrics.ordering_time_ms
                );

                OrderAutomatonResponse {
                    correlation_id: request.correlation_id,
                    success: true,
                    state_order: state_sequence.iter().map(State::id).collect(),
                    output_order: output_sequence
                        .iter()
                        .map(|signal| signal.name().to_string())
                        .collect(),
                    metrics,
                    error: None,
                }
            }
            Ok(LinearOrder::Failure { reason }) => {
                metrics.ordering_time_ms = start_time.elapsed().as_millis() as u64;
                warn!("[ordering] No linear order: {}", reason);

                OrderAutomatonResponse {
                    correlation_id: request.correlation_id,
                    success: false,
                    state_order: vec![],
                    output_order: vec![],
                    metrics,
                    error: Some(reason.to_string()),
                }
            }
            Err(e) => {
                error!("[ordering] Ordering failed: {}", e);
                Self::rejected(&request, e.to_string())
            }
        }
    }

    /// Convert IPC payload to a domain Automaton.
    fn convert_to_automaton(
        &self,
        request: &OrderAutomatonRequest,
    ) -> Result<Automaton, OrderingError> {
        if request.states.len() > self.config.max_states {
            return Err(OrderingError::TooManyStates {
                count: request.states.len(),
                max: self.config.max_states,
            });
        }
        if request.output_signals.len() > self.config.max_output_signals {
            return Err(OrderingError::TooManyOutputSignals {
                count: request.output_signals.len(),
                max: self.config.max_output_signals,
            });
        }

        let mut states = HashSet::with_capacity(request.states.len());
        for &label in &request.states {
            if !states.insert(label) {
                return Err(OrderingError::DuplicateState(label));
            }
        }
        let inputs: HashSet<&str> = request.input_signals.iter().map(String::as_str).collect();
        let outputs: HashSet<&str> = request.output_signals.iter().map(String::as_str).collect();

        let known_state = |label: u32| {
            if states.contains(&label) {
                Ok(State::new(label))
            } else {
                Err(OrderingError::UnknownState(label))
            }
        };
        let known_input = |name: &str| {
            if inputs.contains(name) {
                Ok(InputSignal::new(name))
            } else {
                Err(OrderingError::UnknownInputSignal(name.to_string()))
            }
        };

        let mut automaton = Automaton::new(
            request.states.iter().copied().map(State::new).collect(),
            dedup(&request.input_signals).map(InputSignal::new).collect(),
            dedup(&request.output_signals).map(OutputSignal::new).collect(),
        );

        for entry in &request.transitions {
            automaton.add_transition(
                known_state(entry.from)?,
                known_input(&entry.input)?,
                known_state(entry.to)?,
            );
        }

        for entry in &request.outputs {
            if !outputs.contains(entry.output.as_str()) {
                return Err(OrderingError::UnknownOutputSignal(entry.output.clone()));
            }
            automaton.add_output(
                known_state(entry.state)?,
                known_input(&entry.input)?,
                OutputSignal::new(entry.output.as_str()),
            );
        }

        Ok(automaton)
    }

    fn rejected(request: &OrderAutomatonRequest, error: String) -> OrderAutomatonResponse {
        OrderAutomatonResponse {
            correlation_id: request.correlation_id,
            success: false,
            state_order: vec![],
            output_order: vec![],
            metrics: OrderingMetrics::default(),
            error: Some(error),
        }
    }
}

impl Default for AutomatonOrderingHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Names in first-occurrence order with repeats dropped.
fn dedup(names: &[String]) -> impl Iterator<Item = &str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .filter(move |name| seen.insert(*name))
}
