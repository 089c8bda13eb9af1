//! IPC Payloads for Automata Ordering
//!
//! States travel as numeric labels, signals as names. Transition and output
//! tables are flat entry lists; entries missing from a table are "don't care".

use serde::{Deserialize, Serialize};

// ============================================================
// INCOMING REQUESTS
// ============================================================

/// Request to order the states and output signals of an automaton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAutomatonRequest {
    /// Correlation ID for response tracking
    pub correlation_id: [u8; 16],
    /// Reply-to topic for response
    pub reply_to: String,
    /// State labels in declaration order
    pub states: Vec<u32>,
    /// Input signal names in declaration order
    pub input_signals: Vec<String>,
    /// Output signal names in declaration order
    pub output_signals: Vec<String>,
    pub transitions: Vec<TransitionEntry>,
    pub outputs: Vec<OutputEntry>,
}

/// `from --input--> to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub from: u32,
    pub input: String,
    pub to: u32,
}

/// Output emitted by `state` on `input`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub state: u32,
    pub input: String,
    pub output: String,
}

// ============================================================
// OUTGOING RESPONSES
// ============================================================

/// Response with the linear orders, least element first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAutomatonResponse {
    /// Correlation ID from request
    pub correlation_id: [u8; 16],
    /// Whether a linear order was found
    pub success: bool,
    /// State labels from least to greatest (empty on failure)
    pub state_order: Vec<u32>,
    /// Output signal names from least to greatest (empty on failure)
    pub output_order: Vec<String>,
    /// Metrics
    pub metrics: OrderingMetrics,
    /// Error or failure reason (if unsuccessful)
    pub error: Option<String>,
}

/// Ordering metrics for observability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderingMetrics {
    pub state_count: u32,
    pub output_signal_count: u32,
    /// Unordered state pairs, i.e. orbits computed
    pub state_pair_count: u32,
    /// Time taken for ordering (ms)
    pub ordering_time_ms: u64,
}
