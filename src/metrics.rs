//! Metric helpers for `stepwire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::runner::Status;

/// Name of the counter tracking executed steps by outcome.
pub const STEPS_TOTAL: &str = "stepwire_steps_total";
/// Name of the counter tracking finished scenarios by outcome.
pub const SCENARIOS_TOTAL: &str = "stepwire_scenarios_total";
/// Name of the counter tracking steps with no matching definition.
pub const UNRESOLVED_STEPS: &str = "stepwire_unresolved_steps_total";
/// Name of the counter tracking definitions created by auto-discovery.
pub const DISCOVERED_DEFINITIONS: &str = "stepwire_discovered_definitions_total";

/// Record a finished step.
pub fn inc_steps(status: Status) {
    #[cfg(feature = "metrics")]
    counter!(STEPS_TOTAL, "status" => status.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = status;
}

/// Record a finished scenario.
pub fn inc_scenarios(status: Status) {
    #[cfg(feature = "metrics")]
    counter!(SCENARIOS_TOTAL, "status" => status.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = status;
}

/// Record a step that matched no definition.
pub fn inc_unresolved() {
    #[cfg(feature = "metrics")]
    counter!(UNRESOLVED_STEPS).increment(1);
}

/// Record a definition created by auto-discovery.
pub fn inc_discovered() {
    #[cfg(feature = "metrics")]
    counter!(DISCOVERED_DEFINITIONS).increment(1);
}
