//! Metrics collection.
//!
//! # Metrics
//! - `propagation_extractions_total` (counter): inbound extractions by mode and decision
//!   (`stripped` = inbound context discarded, `propagated` = standard extraction)
//! - `propagation_route_table_publishes_total` (counter): route table swaps
//!
//! # Design Decisions
//! - Uses the `metrics` facade; the host installs a recorder/exporter
//! - Without a recorder every call is a no-op

use crate::config::PropagationMode;

pub const EXTRACTIONS_TOTAL: &str = "propagation_extractions_total";
pub const ROUTE_TABLE_PUBLISHES_TOTAL: &str = "propagation_route_table_publishes_total";

/// Outcome of one inbound extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Stripped,
    Propagated,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Stripped => "stripped",
            Decision::Propagated => "propagated",
        }
    }
}

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    metrics::describe_counter!(
        EXTRACTIONS_TOTAL,
        "Inbound trace context extractions by propagation mode and decision"
    );
    metrics::describe_counter!(
        ROUTE_TABLE_PUBLISHES_TOTAL,
        "Route table snapshots published"
    );
}

pub fn record_extraction(mode: PropagationMode, decision: Decision) {
    metrics::counter!(
        EXTRACTIONS_TOTAL,
        "mode" => mode.as_str(),
        "decision" => decision.as_str()
    )
    .increment(1);
}

pub fn record_route_publish() {
    metrics::counter!(ROUTE_TABLE_PUBLISHES_TOTAL).increment(1);
}
