//! Metric helpers for `flowframe`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking completed units.
pub const UNITS_COMPLETED: &str = "flowframe_units_completed_total";
/// Name of the counter tracking reported gaps.
pub const GAPS_TOTAL: &str = "flowframe_gaps_total";
/// Name of the counter tracking refused buffer growth.
pub const ALLOCATION_FAILURES: &str = "flowframe_allocation_failures_total";

/// Boundary-detection strategy that produced a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    /// A delimited line.
    Line,
    /// A length-delimited frame.
    Frame,
}

impl UnitKind {
    /// Label value used on metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UnitKind::Line => "line",
            UnitKind::Frame => "frame",
        }
    }
}

/// Record a completed unit.
pub fn inc_units(kind: UnitKind) {
    #[cfg(feature = "metrics")]
    counter!(UNITS_COMPLETED, "kind" => kind.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record a gap, labelled by how the engine absorbed it.
pub fn inc_gaps(outcome: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(GAPS_TOTAL, "outcome" => outcome).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}

/// Record a refused buffer expansion.
pub fn inc_allocation_failures() {
    #[cfg(feature = "metrics")]
    counter!(ALLOCATION_FAILURES).increment(1);
}
