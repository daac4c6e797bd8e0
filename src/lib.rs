#![doc(html_root_url = "https://docs.rs/flowframe/latest")]
//! Public API for the `flowframe` library.
//!
//! This crate turns a fragmented, possibly gapped byte stream into complete
//! lines or frames for a downstream parser, copying only when a unit spans
//! more than one delivery.

pub mod buffer;
pub mod check;
pub mod config;
pub mod error;
pub mod metrics;

pub use buffer::{
    BufferError,
    EofStatus,
    FrameLength,
    GapOutcome,
    LineStyle,
    Mode,
    ScanState,
    StreamReassembler,
    UnitView,
};
pub use config::{CapacityPolicy, PolicyError};
pub use error::{ErrorKind, ParseError};
pub use metrics::{ALLOCATION_FAILURES, GAPS_TOTAL, UNITS_COMPLETED};
