//! Failures raised by the stream reassembly engine itself.
//!
//! The engine only fails when it cannot hold a unit within its capacity
//! policy or when the two ingestion channels are mixed. Gaps and truncated
//! streams are reported through outcome values instead.

use thiserror::Error;

/// Errors produced by [`StreamReassembler`](crate::buffer::StreamReassembler).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// The owned buffer would have to grow past the policy ceiling.
    #[error("buffer expansion to {requested} bytes exceeds max capacity {max_capacity}")]
    CapacityExceeded {
        /// Bytes the pending unit needs to hold.
        requested: usize,
        /// Ceiling from the active capacity policy.
        max_capacity: usize,
    },
    /// Contiguous data arrived while the manual assembly channel was open.
    #[error("contiguous data fed while manual assembly is pending")]
    ManualAssemblyPending,
}
