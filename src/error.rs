//! Error taxonomy shared by the engine and the parsers built on it.
//!
//! Generated parsers report structural problems through [`ParseError`]; the
//! reassembly engine contributes its own [`BufferError`] as one variant. Every
//! variant carries the location and the expected-versus-actual values as
//! fields, and the message is formatted from those fields alone.
//!
//! # Examples
//!
//! ```
//! use flowframe::{ErrorKind, ParseError};
//!
//! let err = ParseError::OutOfBounds {
//!     location: "Header.length".into(),
//!     needed: 12,
//!     available: 8,
//! };
//!
//! assert_eq!(err.kind(), ErrorKind::BoundsViolation);
//! assert_eq!(err.to_string(), "out of bounds: Header.length: 12 > 8");
//! ```

use thiserror::Error;

use crate::buffer::BufferError;

/// Coarse classification of a [`ParseError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// More bytes were requested than are available.
    BoundsViolation,
    /// A discriminant matched none of the expected cases.
    CaseViolation,
    /// A discriminant had no case at all.
    UnknownCaseIndex,
    /// A computed offset fell below its minimum.
    InvalidOffset,
    /// Fixed content did not match the stream.
    PatternMismatch,
    /// A declared length was nonsensical.
    InvalidLength,
    /// A declared constraint on a field did not hold.
    EnforceViolation,
    /// The reassembly buffer could not grow within its policy.
    AllocationFailure,
    /// The two ingestion channels were mixed.
    IngestionConflict,
}

impl ErrorKind {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BoundsViolation => "bounds_violation",
            Self::CaseViolation => "case_violation",
            Self::UnknownCaseIndex => "unknown_case_index",
            Self::InvalidOffset => "invalid_offset",
            Self::PatternMismatch => "pattern_mismatch",
            Self::InvalidLength => "invalid_length",
            Self::EnforceViolation => "enforce_violation",
            Self::AllocationFailure => "allocation_failure",
            Self::IngestionConflict => "ingestion_conflict",
        }
    }
}

/// Failure raised while turning reassembled units into protocol values.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A field needed more bytes than the unit holds at its offset.
    #[error("out of bounds: {location}: {needed} > {available}")]
    OutOfBounds {
        /// Field or rule being parsed.
        location: String,
        /// Bytes the field needs.
        needed: usize,
        /// Bytes left at the current offset.
        available: usize,
    },

    /// A case discriminant matched none of the listed cases.
    #[error("invalid case: {location}: {index} ({expected})")]
    InvalidCase {
        /// Field or rule being parsed.
        location: String,
        /// Discriminant read from the stream.
        index: i64,
        /// Description of the accepted cases.
        expected: String,
    },

    /// A case discriminant had no case defined at all.
    #[error("invalid index for case: {location}: {index}")]
    InvalidCaseIndex {
        /// Field or rule being parsed.
        location: String,
        /// Discriminant read from the stream.
        index: i64,
    },

    /// A computed offset fell below the minimum permitted.
    #[error("invalid offset: {location}: min_offset = {min_offset}, offset = {offset}")]
    InvalidOffset {
        /// Field or rule being parsed.
        location: String,
        /// Smallest acceptable offset.
        min_offset: usize,
        /// Offset that was computed.
        offset: usize,
    },

    /// Fixed content did not match the stream.
    #[error("pattern mismatch at {location}: expected \"{expected}\", actual \"{actual}\"")]
    PatternMismatch {
        /// Field or rule being parsed.
        location: String,
        /// Pattern the grammar requires, escaped for display.
        expected: String,
        /// Bytes found in the stream, escaped for display.
        actual: String,
    },

    /// A declared length was nonsensical, for example negative.
    #[error("invalid length: {location}: {length}")]
    InvalidLength {
        /// Field or rule being parsed.
        location: String,
        /// Length value that was rejected.
        length: i64,
    },

    /// A declared field constraint evaluated to false.
    #[error("enforce violation: {location}")]
    EnforceViolation {
        /// Constraint that failed.
        location: String,
    },

    /// The reassembly engine refused the operation.
    #[error("buffer failure: {0}")]
    Buffer(#[from] BufferError),
}

impl ParseError {
    /// Classify this error.
    ///
    /// ```
    /// use flowframe::{BufferError, ErrorKind, ParseError};
    ///
    /// let err = ParseError::from(BufferError::CapacityExceeded {
    ///     requested: 4096,
    ///     max_capacity: 1024,
    /// });
    /// assert_eq!(err.kind(), ErrorKind::AllocationFailure);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfBounds { .. } => ErrorKind::BoundsViolation,
            Self::InvalidCase { .. } => ErrorKind::CaseViolation,
            Self::InvalidCaseIndex { .. } => ErrorKind::UnknownCaseIndex,
            Self::InvalidOffset { .. } => ErrorKind::InvalidOffset,
            Self::PatternMismatch { .. } => ErrorKind::PatternMismatch,
            Self::InvalidLength { .. } => ErrorKind::InvalidLength,
            Self::EnforceViolation { .. } => ErrorKind::EnforceViolation,
            Self::Buffer(BufferError::CapacityExceeded { .. }) => ErrorKind::AllocationFailure,
            Self::Buffer(BufferError::ManualAssemblyPending) => ErrorKind::IngestionConflict,
        }
    }

    /// The location recorded by parser-level errors.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::OutOfBounds { location, .. }
            | Self::InvalidCase { location, .. }
            | Self::InvalidCaseIndex { location, .. }
            | Self::InvalidOffset { location, .. }
            | Self::PatternMismatch { location, .. }
            | Self::InvalidLength { location, .. }
            | Self::EnforceViolation { location } => Some(location),
            Self::Buffer(_) => None,
        }
    }

    /// Whether the stream can continue after discarding the pending unit.
    ///
    /// Only an ingestion conflict indicates a caller bug rather than bad
    /// input, so it is the one failure that is not recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool { self.kind() != ErrorKind::IngestionConflict }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
