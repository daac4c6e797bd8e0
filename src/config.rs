//! Capacity policy for the reassembly buffer.
//!
//! A [`CapacityPolicy`] bounds how far a [`StreamReassembler`] may grow its
//! owned buffer and when it hands memory back after a unit is consumed.
//! Engines either receive a policy explicitly or pick up the process default,
//! which can be installed exactly once before the first engine is built.
//!
//! [`StreamReassembler`]: crate::buffer::StreamReassembler

use std::sync::OnceLock;

use thiserror::Error;

/// Default ceiling for a single assembled unit (10 MiB).
pub const DEFAULT_MAX_CAPACITY: usize = 10 * 1024 * 1024;
/// Default capacity the buffer shrinks back to.
pub const DEFAULT_MIN_CAPACITY: usize = 512;
/// Default capacity at or above which a drained buffer is contracted (2 MiB).
pub const DEFAULT_CONTRACT_THRESHOLD: usize = 2 * 1024 * 1024;

static INSTALLED: OnceLock<CapacityPolicy> = OnceLock::new();

/// Errors raised while validating or installing a [`CapacityPolicy`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// A capacity of zero bytes cannot hold any unit.
    #[error("capacity policy bounds must be non-zero")]
    ZeroCapacity,
    /// The shrink target is larger than the growth ceiling.
    #[error("min capacity {min} exceeds max capacity {max}")]
    MinExceedsMax {
        /// Configured minimum capacity.
        min: usize,
        /// Configured maximum capacity.
        max: usize,
    },
    /// Contracting would never trigger below the shrink target.
    #[error("contract threshold {threshold} is below min capacity {min}")]
    ThresholdBelowMin {
        /// Configured contract threshold.
        threshold: usize,
        /// Configured minimum capacity.
        min: usize,
    },
    /// A process default has already been installed.
    #[error("a process-wide capacity policy is already installed")]
    AlreadyInstalled,
}

/// Bounds and thresholds governing owned-buffer growth and shrinkage.
///
/// All quantities are byte counts. `contract_threshold` is a capacity: once
/// the buffer has grown to at least this size, it is shrunk back towards
/// `min_capacity` as soon as its unit has been consumed or discarded.
///
/// # Examples
///
/// ```
/// use flowframe::CapacityPolicy;
///
/// let policy = CapacityPolicy::default()
///     .max_capacity(64 * 1024)
///     .min_capacity(256)
///     .contract_threshold(16 * 1024);
///
/// assert!(policy.validate().is_ok());
/// assert_eq!(policy.max_capacity, 64 * 1024);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityPolicy {
    /// Hard ceiling for the owned buffer. Units that need more fail with
    /// [`BufferError::CapacityExceeded`](crate::BufferError::CapacityExceeded).
    ///
    /// Default: 10 MiB.
    pub max_capacity: usize,

    /// Capacity the buffer shrinks back to.
    ///
    /// Default: 512 bytes.
    pub min_capacity: usize,

    /// Capacity at or above which a drained buffer is contracted.
    ///
    /// Default: 2 MiB.
    pub contract_threshold: usize,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            min_capacity: DEFAULT_MIN_CAPACITY,
            contract_threshold: DEFAULT_CONTRACT_THRESHOLD,
        }
    }
}

impl CapacityPolicy {
    /// Set the growth ceiling.
    #[must_use]
    pub fn max_capacity(mut self, bytes: usize) -> Self {
        self.max_capacity = bytes;
        self
    }

    /// Set the shrink target.
    #[must_use]
    pub fn min_capacity(mut self, bytes: usize) -> Self {
        self.min_capacity = bytes;
        self
    }

    /// Set the capacity that triggers contraction.
    #[must_use]
    pub fn contract_threshold(mut self, bytes: usize) -> Self {
        self.contract_threshold = bytes;
        self
    }

    /// Check the bounds are mutually consistent.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a bound is zero, when `min_capacity`
    /// exceeds `max_capacity`, or when `contract_threshold` is below
    /// `min_capacity`.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_capacity == 0 || self.min_capacity == 0 {
            return Err(PolicyError::ZeroCapacity);
        }
        if self.min_capacity > self.max_capacity {
            return Err(PolicyError::MinExceedsMax {
                min: self.min_capacity,
                max: self.max_capacity,
            });
        }
        if self.contract_threshold < self.min_capacity {
            return Err(PolicyError::ThresholdBelowMin {
                threshold: self.contract_threshold,
                min: self.min_capacity,
            });
        }
        Ok(())
    }

    /// Install `policy` as the process default used by
    /// [`StreamReassembler::new`](crate::buffer::StreamReassembler::new).
    ///
    /// The default can be installed once; engines built before installation
    /// keep the policy they were constructed with.
    ///
    /// # Errors
    ///
    /// Returns the validation error for an inconsistent policy, or
    /// [`PolicyError::AlreadyInstalled`] on a second installation.
    pub fn install(policy: Self) -> Result<(), PolicyError> {
        policy.validate()?;
        INSTALLED
            .set(policy)
            .map_err(|_| PolicyError::AlreadyInstalled)
    }

    /// The installed process default, or [`CapacityPolicy::default`].
    #[must_use]
    pub fn current() -> Self { INSTALLED.get().copied().unwrap_or_default() }
}
