//! Frame length targets and chunked-frame bookkeeping.

/// Target extent of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameLength {
    /// The frame spans exactly this many bytes.
    Exact(usize),
    /// The frame runs until the end of the stream.
    UntilEof,
}

impl FrameLength {
    /// Interpret a signed length as produced by generated parsers: negative
    /// values mean "until end of stream".
    #[must_use]
    pub fn from_signed(length: i64) -> Self {
        usize::try_from(length).map_or(Self::UntilEof, Self::Exact)
    }

    /// The exact length, if bounded.
    #[must_use]
    pub const fn exact(self) -> Option<usize> {
        match self {
            Self::Exact(length) => Some(length),
            Self::UntilEof => None,
        }
    }
}

impl Default for FrameLength {
    fn default() -> Self { Self::Exact(0) }
}

impl From<usize> for FrameLength {
    fn from(length: usize) -> Self { Self::Exact(length) }
}

/// Length bookkeeping for the frame currently being delivered.
///
/// `length` is always measured from the first byte of the frame. Chunked
/// frames hand their bytes to the consumer piece by piece, so `delivered`
/// counts the bytes already passed through (or lost to gaps).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct FrameTarget {
    pub(crate) length: FrameLength,
    pub(crate) chunked: bool,
    pub(crate) delivered: usize,
}

impl FrameTarget {
    pub(crate) fn new(length: FrameLength, chunked: bool) -> Self {
        Self {
            length,
            chunked,
            delivered: 0,
        }
    }

    /// Bytes still needed to finish the frame.
    pub(crate) fn remaining(&self) -> FrameLength {
        match self.length {
            FrameLength::Exact(length) => FrameLength::Exact(length.saturating_sub(self.delivered)),
            FrameLength::UntilEof => FrameLength::UntilEof,
        }
    }

    /// Record bytes the consumer has seen as a chunk piece.
    pub(crate) fn deliver(&mut self, len: usize) {
        self.delivered = self.delivered.saturating_add(len);
    }

    /// Raise the target to `length`. Returns `false` when the target is
    /// unbounded or already at least that long.
    pub(crate) fn grow(&mut self, length: usize) -> bool {
        match self.length {
            FrameLength::Exact(current) if length > current => {
                self.length = FrameLength::Exact(length);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{FrameLength, FrameTarget};

    #[rstest]
    #[case(-1, FrameLength::UntilEof)]
    #[case(i64::MIN, FrameLength::UntilEof)]
    #[case(0, FrameLength::Exact(0))]
    #[case(42, FrameLength::Exact(42))]
    fn signed_lengths_map_to_targets(#[case] raw: i64, #[case] expected: FrameLength) {
        assert_eq!(FrameLength::from_signed(raw), expected);
    }

    #[test]
    fn grow_never_shrinks() {
        let mut target = FrameTarget::new(FrameLength::Exact(10), false);
        assert!(!target.grow(4));
        assert!(!target.grow(10));
        assert!(target.grow(12));
        assert_eq!(target.length, FrameLength::Exact(12));
    }

    #[test]
    fn unbounded_target_ignores_growth() {
        let mut target = FrameTarget::new(FrameLength::UntilEof, true);
        assert!(!target.grow(100));
        assert_eq!(target.remaining(), FrameLength::UntilEof);
    }

    #[test]
    fn delivered_bytes_reduce_remaining() {
        let mut target = FrameTarget::new(FrameLength::Exact(10), true);
        target.deliver(4);
        assert_eq!(target.remaining(), FrameLength::Exact(6));
        target.deliver(20);
        assert_eq!(target.remaining(), FrameLength::Exact(0));
    }
}
