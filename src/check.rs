//! Guards used by parsers while decoding a reassembled unit.
//!
//! Each helper either passes or returns the matching [`ParseError`] with the
//! location and the offending values filled in.

use crate::error::ParseError;

/// Borrow `len` bytes of `unit` starting at `offset`.
///
/// # Errors
///
/// Returns [`ParseError::OutOfBounds`] when the unit is too short.
///
/// # Examples
///
/// ```
/// use flowframe::check::take;
///
/// let unit = b"\x00\x05hello";
/// assert_eq!(take("Msg.body", unit, 2, 5)?, b"hello");
/// assert!(take("Msg.body", unit, 2, 6).is_err());
/// # Ok::<(), flowframe::ParseError>(())
/// ```
pub fn take<'a>(
    location: &str,
    unit: &'a [u8],
    offset: usize,
    len: usize,
) -> Result<&'a [u8], ParseError> {
    let available = unit.len().saturating_sub(offset);
    offset
        .checked_add(len)
        .and_then(|end| unit.get(offset..end))
        .ok_or_else(|| ParseError::OutOfBounds {
            location: location.to_owned(),
            needed: len,
            available,
        })
}

/// Check that `needed` bytes fit in the `available` ones.
///
/// # Errors
///
/// Returns [`ParseError::OutOfBounds`] when they do not.
pub fn ensure_available(location: &str, needed: usize, available: usize) -> Result<(), ParseError> {
    if needed > available {
        return Err(ParseError::OutOfBounds {
            location: location.to_owned(),
            needed,
            available,
        });
    }
    Ok(())
}

/// Check that a computed offset is not below `min_offset`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidOffset`] otherwise.
pub fn ensure_offset(location: &str, min_offset: usize, offset: usize) -> Result<(), ParseError> {
    if offset < min_offset {
        return Err(ParseError::InvalidOffset {
            location: location.to_owned(),
            min_offset,
            offset,
        });
    }
    Ok(())
}

/// Convert a declared signed length into a byte count.
///
/// # Errors
///
/// Returns [`ParseError::InvalidLength`] for negative lengths.
pub fn checked_length(location: &str, length: i64) -> Result<usize, ParseError> {
    usize::try_from(length).map_err(|_| ParseError::InvalidLength {
        location: location.to_owned(),
        length,
    })
}

/// Check that `data` starts with the fixed `pattern`.
///
/// # Errors
///
/// Returns [`ParseError::PatternMismatch`] with both sides escaped as
/// printable ASCII. The actual side is cut to the pattern's length.
pub fn expect_pattern(location: &str, pattern: &[u8], data: &[u8]) -> Result<(), ParseError> {
    if data.starts_with(pattern) {
        return Ok(());
    }
    let actual = &data[..pattern.len().min(data.len())];
    Err(ParseError::PatternMismatch {
        location: location.to_owned(),
        expected: pattern.escape_ascii().to_string(),
        actual: actual.escape_ascii().to_string(),
    })
}

/// Check a declared field constraint.
///
/// # Errors
///
/// Returns [`ParseError::EnforceViolation`] when `holds` is false.
pub fn enforce(location: &str, holds: bool) -> Result<(), ParseError> {
    if holds {
        Ok(())
    } else {
        Err(ParseError::EnforceViolation {
            location: location.to_owned(),
        })
    }
}

/// Error for a case discriminant outside the accepted set.
#[must_use]
pub fn invalid_case(location: &str, index: i64, expected: &str) -> ParseError {
    ParseError::InvalidCase {
        location: location.to_owned(),
        index,
        expected: expected.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{checked_length, enforce, ensure_offset, expect_pattern, invalid_case, take};
    use crate::error::{ErrorKind, ParseError};

    #[rstest]
    #[case::exact(0, 4, true)]
    #[case::tail(3, 1, true)]
    #[case::overrun(2, 3, false)]
    #[case::offset_past_end(9, 0, false)]
    #[case::empty_at_end(4, 0, true)]
    fn take_checks_bounds(#[case] offset: usize, #[case] len: usize, #[case] ok: bool) {
        let unit = b"abcd";
        assert_eq!(take("t", unit, offset, len).is_ok(), ok);
    }

    #[test]
    fn take_reports_needed_and_available() {
        let err = take("Hdr.len", b"abcd", 1, 8).expect_err("must overrun");
        assert_eq!(
            err,
            ParseError::OutOfBounds {
                location: "Hdr.len".into(),
                needed: 8,
                available: 3,
            }
        );
    }

    #[test]
    fn offset_below_minimum_is_rejected() {
        assert!(ensure_offset("o", 4, 4).is_ok());
        let err = ensure_offset("o", 4, 2).expect_err("below minimum");
        assert_eq!(err.kind(), ErrorKind::InvalidOffset);
    }

    #[test]
    fn negative_lengths_are_invalid() {
        assert_eq!(checked_length("len", 12), Ok(12));
        let err = checked_length("len", -3).expect_err("negative");
        assert_eq!(
            err,
            ParseError::InvalidLength {
                location: "len".into(),
                length: -3,
            }
        );
    }

    #[test]
    fn pattern_mismatch_escapes_control_bytes() {
        assert!(expect_pattern("magic", b"PK", b"PK\x03\x04").is_ok());
        let err = expect_pattern("magic", b"HTTP/", b"\r\nxyzzy").expect_err("mismatch");
        let ParseError::PatternMismatch { expected, actual, .. } = err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(expected, "HTTP/");
        assert_eq!(actual, "\\r\\nxyz");
    }

    #[test]
    fn short_data_is_a_mismatch() {
        let err = expect_pattern("magic", b"ABCD", b"AB").expect_err("too short");
        assert_eq!(err.kind(), ErrorKind::PatternMismatch);
    }

    #[test]
    fn enforce_and_case_errors_carry_location() {
        assert!(enforce("ok", true).is_ok());
        let err = enforce("Msg.version == 2", false).expect_err("violated");
        assert_eq!(err.location(), Some("Msg.version == 2"));
        let err = invalid_case("Msg.type", 9, "1 | 2 | 3");
        assert_eq!(err.to_string(), "invalid case: Msg.type: 9 (1 | 2 | 3)");
    }
}
