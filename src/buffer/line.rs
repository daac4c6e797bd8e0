//! Line terminator styles and the resumable terminator scanner.
//!
//! [`ScanState`] carries just enough history between deliveries to recognise
//! a terminator whose bytes are split across two of them, so each delivery is
//! scanned once from its first new byte.

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const NUL: u8 = 0;

/// How line mode recognises the end of a line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineStyle {
    /// CR, LF or CRLF; the LF of a CRLF pair is swallowed.
    #[default]
    CrOrLf,
    /// Only an exact CR followed by LF.
    StrictCrLf,
    /// As [`LineStyle::CrOrLf`], additionally swallowing a NUL after CR.
    CrLfOrNul,
    /// A single caller-chosen delimiter byte.
    Delimiter(u8),
}

impl LineStyle {
    /// Whether `byte` completes a CR terminator seen in an earlier scan.
    fn pairs_with_cr(self, byte: u8) -> bool {
        match self {
            Self::CrOrLf => byte == LF,
            Self::CrLfOrNul => byte == LF || byte == NUL,
            Self::StrictCrLf | Self::Delimiter(_) => false,
        }
    }
}

/// Progress marker carried between scans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScanState {
    /// No partial terminator outstanding.
    #[default]
    Idle,
    /// The last line ended at CR; a following LF belongs to that terminator.
    AfterCr,
    /// Strict mode saw CR and awaits LF.
    CrSeen,
    /// Frame mode has settled any terminator left by a preceding line.
    Frame,
}

/// Result of scanning newly arrived bytes for a terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LineScan {
    /// A terminator ends within the scanned bytes.
    Found {
        /// Scanned bytes up to and including the terminator.
        consumed: usize,
        /// Terminator length, counting bytes carried from earlier scans.
        terminator: usize,
    },
    /// No terminator yet.
    Pending,
}

impl ScanState {
    /// Resolve a CR terminator left by the previous line against the first
    /// byte of new data. Returns `true` when that byte must be skipped.
    pub(crate) fn take_lingering(&mut self, style: LineStyle, first: u8) -> bool {
        if *self != Self::AfterCr {
            return false;
        }
        *self = Self::Idle;
        style.pairs_with_cr(first)
    }

    /// Scan `data` for the next terminator under `style`.
    pub(crate) fn scan(&mut self, style: LineStyle, data: &[u8]) -> LineScan {
        match style {
            LineStyle::CrOrLf | LineStyle::CrLfOrNul => {
                let Some(pos) = data.iter().position(|&b| b == CR || b == LF) else {
                    return LineScan::Pending;
                };
                *self = if data[pos] == CR {
                    Self::AfterCr
                } else {
                    Self::Idle
                };
                LineScan::Found {
                    consumed: pos + 1,
                    terminator: 1,
                }
            }
            LineStyle::StrictCrLf => {
                for (pos, &byte) in data.iter().enumerate() {
                    match byte {
                        CR => *self = Self::CrSeen,
                        LF if *self == Self::CrSeen => {
                            *self = Self::Idle;
                            return LineScan::Found {
                                consumed: pos + 1,
                                terminator: 2,
                            };
                        }
                        _ => *self = Self::Idle,
                    }
                }
                LineScan::Pending
            }
            LineStyle::Delimiter(delimiter) => match data.iter().position(|&b| b == delimiter) {
                Some(pos) => LineScan::Found {
                    consumed: pos + 1,
                    terminator: 1,
                },
                None => LineScan::Pending,
            },
        }
    }
}
