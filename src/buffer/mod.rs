//! Stream-to-unit reassembly engine.
//!
//! A [`StreamReassembler`] sits between a transport feed and a unit-oriented
//! parser. The feed hands over contiguous deliveries ([`feed`]), reports lost
//! byte runs ([`report_gap`]) and signals the end of the stream
//! ([`set_end_of_stream`]). The parser requests the next unit as a line
//! ([`start_line_mode`]) or a frame ([`start_frame_mode`]) and reads it once
//! [`is_ready`] reports completion.
//!
//! Units that arrive whole inside one delivery are exposed as a view into that
//! delivery without copying. Units that straddle deliveries are gathered in an
//! owned buffer whose growth is bounded by a [`CapacityPolicy`].
//!
//! # Examples
//!
//! ```
//! use flowframe::{LineStyle, StreamReassembler};
//!
//! let mut engine = StreamReassembler::new(LineStyle::CrOrLf);
//! engine.start_line_mode()?;
//! engine.feed(&b"GET / HT"[..])?;
//! assert!(!engine.is_ready());
//!
//! engine.feed(&b"TP/1.1\r\nHost"[..])?;
//! assert_eq!(engine.unit().as_deref(), Some(&b"GET / HTTP/1.1"[..]));
//! # Ok::<(), flowframe::BufferError>(())
//! ```
//!
//! [`feed`]: StreamReassembler::feed
//! [`report_gap`]: StreamReassembler::report_gap
//! [`set_end_of_stream`]: StreamReassembler::set_end_of_stream
//! [`start_line_mode`]: StreamReassembler::start_line_mode
//! [`start_frame_mode`]: StreamReassembler::start_frame_mode
//! [`is_ready`]: StreamReassembler::is_ready

pub mod error;
pub mod frame;
pub mod line;

use std::ops::Deref;

use bytes::{Buf, Bytes, BytesMut};
use log::{debug, trace, warn};

pub use error::BufferError;
pub use frame::FrameLength;
use frame::FrameTarget;
pub use line::{LineStyle, ScanState};
use line::LineScan;

use crate::{
    config::{CapacityPolicy, PolicyError},
    metrics::{self, UnitKind},
};

/// Boundary-detection strategy currently in force.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// No unit has been requested.
    #[default]
    Unset,
    /// Units end at a line terminator.
    Line,
    /// Units end after a known or discovered length.
    Frame,
}

/// Read-only view of a completed unit.
///
/// Both variants expose the same bytes; the tag only records where they live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitView<'a> {
    /// The unit lies inside the latest delivery and was not copied.
    Borrowed(&'a [u8]),
    /// The unit was gathered in the engine's own buffer.
    Owned(&'a [u8]),
}

impl<'a> UnitView<'a> {
    /// The unit's bytes.
    #[must_use]
    pub fn as_slice(&self) -> &'a [u8] {
        match *self {
            Self::Borrowed(bytes) | Self::Owned(bytes) => bytes,
        }
    }

    /// Whether the unit is a view into caller-supplied data.
    #[must_use]
    pub fn is_zero_copy(&self) -> bool { matches!(self, Self::Borrowed(_)) }
}

impl Deref for UnitView<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] { self.as_slice() }
}

/// How a reported gap affected the unit in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GapOutcome {
    /// No pending unit was affected; at most the stream position moved.
    Idle,
    /// A chunked frame absorbed the gap and continues.
    Skipped {
        /// Bytes still owed to the frame, `None` when it runs until EOF.
        remaining: Option<usize>,
    },
    /// The pending unit could not be completed and was dropped.
    /// The caller must request the next unit afresh.
    Abandoned {
        /// Buffered bytes thrown away.
        discarded: usize,
    },
}

impl GapOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Skipped { .. } => "skipped",
            Self::Abandoned { .. } => "abandoned",
        }
    }
}

/// State of the pending unit when the stream ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EofStatus {
    /// Nothing was left half-assembled.
    CleanClose,
    /// An until-EOF or chunked frame became ready with `len` bytes.
    UnitFlushed {
        /// Length of the flushed unit.
        len: usize,
    },
    /// The stream ended inside a unit that can no longer complete.
    MidUnit {
        /// Bytes of the unit received before the end.
        bytes_received: usize,
        /// Frame length the unit needed, when known.
        expected: Option<usize>,
    },
}

/// Buffering and framing state machine for one stream direction.
#[derive(Debug)]
pub struct StreamReassembler {
    policy: CapacityPolicy,
    owned: BytesMut,
    capacity: usize,
    input: Bytes,
    complete: bool,
    mode: Mode,
    frame: FrameTarget,
    // Zero-copy unit: `unit_len` bytes at the front of `input`, followed by
    // a terminator, `advance` bytes in total.
    unit_len: usize,
    advance: usize,
    // The ready unit lives in `owned`, even when that is empty.
    assembled: bool,
    default_style: LineStyle,
    style: LineStyle,
    scan: ScanState,
    seq_at_input_end: u64,
    unit_start: u64,
    eof: bool,
    pending_request: bool,
    manual_pending: bool,
}

impl StreamReassembler {
    /// Create an engine using the process-wide [`CapacityPolicy`].
    #[must_use]
    pub fn new(style: LineStyle) -> Self { Self::build(style, CapacityPolicy::current()) }

    /// Create an engine with an explicit capacity policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the policy bounds are inconsistent.
    pub fn with_policy(style: LineStyle, policy: CapacityPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self::build(style, policy))
    }

    fn build(style: LineStyle, policy: CapacityPolicy) -> Self {
        Self {
            policy,
            owned: BytesMut::new(),
            capacity: 0,
            input: Bytes::new(),
            complete: false,
            mode: Mode::Unset,
            frame: FrameTarget::default(),
            unit_len: 0,
            advance: 0,
            assembled: false,
            default_style: style,
            style,
            scan: ScanState::Idle,
            seq_at_input_end: 0,
            unit_start: 0,
            eof: false,
            pending_request: false,
            manual_pending: false,
        }
    }

    // ---------------------------------------------------------------------
    // Ingestion
    // ---------------------------------------------------------------------

    /// Supply the next contiguous delivery of stream bytes.
    ///
    /// Any view of the previous unit is invalidated. If the consumer left a
    /// ready unit or unclaimed bytes behind, they are dropped with a warning
    /// and the current request is re-armed against the new data.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::ManualAssemblyPending`] while the manual
    /// assembly channel is open, and [`BufferError::CapacityExceeded`] when
    /// the unit under assembly outgrows the capacity policy.
    pub fn feed(&mut self, data: impl Into<Bytes>) -> Result<(), BufferError> {
        if self.manual_pending {
            return Err(BufferError::ManualAssemblyPending);
        }
        let data = data.into();
        self.retire_input();
        self.seq_at_input_end += data.len() as u64;
        self.input = data;
        if self.awaiting_first_byte() {
            self.unit_start = self.input_start();
        }
        self.mark_or_copy()
    }

    /// Declare that `len` bytes of the stream were never observed.
    ///
    /// The stream position advances by `len`. A chunked frame absorbs the gap
    /// as long as it does not overrun the frame end; any other pending unit is
    /// abandoned and the engine waits for the caller to request a new one.
    /// A zero-length gap changes nothing.
    pub fn report_gap(&mut self, len: usize) -> GapOutcome {
        if len == 0 {
            return GapOutcome::Idle;
        }
        self.retire_input();
        self.seq_at_input_end += len as u64;

        let outcome = match self.mode {
            Mode::Unset => {
                self.unit_start = self.seq_at_input_end;
                GapOutcome::Idle
            }
            Mode::Frame if self.frame.chunked => self.skip_within_chunked(len),
            Mode::Line | Mode::Frame => self.abandon(),
        };
        metrics::inc_gaps(outcome.as_str());
        outcome
    }

    /// Mark that no further data will arrive.
    ///
    /// An until-EOF frame becomes ready with the bytes gathered so far. A
    /// chunked frame counts its outstanding piece as delivered and completes
    /// with an empty final unit. A line or exact frame left incomplete stays
    /// unready and is reported as [`EofStatus::MidUnit`].
    pub fn set_end_of_stream(&mut self) -> EofStatus {
        self.eof = true;
        if self.complete {
            return EofStatus::CleanClose;
        }
        match self.mode {
            Mode::Unset => EofStatus::CleanClose,
            Mode::Frame if self.frame.chunked || self.frame.length == FrameLength::UntilEof => {
                self.flush_frame()
            }
            Mode::Line | Mode::Frame => {
                let bytes_received = self.owned.len() + self.input.len();
                if bytes_received == 0 {
                    return EofStatus::CleanClose;
                }
                let expected = match self.mode {
                    Mode::Frame => self.frame.length.exact(),
                    _ => None,
                };
                debug!("stream ended mid-unit: bytes_received={bytes_received}, expected={expected:?}");
                EofStatus::MidUnit {
                    bytes_received,
                    expected,
                }
            }
        }
    }

    /// Append `data` through the manual assembly channel.
    ///
    /// Pieces are copied into the owned buffer and grow the current frame;
    /// boundary detection is bypassed until [`finish_buffering`] is called.
    /// The bytes count towards the stream position like a normal delivery.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::CapacityExceeded`] when the assembled frame
    /// would outgrow the capacity policy; nothing is appended in that case.
    ///
    /// [`finish_buffering`]: Self::finish_buffering
    pub fn buffer_chunk(&mut self, data: &[u8]) -> Result<(), BufferError> {
        if !self.manual_pending {
            self.retire_input();
            self.mode = Mode::Frame;
            self.frame = FrameTarget::new(FrameLength::Exact(self.owned.len()), false);
            self.pending_request = true;
            self.manual_pending = true;
            if self.owned.is_empty() {
                self.unit_start = self.seq_at_input_end;
            }
        }
        let required = self.owned.len().saturating_add(data.len());
        self.reserve(required)?;
        self.owned.extend_from_slice(data);
        self.seq_at_input_end += data.len() as u64;
        self.frame.length = FrameLength::Exact(self.owned.len());
        Ok(())
    }

    /// Close the manual assembly channel, making the gathered bytes the
    /// ready unit. The surrounding protocol layer is responsible for telling
    /// the consumer that a unit is waiting.
    pub fn finish_buffering(&mut self) {
        if !self.manual_pending {
            debug!("finish_buffering called without pending manual data");
            return;
        }
        self.manual_pending = false;
        self.complete_owned();
    }

    /// Drop buffered and unconsumed bytes and forget the pending request.
    ///
    /// The stream position is unaffected.
    pub fn discard_pending(&mut self) {
        let discarded = self.owned.len() + self.input.len();
        if discarded > 0 {
            debug!("discarding pending data: bytes={discarded}");
        }
        self.input = Bytes::new();
        self.reset_unit();
        self.unit_start = self.seq_at_input_end;
        self.contract();
    }

    // ---------------------------------------------------------------------
    // Mode control
    // ---------------------------------------------------------------------

    /// Request the next unit as a line in the active line style.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::CapacityExceeded`] when the partial line cannot
    /// be buffered within the capacity policy.
    pub fn start_line_mode(&mut self) -> Result<(), BufferError> {
        self.begin_unit();
        self.mode = Mode::Line;
        self.frame = FrameTarget::default();
        self.pending_request = true;
        if self.scan == ScanState::Frame {
            self.scan = ScanState::Idle;
        }
        self.mark_or_copy_line()
    }

    /// Request the next unit as a frame of `length` bytes.
    ///
    /// A chunked frame is never copied: the consumer reads it piece by piece
    /// through [`chunk`](Self::chunk) and it becomes ready once the final
    /// piece is available.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::CapacityExceeded`] when the partial frame cannot
    /// be buffered within the capacity policy.
    pub fn start_frame_mode(
        &mut self,
        length: FrameLength,
        chunked: bool,
    ) -> Result<(), BufferError> {
        self.begin_unit();
        self.mode = Mode::Frame;
        self.frame = FrameTarget::new(length, chunked);
        self.pending_request = true;
        self.mark_or_copy_frame()?;
        if self.eof && !self.complete && !chunked && length == FrameLength::UntilEof {
            self.flush_frame();
        }
        Ok(())
    }

    /// Raise the current frame's target to `length` bytes and re-check
    /// readiness. Smaller targets, unbounded frames and calls outside frame
    /// mode are left alone.
    ///
    /// Bytes already gathered are kept; a unit that was ready may become
    /// pending again until the larger target is met.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::CapacityExceeded`] when the larger frame cannot
    /// be buffered within the capacity policy.
    pub fn grow_frame(&mut self, length: usize) -> Result<(), BufferError> {
        if self.mode != Mode::Frame {
            debug!("grow_frame called outside frame mode: mode={:?}", self.mode);
            return Ok(());
        }
        if !self.frame.grow(length) {
            return Ok(());
        }
        self.pending_request = true;
        self.complete = false;
        self.assembled = false;
        self.mark_or_copy_frame()
    }

    /// Use `delimiter` as the line terminator until
    /// [`clear_line_delimiter`](Self::clear_line_delimiter) is called.
    pub fn set_line_delimiter(&mut self, delimiter: u8) {
        self.change_style(LineStyle::Delimiter(delimiter));
    }

    /// Return to the line style chosen at construction.
    pub fn clear_line_delimiter(&mut self) { self.change_style(self.default_style); }

    fn change_style(&mut self, style: LineStyle) {
        if self.style != style {
            self.style = style;
            self.scan = ScanState::Idle;
        }
    }

    // ---------------------------------------------------------------------
    // Consumer queries
    // ---------------------------------------------------------------------

    /// Whether a complete unit is exposed.
    #[must_use]
    pub fn is_ready(&self) -> bool { self.complete }

    /// The completed unit, or `None` while it is pending.
    ///
    /// The view stays valid until the next ingestion or mode change, which
    /// the borrow checker enforces.
    #[must_use]
    pub fn unit(&self) -> Option<UnitView<'_>> {
        if !self.complete {
            return None;
        }
        if self.assembled {
            Some(UnitView::Owned(&self.owned))
        } else {
            Some(UnitView::Borrowed(
                self.input.get(..self.unit_len).unwrap_or_default(),
            ))
        }
    }

    /// The completed unit as shareable [`Bytes`]. Borrowed units are sliced
    /// from the delivery without copying.
    #[must_use]
    pub fn unit_bytes(&self) -> Option<Bytes> {
        if !self.complete {
            return None;
        }
        if self.assembled {
            Some(Bytes::copy_from_slice(&self.owned))
        } else {
            Some(self.input.slice(..self.unit_len.min(self.input.len())))
        }
    }

    /// The available piece of an incomplete chunked frame.
    #[must_use]
    pub fn chunk(&self) -> Option<&[u8]> {
        let chunked_pending = self.mode == Mode::Frame && self.frame.chunked && !self.complete;
        (chunked_pending && !self.input.is_empty()).then_some(&self.input[..])
    }

    /// Length of the current unit, or of the bytes on hand while it is
    /// still pending.
    #[must_use]
    pub fn unit_len(&self) -> usize {
        if self.assembled || !self.owned.is_empty() {
            self.owned.len()
        } else if self.complete {
            self.unit_len
        } else {
            self.input.len()
        }
    }

    /// Whether buffered or unconsumed bytes remain.
    #[must_use]
    pub fn has_more_data(&self) -> bool { !self.owned.is_empty() || !self.input.is_empty() }

    /// Stream offset of the first byte of the current (or next) unit.
    ///
    /// For a chunked frame this is the offset of the piece on hand, which
    /// follows the pieces already handed out and any gaps inside the frame.
    #[must_use]
    pub fn current_stream_position(&self) -> u64 {
        if self.mode == Mode::Frame && self.frame.chunked {
            self.unit_start + self.frame.delivered as u64
        } else {
            self.unit_start
        }
    }

    /// Stream offset just past the current unit's content, or past the
    /// current piece of a chunked frame.
    #[must_use]
    pub fn unit_end_position(&self) -> u64 {
        self.current_stream_position() + self.unit_len() as u64
    }

    /// Whether the producer has declared the end of the stream.
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool { self.eof }

    /// Whether the manual assembly channel holds unfinished data.
    #[must_use]
    pub fn has_pending_manual_data(&self) -> bool { self.manual_pending }

    /// Whether a line or frame has been requested and not discarded.
    #[must_use]
    pub fn has_pending_request(&self) -> bool { self.pending_request }

    /// Active boundary-detection strategy.
    #[must_use]
    pub fn mode(&self) -> Mode { self.mode }

    /// Active line style.
    #[must_use]
    pub fn line_style(&self) -> LineStyle { self.style }

    /// Scanner progress carried between deliveries.
    #[must_use]
    pub fn scan_state(&self) -> ScanState { self.scan }

    /// Bytes currently held in the owned buffer.
    #[must_use]
    pub fn buffered_len(&self) -> usize { self.owned.len() }

    /// Current owned-buffer capacity under the policy.
    #[must_use]
    pub fn capacity(&self) -> usize { self.capacity }

    /// Capacity policy this engine enforces.
    #[must_use]
    pub fn policy(&self) -> &CapacityPolicy { &self.policy }

    // ---------------------------------------------------------------------
    // Boundary detection
    // ---------------------------------------------------------------------

    fn mark_or_copy(&mut self) -> Result<(), BufferError> {
        if self.complete {
            return Ok(());
        }
        match self.mode {
            Mode::Line => self.mark_or_copy_line(),
            Mode::Frame => self.mark_or_copy_frame(),
            Mode::Unset => Ok(()),
        }
    }

    fn mark_or_copy_line(&mut self) -> Result<(), BufferError> {
        self.skip_lingering_terminator();
        match self.scan.scan(self.style, &self.input) {
            LineScan::Found {
                consumed,
                terminator,
            } => {
                if self.owned.is_empty() {
                    self.complete_borrowed(consumed.saturating_sub(terminator), consumed);
                } else {
                    self.append(consumed)?;
                    let content = self.owned.len().saturating_sub(terminator);
                    self.owned.truncate(content);
                    self.complete_owned();
                }
            }
            LineScan::Pending => self.append(self.input.len())?,
        }
        Ok(())
    }

    // While pending, an exact non-chunked frame always holds fewer bytes in
    // `owned` than its target.
    fn mark_or_copy_frame(&mut self) -> Result<(), BufferError> {
        if self.scan == ScanState::AfterCr {
            self.skip_lingering_terminator();
        }
        if self.scan != ScanState::AfterCr {
            self.scan = ScanState::Frame;
        }

        let remaining = self.frame.remaining();
        if self.owned.is_empty() {
            if let Some(needed) = remaining.exact()
                && self.input.len() >= needed
            {
                self.complete_borrowed(needed, needed);
            } else if !self.frame.chunked {
                self.append(self.input.len())?;
            }
            return Ok(());
        }

        let mut to_copy = self.input.len();
        let mut completes = false;
        if let Some(needed) = remaining.exact()
            && self.owned.len() + to_copy >= needed
        {
            to_copy = needed.saturating_sub(self.owned.len());
            completes = true;
        }
        self.append(to_copy)?;
        if completes {
            self.complete_owned();
        }
        Ok(())
    }

    fn skip_lingering_terminator(&mut self) {
        let Some(&first) = self.input.first() else {
            return;
        };
        if self.scan.take_lingering(self.style, first) {
            self.input.advance(1);
            if self.owned.is_empty() {
                self.unit_start += 1;
            }
        }
    }

    /// Expose the first `len` bytes of the delivery; `advance` bytes are
    /// consumed once the unit is released.
    fn complete_borrowed(&mut self, len: usize, advance: usize) {
        self.unit_len = len;
        self.advance = advance;
        self.assembled = false;
        self.complete_unit();
    }

    fn complete_owned(&mut self) {
        self.unit_len = 0;
        self.advance = 0;
        self.assembled = true;
        self.complete_unit();
    }

    fn complete_unit(&mut self) {
        self.complete = true;
        let kind = match self.mode {
            Mode::Line => UnitKind::Line,
            Mode::Frame | Mode::Unset => UnitKind::Frame,
        };
        trace!(
            "unit complete: kind={}, len={}, zero_copy={}",
            kind.as_str(),
            self.unit_len(),
            !self.assembled
        );
        metrics::inc_units(kind);
    }

    fn flush_frame(&mut self) -> EofStatus {
        if self.frame.chunked {
            // The outstanding piece was already exposed through `chunk`.
            self.retire_input();
        }
        if self.owned.is_empty() {
            let len = self.input.len();
            self.complete_borrowed(len, len);
        } else {
            self.complete_owned();
        }
        EofStatus::UnitFlushed {
            len: self.unit_len(),
        }
    }

    // ---------------------------------------------------------------------
    // Unit lifecycle
    // ---------------------------------------------------------------------

    /// Move past the consumed unit before a new request.
    fn begin_unit(&mut self) {
        if self.complete {
            let advance = self.advance.min(self.input.len());
            self.input.advance(advance);
        } else if self.mode == Mode::Frame && self.frame.chunked {
            // The consumer has read the outstanding piece.
            self.input.clear();
        } else if !self.owned.is_empty() {
            debug!(
                "abandoning partially assembled unit: bytes={}",
                self.owned.len()
            );
        }
        self.owned.clear();
        self.complete = false;
        self.assembled = false;
        self.unit_len = 0;
        self.advance = 0;
        self.manual_pending = false;
        if self.scan != ScanState::AfterCr {
            self.scan = ScanState::Idle;
        }
        self.unit_start = self.input_start();
        self.contract();
    }

    /// Settle what is left of the previous delivery before new bytes land.
    fn retire_input(&mut self) {
        if self.complete {
            warn!(
                "dropping unconsumed unit before new data: len={}",
                self.unit_len()
            );
            self.input.clear();
            self.owned.clear();
            self.complete = false;
            self.assembled = false;
            self.unit_len = 0;
            self.advance = 0;
            self.frame.delivered = 0;
            return;
        }
        if self.input.is_empty() {
            return;
        }
        if self.mode == Mode::Frame && self.frame.chunked {
            self.frame.deliver(self.input.len());
        } else {
            warn!(
                "dropping unclaimed bytes before new data: bytes={}",
                self.input.len()
            );
        }
        self.input.clear();
    }

    fn skip_within_chunked(&mut self, len: usize) -> GapOutcome {
        match self.frame.remaining() {
            FrameLength::UntilEof => {
                self.frame.deliver(len);
                GapOutcome::Skipped { remaining: None }
            }
            FrameLength::Exact(remaining) if len < remaining => {
                self.frame.deliver(len);
                GapOutcome::Skipped {
                    remaining: Some(remaining - len),
                }
            }
            FrameLength::Exact(remaining) if len == remaining => {
                // The gap covered the tail; finish with an empty final piece.
                self.frame.deliver(len);
                self.complete_borrowed(0, 0);
                GapOutcome::Skipped {
                    remaining: Some(0),
                }
            }
            FrameLength::Exact(_) => self.abandon(),
        }
    }

    fn abandon(&mut self) -> GapOutcome {
        let discarded = self.owned.len();
        debug!("gap interrupted pending unit; resynchronising: discarded={discarded}");
        self.reset_unit();
        self.unit_start = self.seq_at_input_end;
        self.contract();
        GapOutcome::Abandoned { discarded }
    }

    fn reset_unit(&mut self) {
        self.owned.clear();
        self.complete = false;
        self.assembled = false;
        self.mode = Mode::Unset;
        self.frame = FrameTarget::default();
        self.unit_len = 0;
        self.advance = 0;
        self.scan = ScanState::Idle;
        self.pending_request = false;
        self.manual_pending = false;
    }

    fn awaiting_first_byte(&self) -> bool {
        !self.complete && self.owned.is_empty() && self.frame.delivered == 0
    }

    fn input_start(&self) -> u64 { self.seq_at_input_end - self.input.len() as u64 }

    // ---------------------------------------------------------------------
    // Capacity management
    // ---------------------------------------------------------------------

    /// Copy the first `len` bytes of the delivery into the owned buffer.
    fn append(&mut self, len: usize) -> Result<(), BufferError> {
        let len = len.min(self.input.len());
        if len == 0 {
            return Ok(());
        }
        self.reserve(self.owned.len().saturating_add(len))?;
        self.owned.extend_from_slice(&self.input[..len]);
        self.input.advance(len);
        Ok(())
    }

    /// Grow geometrically so the owned buffer can hold `required` bytes.
    fn reserve(&mut self, required: usize) -> Result<(), BufferError> {
        if required <= self.capacity {
            return Ok(());
        }
        let max_capacity = self.policy.max_capacity;
        if required > max_capacity {
            warn!("buffer expansion refused: requested={required}, max_capacity={max_capacity}");
            metrics::inc_allocation_failures();
            return Err(BufferError::CapacityExceeded {
                requested: required,
                max_capacity,
            });
        }
        let target = required
            .max(self.policy.min_capacity)
            .max(self.capacity.saturating_mul(2))
            .min(max_capacity);
        self.owned.reserve(target - self.owned.len());
        debug!("buffer expanded: from={}, to={target}", self.capacity);
        self.capacity = target;
        Ok(())
    }

    /// Shrink a drained buffer back towards the policy minimum.
    fn contract(&mut self) {
        if self.capacity < self.policy.contract_threshold {
            return;
        }
        let target = self.policy.min_capacity.max(self.owned.len());
        if target >= self.capacity {
            return;
        }
        let mut shrunk = BytesMut::with_capacity(target);
        shrunk.extend_from_slice(&self.owned);
        self.owned = shrunk;
        debug!("buffer contracted: from={}, to={target}", self.capacity);
        self.capacity = target;
    }
}
