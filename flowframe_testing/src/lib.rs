//! Helpers for driving a [`StreamReassembler`] in tests.
//!
//! Streams are cut into fixed-size deliveries sliced from one shared
//! [`Bytes`], so zero-copy units stay observable, and every completed unit is
//! captured together with its stream offset.
//!
//! ```rust
//! use flowframe::LineStyle;
//! use flowframe_testing::collect_lines;
//!
//! let lines = collect_lines(LineStyle::CrOrLf, &b"a\r\nb\n"[..], 2).unwrap();
//! assert_eq!(lines, vec![b"a".to_vec(), b"b".to_vec()]);
//! ```

pub mod logging;

use bytes::Bytes;
use flowframe::{BufferError, FrameLength, LineStyle, StreamReassembler};
pub use logging::{LoggerHandle, logger};

/// A completed unit as seen by the consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedUnit {
    /// Stream offset of the unit's first byte.
    pub position: u64,
    /// The unit's contents.
    pub bytes: Vec<u8>,
    /// Whether the engine exposed the unit without copying.
    pub zero_copy: bool,
}

/// Cut `data` into deliveries of at most `chunk_size` bytes.
///
/// Every delivery shares the allocation of `data`. A `chunk_size` of zero is
/// treated as one.
pub fn deliveries(data: impl Into<Bytes>, chunk_size: usize) -> Vec<Bytes> {
    let data = data.into();
    let step = chunk_size.max(1);
    (0..data.len())
        .step_by(step)
        .map(|start| data.slice(start..(start + step).min(data.len())))
        .collect()
}

/// Feed `data` to `engine` in `chunk_size` deliveries.
///
/// `request` is called once up front and again after each completed unit to
/// ask for the next one.
///
/// # Errors
///
/// Propagates the first [`BufferError`] raised by the engine.
pub fn feed_in_chunks<F>(
    engine: &mut StreamReassembler,
    data: impl Into<Bytes>,
    chunk_size: usize,
    mut request: F,
) -> Result<Vec<CapturedUnit>, BufferError>
where
    F: FnMut(&mut StreamReassembler) -> Result<(), BufferError>,
{
    let mut units = Vec::new();
    request(engine)?;
    for delivery in deliveries(data, chunk_size) {
        engine.feed(delivery)?;
        drain_units(engine, &mut request, &mut units)?;
    }
    Ok(units)
}

/// Capture every ready unit, requesting the next one after each.
///
/// # Errors
///
/// Propagates the first [`BufferError`] raised by `request`.
pub fn drain_units<F>(
    engine: &mut StreamReassembler,
    request: &mut F,
    units: &mut Vec<CapturedUnit>,
) -> Result<(), BufferError>
where
    F: FnMut(&mut StreamReassembler) -> Result<(), BufferError>,
{
    while let Some(view) = engine.unit() {
        units.push(CapturedUnit {
            position: engine.current_stream_position(),
            bytes: view.to_vec(),
            zero_copy: view.is_zero_copy(),
        });
        request(engine)?;
    }
    Ok(())
}

/// Split `data` into lines of `style`, feeding `chunk_size` bytes at a time.
/// An unterminated trailing line is not returned.
///
/// # Errors
///
/// Propagates the first [`BufferError`] raised by the engine.
pub fn collect_lines(
    style: LineStyle,
    data: impl Into<Bytes>,
    chunk_size: usize,
) -> Result<Vec<Vec<u8>>, BufferError> {
    let mut engine = StreamReassembler::new(style);
    let units = feed_in_chunks(&mut engine, data, chunk_size, StreamReassembler::start_line_mode)?;
    Ok(units.into_iter().map(|unit| unit.bytes).collect())
}

/// Split `data` into frames of `length` bytes, feeding `chunk_size` bytes at
/// a time. A trailing short frame is not returned.
///
/// # Errors
///
/// Propagates the first [`BufferError`] raised by the engine.
///
/// # Panics
///
/// Panics if `length` is zero; such frames complete without consuming input.
pub fn collect_frames(
    length: usize,
    data: impl Into<Bytes>,
    chunk_size: usize,
) -> Result<Vec<CapturedUnit>, BufferError> {
    assert!(length > 0, "zero-length frames never consume input");
    let mut engine = StreamReassembler::new(LineStyle::default());
    feed_in_chunks(&mut engine, data, chunk_size, |engine| {
        engine.start_frame_mode(FrameLength::Exact(length), false)
    })
}
