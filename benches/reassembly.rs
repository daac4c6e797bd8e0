//! Criterion benchmarks for line and frame reassembly throughput.
//!
//! Each workload splits the same stream twice: once in deliveries large enough
//! for every unit to be exposed without copying, and once in small deliveries
//! that force units through the owned buffer.

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, black_box};
use flowframe::{BufferError, FrameLength, LineStyle, StreamReassembler};

const LINE_COUNT: usize = 4096;
const FRAME_LENGTH: usize = 256;
const FRAME_COUNT: usize = 1024;

fn line_stream() -> Bytes {
    let mut data = Vec::new();
    for i in 0..LINE_COUNT {
        data.extend_from_slice(format!("header-{i}: value {i}\r\n").as_bytes());
    }
    Bytes::from(data)
}

fn frame_stream() -> Bytes {
    let data: Vec<u8> = (0..FRAME_LENGTH * FRAME_COUNT)
        .map(|i| u8::try_from(i % 251).unwrap_or_default())
        .collect();
    Bytes::from(data)
}

/// Feed `data` in `chunk_size` deliveries and return the total unit length.
fn run<F>(data: &Bytes, chunk_size: usize, mut request: F) -> Result<usize, BufferError>
where
    F: FnMut(&mut StreamReassembler) -> Result<(), BufferError>,
{
    let mut engine = StreamReassembler::new(LineStyle::CrOrLf);
    let mut total = 0;
    request(&mut engine)?;
    let mut offset = 0;
    while offset < data.len() {
        let end = (offset + chunk_size).min(data.len());
        engine.feed(data.slice(offset..end))?;
        offset = end;
        while let Some(unit) = engine.unit() {
            total += black_box(unit.len());
            request(&mut engine)?;
        }
    }
    Ok(total)
}

fn benchmark_lines(c: &mut Criterion) {
    let data = line_stream();
    let mut group = c.benchmark_group("reassembly/lines");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for (label, chunk_size) in [("zero_copy", data.len()), ("assembled", 7)] {
        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            b.iter(|| match run(&data, chunk_size, StreamReassembler::start_line_mode) {
                Ok(total) => total,
                Err(err) => panic!("line benchmark failed: {err}"),
            });
        });
    }

    group.finish();
}

fn benchmark_frames(c: &mut Criterion) {
    let data = frame_stream();
    let mut group = c.benchmark_group("reassembly/frames");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for (label, chunk_size, chunked) in [
        ("zero_copy", data.len(), false),
        ("assembled", FRAME_LENGTH / 3, false),
        ("chunked", FRAME_LENGTH / 3, true),
    ] {
        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            b.iter(|| {
                let request = |engine: &mut StreamReassembler| {
                    engine.start_frame_mode(FrameLength::Exact(FRAME_LENGTH), chunked)
                };
                match run(&data, chunk_size, request) {
                    Ok(total) => total,
                    Err(err) => panic!("frame benchmark failed: {err}"),
                }
            });
        });
    }

    group.finish();
}

/// Entrypoint for reassembly throughput benchmarks.
fn main() {
    let mut criterion = Criterion::default().configure_from_args();
    benchmark_lines(&mut criterion);
    benchmark_frames(&mut criterion);
    criterion.final_summary();
}
