//! `flowframe` binary: split a byte stream into lines or frames.
//!
//! The input is read whole and handed to the engine in `--chunk-size`
//! deliveries. Each completed unit is printed as its stream offset, length
//! and escaped contents, separated by tabs.

mod cli;

use std::{
    fs,
    io::{self, Read, Write},
    num::NonZeroUsize,
    path::Path,
    process::ExitCode,
};

use bytes::Bytes;
use clap::Parser;
use flowframe::{
    BufferError,
    CapacityPolicy,
    EofStatus,
    FrameLength,
    LineStyle,
    PolicyError,
    StreamReassembler,
};
use tracing::{debug, error, warn};

use crate::cli::{Cli, Command, Style};

/// Failures surfaced to the user.
#[derive(Debug, thiserror::Error)]
enum RunError {
    /// Reading the input or writing the output failed.
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
    /// The requested capacity bounds are inconsistent.
    #[error("invalid capacity policy: {0}")]
    Policy(#[from] PolicyError),
    /// The engine refused the input.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Unit requested after each completed one.
#[derive(Clone, Copy, Debug)]
enum Request {
    Line,
    Frame { length: FrameLength, chunked: bool },
}

impl Request {
    fn start(self, engine: &mut StreamReassembler) -> Result<(), BufferError> {
        match self {
            Self::Line => engine.start_line_mode(),
            Self::Frame { length, chunked } => engine.start_frame_mode(length, chunked),
        }
    }

    fn runs_to_eof(self) -> bool {
        matches!(
            self,
            Self::Frame {
                length: FrameLength::UntilEof,
                ..
            }
        )
    }
}

fn main() -> ExitCode {
    // Library log records reach the subscriber through the `log` bridge.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("flowframe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), RunError> {
    if let Some(max_capacity) = cli.max_capacity {
        let defaults = CapacityPolicy::default();
        let policy = defaults
            .max_capacity(max_capacity)
            .min_capacity(defaults.min_capacity.min(max_capacity))
            .contract_threshold(defaults.contract_threshold.min(max_capacity));
        CapacityPolicy::install(policy)?;
    }

    let (engine, request, file) = match &cli.command {
        Command::Lines(args) => {
            let mut engine = StreamReassembler::new(line_style(args.style));
            if let Some(delimiter) = args.delimiter {
                engine.set_line_delimiter(delimiter);
            }
            (engine, Request::Line, args.file.as_deref())
        }
        Command::Frames(args) => {
            let length = args
                .length
                .map_or(FrameLength::UntilEof, |length| FrameLength::Exact(length.get()));
            let request = Request::Frame {
                length,
                chunked: args.chunked,
            };
            (
                StreamReassembler::new(LineStyle::default()),
                request,
                args.file.as_deref(),
            )
        }
    };

    let input = read_input(file)?;
    debug!("splitting input: bytes={}, chunk_size={}", input.len(), cli.chunk_size);
    let mut out = io::stdout().lock();
    split(engine, request, &input, cli.chunk_size, &mut out)?;
    out.flush()?;
    Ok(())
}

fn line_style(style: Style) -> LineStyle {
    match style {
        Style::CrOrLf => LineStyle::CrOrLf,
        Style::StrictCrlf => LineStyle::StrictCrLf,
        Style::CrLfOrNul => LineStyle::CrLfOrNul,
    }
}

fn read_input(file: Option<&Path>) -> io::Result<Bytes> {
    let data = match file {
        Some(path) => fs::read(path)?,
        None => {
            let mut data = Vec::new();
            io::stdin().lock().read_to_end(&mut data)?;
            data
        }
    };
    Ok(Bytes::from(data))
}

/// Feed `input` through `engine` and print every unit it yields.
fn split(
    mut engine: StreamReassembler,
    request: Request,
    input: &Bytes,
    chunk_size: NonZeroUsize,
    out: &mut impl Write,
) -> Result<(), RunError> {
    request.start(&mut engine)?;
    let mut offset = 0;
    while offset < input.len() {
        let end = offset.saturating_add(chunk_size.get()).min(input.len());
        engine.feed(input.slice(offset..end))?;
        offset = end;
        drain(&mut engine, request, out)?;
    }

    if let EofStatus::MidUnit {
        bytes_received,
        expected,
    } = engine.set_end_of_stream()
    {
        warn!("input ended inside a unit: bytes_received={bytes_received}, expected={expected:?}");
    }
    drain(&mut engine, request, out)
}

fn drain(
    engine: &mut StreamReassembler,
    request: Request,
    out: &mut impl Write,
) -> Result<(), RunError> {
    while let Some(unit) = engine.unit() {
        writeln!(
            out,
            "{}\t{}\t{}",
            engine.current_stream_position(),
            unit.len(),
            unit.escape_ascii()
        )?;
        if engine.is_end_of_stream() && request.runs_to_eof() {
            return Ok(());
        }
        request.start(engine)?;
    }
    if let Some(piece) = engine.chunk() {
        writeln!(
            out,
            "{}\t{}\t{}\tpartial",
            engine.current_stream_position(),
            piece.len(),
            piece.escape_ascii()
        )?;
    }
    Ok(())
}
