//! Command line interface for the `flowframe` binary.
//!
//! The binary splits a file, or standard input, into lines or frames by
//! feeding it through the reassembly engine in fixed-size deliveries. The
//! definition is shared with `build.rs`, which renders the man page, so it
//! depends on nothing but `clap`.

use std::{num::NonZeroUsize, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command line arguments for the `flowframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "flowframe",
    version,
    about = "Split a byte stream into lines or frames"
)]
pub struct Cli {
    /// Bytes handed to the engine per delivery.
    #[arg(long, global = true, default_value = "4096")]
    pub chunk_size: NonZeroUsize,
    /// Largest unit the engine may assemble, in bytes.
    #[arg(long, global = true)]
    pub max_capacity: Option<usize>,
    #[command(subcommand)]
    pub command: Command,
}

/// Unit type to split the input into.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split the input into lines.
    Lines(LinesArgs),
    /// Split the input into frames.
    Frames(FramesArgs),
}

/// Options for line splitting.
#[derive(Debug, Args)]
pub struct LinesArgs {
    /// Line terminator convention.
    #[arg(long, value_enum, default_value_t = Style::CrOrLf)]
    pub style: Style,
    /// Single delimiter byte, as a character or `0xNN`; overrides `--style`.
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Input file; standard input when omitted.
    pub file: Option<PathBuf>,
}

/// Options for frame splitting.
#[derive(Debug, Args)]
pub struct FramesArgs {
    /// Frame length in bytes; without it the whole input is one frame.
    #[arg(long)]
    pub length: Option<NonZeroUsize>,
    /// Print frames piece by piece as deliveries arrive instead of
    /// assembling them.
    #[arg(long)]
    pub chunked: bool,
    /// Input file; standard input when omitted.
    pub file: Option<PathBuf>,
}

/// Line terminator conventions selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Style {
    /// CR, LF or CRLF.
    CrOrLf,
    /// CRLF only.
    StrictCrlf,
    /// CR, LF, CRLF or CR NUL.
    CrLfOrNul,
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    if let Some(hex) = raw.strip_prefix("0x") {
        return u8::from_str_radix(hex, 16).map_err(|err| format!("invalid hex delimiter: {err}"));
    }
    match raw.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(format!("delimiter must be a single byte or 0xNN, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, path::Path};

    use clap::Parser;
    use rstest::rstest;

    use super::{Cli, Command, Style};

    #[test]
    fn lines_defaults() {
        let cli = Cli::parse_from(["flowframe", "lines"]);
        assert_eq!(cli.chunk_size.get(), 4096);
        assert_eq!(cli.max_capacity, None);
        let Command::Lines(args) = cli.command else {
            panic!("expected lines subcommand");
        };
        assert_eq!(args.style, Style::CrOrLf);
        assert_eq!(args.delimiter, None);
        assert!(args.file.is_none());
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = Cli::parse_from([
            "flowframe",
            "frames",
            "--length",
            "16",
            "--chunked",
            "--chunk-size",
            "3",
            "input.bin",
        ]);
        assert_eq!(cli.chunk_size.get(), 3);
        let Command::Frames(args) = cli.command else {
            panic!("expected frames subcommand");
        };
        assert_eq!(args.length.map(NonZeroUsize::get), Some(16));
        assert!(args.chunked);
        assert_eq!(args.file.as_deref(), Some(Path::new("input.bin")));
    }

    #[rstest]
    #[case::character("|", b'|')]
    #[case::hex("0x00", 0)]
    #[case::hex_upper("0x1F", 0x1f)]
    fn parses_delimiters(#[case] raw: &str, #[case] expected: u8) {
        let cli = Cli::parse_from(["flowframe", "lines", "--delimiter", raw]);
        let Command::Lines(args) = cli.command else {
            panic!("expected lines subcommand");
        };
        assert_eq!(args.delimiter, Some(expected));
    }

    #[rstest]
    #[case::two_chars("ab")]
    #[case::bad_hex("0xzz")]
    #[case::zero_chunk("--chunk-size=0")]
    fn rejects_bad_values(#[case] raw: &str) {
        let args: Vec<&str> = if raw.starts_with("--") {
            vec!["flowframe", raw, "lines"]
        } else {
            vec!["flowframe", "lines", "--delimiter", raw]
        };
        assert!(Cli::try_parse_from(args).is_err());
    }
}
