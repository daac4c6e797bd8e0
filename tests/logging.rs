//! Tests for the diagnostics the engine logs.

use flowframe::{CapacityPolicy, FrameLength, LineStyle, StreamReassembler};
use flowframe_testing::{LoggerHandle, logger};
use log::Level;
use rstest::rstest;

fn engine() -> StreamReassembler {
    let policy = CapacityPolicy::default()
        .max_capacity(32)
        .min_capacity(8)
        .contract_threshold(16);
    StreamReassembler::with_policy(LineStyle::CrOrLf, policy).expect("valid policy")
}

#[rstest]
fn refused_growth_is_logged_at_warn(mut logger: LoggerHandle) {
    let mut engine = engine();
    engine.start_line_mode().expect("start line");
    assert!(engine.feed(vec![b'x'; 40]).is_err());

    let warnings = logger.messages_at(Level::Warn);
    assert!(
        warnings
            .iter()
            .any(|message| message.contains("requested=40") && message.contains("max_capacity=32")),
        "expansion refusal not logged: {warnings:?}"
    );
}

#[rstest]
fn unconsumed_unit_is_logged_when_dropped(mut logger: LoggerHandle) {
    let mut engine = engine();
    engine.start_line_mode().expect("start line");
    engine.feed(&b"first\n"[..]).expect("feed");
    engine.feed(&b"second\n"[..]).expect("feed again");

    let warnings = logger.messages_at(Level::Warn);
    assert!(
        warnings
            .iter()
            .any(|message| message.contains("dropping unconsumed unit") && message.contains("len=5")),
        "dropped unit not logged: {warnings:?}"
    );
}

#[rstest]
fn gap_resynchronisation_is_logged_at_debug(mut logger: LoggerHandle) {
    let mut engine = engine();
    engine
        .start_frame_mode(FrameLength::Exact(8), false)
        .expect("start frame");
    engine.feed(&b"abc"[..]).expect("feed");
    engine.report_gap(2);

    let debug = logger.messages_at(Level::Debug);
    assert!(
        debug
            .iter()
            .any(|message| message.contains("resynchronising") && message.contains("discarded=3")),
        "resynchronisation not logged: {debug:?}"
    );
}
