#![cfg(feature = "metrics")]
//! Tests for `flowframe` metrics.
//!
//! These tests drive an engine under a local
//! `metrics_util::debugging::DebuggingRecorder` and inspect the counters it
//! updates.

use flowframe::{
    CapacityPolicy,
    FrameLength,
    LineStyle,
    StreamReassembler,
    metrics::{ALLOCATION_FAILURES, GAPS_TOTAL, UNITS_COMPLETED},
};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn engine() -> StreamReassembler {
    let policy = CapacityPolicy::default()
        .max_capacity(32)
        .min_capacity(8)
        .contract_threshold(16);
    StreamReassembler::with_policy(LineStyle::CrOrLf, policy).expect("valid policy")
}

fn counter_value(snapshotter: &Snapshotter, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| {
            key.key().name() == name
                && label.is_none_or(|(label_key, label_value)| {
                    key.key()
                        .labels()
                        .any(|l| l.key() == label_key && l.value() == label_value)
                })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => count,
            _ => 0,
        })
        .sum()
}

#[test]
fn completed_units_are_counted_by_kind() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let mut engine = engine();
        engine.start_line_mode().expect("start line");
        engine.feed(&b"a\nb\n"[..]).expect("feed");
        engine.start_line_mode().expect("second line");
        engine
            .start_frame_mode(FrameLength::Exact(0), false)
            .expect("empty frame");
    });

    assert_eq!(
        counter_value(&snapshotter, UNITS_COMPLETED, Some(("kind", "line"))),
        2
    );
    assert_eq!(
        counter_value(&snapshotter, UNITS_COMPLETED, Some(("kind", "frame"))),
        1
    );
}

#[rstest]
#[case::idle(false, "idle")]
#[case::abandoned(true, "abandoned")]
fn gaps_are_counted_by_outcome(#[case] pending: bool, #[case] outcome: &str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let mut engine = engine();
        if pending {
            engine.start_line_mode().expect("start line");
            engine.feed(&b"part"[..]).expect("feed");
        }
        engine.report_gap(3);
    });

    assert_eq!(
        counter_value(&snapshotter, GAPS_TOTAL, Some(("outcome", outcome))),
        1
    );
}

#[test]
fn refused_growth_is_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let mut engine = engine();
        engine.start_line_mode().expect("start line");
        assert!(engine.feed(vec![b'x'; 40]).is_err());
    });

    assert_eq!(counter_value(&snapshotter, ALLOCATION_FAILURES, None), 1);
}
