//! Tests for the process-wide capacity policy.
//!
//! The policy can be installed once per process, so these tests live in their
//! own binary and only one of them installs.

use flowframe::{BufferError, CapacityPolicy, LineStyle, PolicyError, StreamReassembler};

#[test]
fn installed_policy_governs_new_engines() {
    let policy = CapacityPolicy::default()
        .max_capacity(1024)
        .min_capacity(64)
        .contract_threshold(256);
    assert_eq!(CapacityPolicy::install(policy), Ok(()));
    assert_eq!(CapacityPolicy::current(), policy);
    assert_eq!(
        CapacityPolicy::install(CapacityPolicy::default()),
        Err(PolicyError::AlreadyInstalled)
    );

    let mut engine = StreamReassembler::new(LineStyle::CrOrLf);
    assert_eq!(*engine.policy(), policy);
    engine.start_line_mode().expect("start line");
    assert_eq!(
        engine.feed(vec![b'x'; 2000]),
        Err(BufferError::CapacityExceeded {
            requested: 2000,
            max_capacity: 1024,
        })
    );
}

#[test]
fn invalid_policy_is_rejected_before_install() {
    let policy = CapacityPolicy::default()
        .max_capacity(128)
        .min_capacity(64)
        .contract_threshold(32);
    assert_eq!(
        CapacityPolicy::install(policy),
        Err(PolicyError::ThresholdBelowMin {
            threshold: 32,
            min: 64,
        })
    );
}
