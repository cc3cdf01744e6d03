#![cfg(feature = "metrics")]
//! Tests for `hciframe` metrics.
//!
//! These tests verify that counters update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.

use hciframe::{
    LimitedAllocator,
    RawFormat,
    Reassembler,
    ReassemblerConfig,
    metrics::{ALLOCATION_FAILURES, FRAMES_FLUSHED, FRAMES_REASSEMBLED, NOISE_BYTES},
};
use hciframe_testing::{acl_frame, command_frame, feed_in_chunks, sco_frame};
use metrics_util::{
    CompositeKey,
    debugging::{DebugValue, DebuggingRecorder, Snapshotter},
};
use rstest::rstest;

type SnapshotEntry = (
    CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
);

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn replay(stream: &[u8], config: ReassemblerConfig, allocator: LimitedAllocator) {
    let mut reassembler = Reassembler::with_allocator(RawFormat, allocator, config);
    feed_in_chunks(&mut reassembler, stream, 7);
}

#[rstest]
#[case::command("command", command_frame(0x0C03, &[]))]
#[case::acl("acl", acl_frame(0x0001, &[1, 2]))]
#[case::sco("sco", sco_frame(0x0001, &[3]))]
fn frames_are_counted_per_family(#[case] family: &str, #[case] frame: Vec<u8>) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        replay(
            &frame,
            ReassemblerConfig::default(),
            LimitedAllocator::new(usize::MAX),
        );
    });

    let metrics = snapshotter.snapshot().into_vec();
    let found = metrics.iter().any(|(k, _, _, v)| {
        k.key().name() == FRAMES_REASSEMBLED
            && k.key()
                .labels()
                .any(|l| l.key() == "family" && l.value() == family)
            && matches!(v, DebugValue::Counter(1))
    });
    assert!(found, "{family} frame not counted: {metrics:#?}");
}

#[test]
fn discarded_traffic_is_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let stream = [
        vec![0x00, 0x00, 0x00],
        acl_frame(0x0001, &[0x10; 40]),
        acl_frame(0x0001, &[0x10; 20]),
    ]
    .concat();

    metrics::with_local_recorder(&recorder, || {
        replay(&stream, ReassemblerConfig::new(32), LimitedAllocator::new(16));
    });

    let metrics = snapshotter.snapshot().into_vec();
    // The abandoned frame's 20 payload bytes are read back as noise.
    assert_counter_eq(&metrics, NOISE_BYTES, 23);
    assert_counter_eq(&metrics, FRAMES_FLUSHED, 1);
    assert_counter_eq(&metrics, ALLOCATION_FAILURES, 1);
}

fn assert_counter_eq(metrics: &[SnapshotEntry], name: &str, expected: u64) {
    assert!(
        metrics.iter().any(|(key, _, _, value)| {
            key.key().name() == name && matches!(value, DebugValue::Counter(c) if *c == expected)
        }),
        "expected {name} == {expected}, got {metrics:#?}"
    );
}
