// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the listener sink.

use crate::fixtures::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};
use xunit_sinks::{
    dispatch::{Chain, EventSink, NullSink},
    events::{FailureInfo, RunnerEvent},
    listener::{ListenerSink, RunState, TestListener, TestRecord, TestState},
    summary::SummarySink,
    xml::XmlAggregator,
};

#[derive(Clone, Default)]
struct RecordingListener {
    records: Arc<Mutex<Vec<TestRecord>>>,
}

impl RecordingListener {
    fn records(&self) -> Vec<TestRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl TestListener for RecordingListener {
    fn test_finished(&self, record: TestRecord) {
        self.records.lock().unwrap().push(record);
    }
}

fn sink(total_tests: usize) -> (ListenerSink<RecordingListener>, RecordingListener) {
    init_tracing();
    let listener = RecordingListener::default();
    (ListenerSink::new(listener.clone(), total_tests), listener)
}

fn failure() -> FailureInfo {
    FailureInfo::new(
        "Xunit.Sdk.EqualException",
        "Assert.Equal() Failure",
        Some("at MyType.Fails()".to_owned()),
    )
}

#[test]
fn total_is_reported_verbatim() {
    let (sink, listener) = sink(42);
    assert_eq!(sink.run_state(), RunState::NoTests);

    assert!(sink.on_event(&test_passed("MyType", "Passes", 12)));

    let records = listener.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].total_tests, 42);
    assert_eq!(records[0].state, TestState::Passed);
    assert_eq!(records[0].elapsed_ms, 12);
    assert_eq!(records[0].fixture_type.as_deref(), Some("MyType"));
    assert_eq!(records[0].method.as_deref(), Some("Passes"));
    assert_eq!(sink.run_state(), RunState::Success);
}

#[test]
fn skip_then_fail() {
    let (sink, listener) = sink(2);
    sink.on_event(&test_skipped("MyType", "Skipped", "not \"now\""));
    assert_eq!(sink.run_state(), RunState::Success);
    sink.on_event(&test_failed("MyType", "Fails", 3, failure()));
    assert_eq!(sink.run_state(), RunState::Failure);

    let records = listener.records();
    assert_eq!(records[0].message.as_deref(), Some("not \"now\""));
    assert_eq!(
        records[1].message.as_deref(),
        Some("Xunit.Sdk.EqualException : Assert.Equal() Failure")
    );
    assert_eq!(records[1].stack_trace.as_deref(), Some("at MyType.Fails()"));
}

#[test]
fn class_cleanup_failure_record() {
    let (sink, listener) = sink(5);
    sink.on_event(&test_passed("MyType", "Passes", 1));
    sink.on_event(&class_cleanup_failed("MyType"));

    let records = listener.records();
    assert_eq!(records.len(), 2);
    let record = &records[1];
    assert_eq!(record.name, "*** Test Class Cleanup Failure (MyType) ***");
    assert_eq!(record.state, TestState::Failed);
    assert_eq!(record.total_tests, 5);
    assert_eq!(
        record.message.as_deref(),
        Some("System.InvalidOperationException : cleanup failed")
    );
    assert_eq!(record.stack_trace.as_deref(), Some("at MyType.Dispose()"));
    assert_eq!(sink.run_state(), RunState::Failure);
}

#[test]
fn waiters_are_released_when_assembly_finishes() {
    let (sink, _listener) = sink(0);
    let sink = Arc::new(sink);

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || sink.finished().wait())
        })
        .collect();

    assert!(!sink.finished().wait_timeout(Duration::from_millis(5)));
    sink.on_event(&assembly_finished(0, 0, 0, 0));
    for waiter in waiters {
        waiter.join().expect("waiter didn't panic");
    }
    assert!(sink.finished().is_set());
}

#[test]
fn chained_with_xml_aggregator() {
    let (listener_sink, listener) = sink(3);
    let chain = Chain::new(XmlAggregator::new(SummarySink::new(NullSink)), listener_sink);

    for event in [
        assembly_starting(),
        test_passed("MyType", "Passes", 1),
        test_failed("MyType", "Fails", 2, failure()),
        class_cleanup_failed("MyType"),
        assembly_finished(2, 1, 0, 3),
    ] {
        assert!(chain.on_event(&event));
    }

    let report = chain.first().report().expect("assembly started");
    let summary = report.summary.expect("summary written");
    assert_eq!((summary.total, summary.passed(), summary.errors), (2, 1, 1));

    assert_eq!(listener.records().len(), 3);
    assert_eq!(chain.second().run_state(), RunState::Failure);
    assert!(chain.second().finished().is_set());
}

#[derive(Clone, Copy, Debug)]
enum Outcome {
    Pass,
    Skip,
    Fail,
    Cleanup,
}

fn outcome_event(outcome: Outcome, index: usize) -> RunnerEvent {
    let method = format!("Test{index}");
    match outcome {
        Outcome::Pass => test_passed("MyType", &method, 1),
        Outcome::Skip => test_skipped("MyType", &method, "skip"),
        Outcome::Fail => test_failed("MyType", &method, 1, failure()),
        Outcome::Cleanup => class_cleanup_failed("MyType"),
    }
}

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Pass),
        Just(Outcome::Skip),
        Just(Outcome::Fail),
        Just(Outcome::Cleanup),
    ]
}

proptest! {
    #[test]
    fn run_state_is_monotonic(outcomes in prop::collection::vec(outcome(), 0..40)) {
        let (sink, listener) = sink(outcomes.len());
        let mut expected = RunState::NoTests;

        for (index, outcome) in outcomes.iter().enumerate() {
            sink.on_event(&outcome_event(*outcome, index));
            let reached = match outcome {
                Outcome::Pass | Outcome::Skip => RunState::Success,
                Outcome::Fail | Outcome::Cleanup => RunState::Failure,
            };
            expected = expected.max(reached);
            prop_assert_eq!(sink.run_state(), expected);
        }

        prop_assert_eq!(listener.records().len(), outcomes.len());
    }
}
