// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the XML aggregator.

use crate::fixtures::*;
use indoc::indoc;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quick_xunit::ErrorCategory;
use std::thread;
use xunit_sinks::{
    config::ReportConfig,
    dispatch::{EventSink, NullSink},
    events::{FailureInfo, RunnerEvent, TestPassed, TestSkipped},
    summary::{ExecutionSummarySink, SummarySink},
    xml::XmlAggregator,
};

fn aggregator() -> XmlAggregator<SummarySink> {
    init_tracing();
    XmlAggregator::new(SummarySink::new(NullSink))
}

fn feed(sink: &impl EventSink, events: impl IntoIterator<Item = RunnerEvent>) {
    for event in events {
        assert!(sink.on_event(&event), "run continues after {event:?}");
    }
}

#[test]
fn pass_then_fail() {
    let aggregator = aggregator();
    feed(
        &aggregator,
        [
            assembly_starting(),
            test_passed("MyType", "Passes", 100),
            test_failed(
                "MyType",
                "Fails",
                50,
                FailureInfo::new(
                    "System.Exception",
                    "boom",
                    Some("at MyType.Fails()".to_owned()),
                ),
            ),
            assembly_finished(2, 1, 0, 150),
        ],
    );

    let report = aggregator.report().expect("assembly started");
    let xml = report.to_string().expect("serializing report succeeds");
    assert_eq!(
        xml,
        indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <assembly name="/build/MyTests.dll" environment="64-bit .NET 8.0" test-framework="xUnit.net 2.9.0" run-date="2024-05-06" run-time="07:08:09" total="2" passed="1" failed="1" skipped="0" time="0.150" errors="0">
                <errors/>
                <collection>
                    <test name="MyType.Passes" type="MyType" method="Passes" time="0.100" result="Pass"/>
                    <test name="MyType.Fails" type="MyType" method="Fails" time="0.050" result="Fail">
                        <failure exception-type="System.Exception">
                            <message>System.Exception : boom</message>
                            <stack-trace>at MyType.Fails()</stack-trace>
                        </failure>
                    </test>
                </collection>
            </assembly>
        "#},
    );
}

#[test]
fn collections_and_cleanup_failures() {
    let aggregator = aggregator();
    feed(
        &aggregator,
        [
            assembly_starting(),
            collection_starting("First"),
            collection_starting("Second"),
            test_skipped("Second", "Later", "waiting on \"fix\""),
            test_passed("First", "Works", 20),
            collection_finished("First", counts(1, 0, 0, 25)),
            class_cleanup_failed("MyType"),
            collection_finished("Second", counts(1, 0, 1, 5)),
            assembly_finished(2, 0, 1, 40),
        ],
    );

    let report = aggregator.report().expect("assembly started");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].category, ErrorCategory::ClassCleanup);
    assert_eq!(report.errors[0].name.as_deref(), Some("MyType"));

    let xml = report.to_string().expect("serializing report succeeds");
    assert_eq!(
        xml,
        indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <assembly name="/build/MyTests.dll" environment="64-bit .NET 8.0" test-framework="xUnit.net 2.9.0" run-date="2024-05-06" run-time="07:08:09" total="2" passed="1" failed="0" skipped="1" time="0.040" errors="1">
                <errors>
                    <error type="test-class-cleanup" name="MyType">
                        <failure exception-type="System.InvalidOperationException">
                            <message>System.InvalidOperationException : cleanup failed</message>
                            <stack-trace>at MyType.Dispose()</stack-trace>
                        </failure>
                    </error>
                </errors>
                <collection total="1" passed="1" failed="0" skipped="0" name="Test collection for First" time="0.025">
                    <test name="First.Works" type="First" method="Works" time="0.020" result="Pass"/>
                </collection>
                <collection total="1" passed="0" failed="0" skipped="1" name="Test collection for Second" time="0.005">
                    <test name="Second.Later" type="Second" method="Later" time="0.000" result="Skip">
                        <reason>waiting on \&quot;fix\&quot;</reason>
                    </test>
                </collection>
            </assembly>
        "#},
    );
}

#[test]
fn nested_failure_is_combined_and_escaped() {
    let aggregator = aggregator();
    let failure = FailureInfo::new("Outer", "outer", Some("at Outer()".to_owned()))
        .with_inner("Inner", "inner\u{1}", Some("at Inner()".to_owned()));
    feed(
        &aggregator,
        [
            assembly_starting(),
            test_failed("MyType", "Nested", 1, failure),
            assembly_finished(1, 1, 0, 1),
        ],
    );

    let xml = aggregator
        .report()
        .expect("assembly started")
        .to_string()
        .expect("serializing report succeeds");
    assert!(
        xml.contains(
            r"<message>Outer : outer\n----- Inner Exception -----\n---- Inner : inner\x01</message>"
        ),
        "combined message is escaped: {xml}"
    );
    assert!(
        xml.contains(r"<stack-trace>at Outer()\n----- Inner Stack Trace -----\nat Inner()</stack-trace>"),
        "combined stack trace is escaped: {xml}"
    );
}

#[test]
fn output_follows_config() {
    let config = ReportConfig::from_toml_str(indoc! {r#"
        [xml]
        store-success-output = false
        store-skipped-output = true
    "#})
    .expect("config is valid");
    init_tracing();
    let aggregator = XmlAggregator::with_config(SummarySink::new(NullSink), config);

    let mut passed = result("MyType", "Passes", 1);
    passed.set_output("hidden");
    let mut skipped = result("MyType", "Skipped", 0);
    skipped.set_output("shown\n");
    feed(
        &aggregator,
        [
            assembly_starting(),
            RunnerEvent::TestPassed(TestPassed { result: passed }),
            RunnerEvent::TestSkipped(TestSkipped {
                result: skipped,
                reason: "because".to_owned(),
            }),
            assembly_finished(2, 0, 1, 1),
        ],
    );

    let report = aggregator.report().expect("assembly started");
    let tests = &report.collections[0].tests;
    assert_eq!(tests[0].output, None);
    assert_eq!(
        tests[1].output.as_ref().map(|output| output.as_str()),
        Some("shown\n")
    );
}

#[test]
fn concurrent_collections() {
    const THREADS: usize = 8;
    const TESTS_PER_THREAD: usize = 25;

    let aggregator = aggregator();
    aggregator.on_event(&assembly_starting());

    thread::scope(|scope| {
        for thread_index in 0..THREADS {
            let aggregator = &aggregator;
            scope.spawn(move || {
                let own = format!("Class{thread_index}");
                aggregator.on_event(&collection_starting(&own));
                for test_index in 0..TESTS_PER_THREAD {
                    aggregator.on_event(&test_passed(&own, &format!("Test{test_index}"), 1));
                    // Every thread also reports into one shared collection.
                    aggregator.on_event(&test_passed(
                        "Shared",
                        &format!("Test{thread_index}x{test_index}"),
                        1,
                    ));
                }
            });
        }
    });

    let total = THREADS * TESTS_PER_THREAD * 2;
    aggregator.on_event(&assembly_finished(total, 0, 0, 100));
    assert_eq!(aggregator.collection_count(), THREADS + 1);

    let report = aggregator.report().expect("assembly started");
    assert_eq!(report.collections.len(), THREADS + 1);
    let shared: Vec<_> = report
        .collections
        .iter()
        .filter(|collection| collection.name.is_none())
        .collect();
    assert_eq!(shared.len(), 1, "exactly one shared collection");
    assert_eq!(shared[0].tests.len(), THREADS * TESTS_PER_THREAD);
    for collection in &report.collections {
        if collection.name.is_some() {
            assert_eq!(collection.tests.len(), TESTS_PER_THREAD);
        }
    }
    assert_eq!(
        report.collections.iter().map(|c| c.tests.len()).sum::<usize>(),
        total
    );
}

#[test]
fn dispose_twice_is_an_error() {
    let aggregator = aggregator();
    feed(&aggregator, [assembly_starting(), assembly_finished(0, 0, 0, 0)]);

    let inner = aggregator.dispose().expect("first dispose succeeds");
    assert_eq!(inner.summary().total, 0);
    let error = aggregator.dispose().expect_err("second dispose fails");
    assert_eq!(error.to_string(), "XmlAggregator was already disposed");
}

#[test]
#[should_panic(expected = "after dispose")]
fn event_after_dispose_panics() {
    let aggregator = aggregator();
    let _inner = aggregator.dispose().expect("first dispose succeeds");
    aggregator.on_event(&assembly_starting());
}

fn consistent_counts() -> impl Strategy<Value = (usize, usize, usize)> {
    (0usize..500)
        .prop_flat_map(|total| (Just(total), 0..=total))
        .prop_flat_map(|(total, failed)| (Just(total), Just(failed), 0..=total - failed))
}

proptest! {
    #[test]
    fn passed_is_total_minus_failed_and_skipped(
        (total, failed, skipped) in consistent_counts(),
        millis in 0u64..10_000,
    ) {
        let aggregator = aggregator();
        feed(
            &aggregator,
            [assembly_starting(), assembly_finished(total, failed, skipped, millis)],
        );

        let xml = aggregator
            .report()
            .expect("assembly started")
            .to_string()
            .expect("serializing report succeeds");
        let expected = format!(
            r#"total="{total}" passed="{}" failed="{failed}" skipped="{skipped}""#,
            total - failed - skipped,
        );
        prop_assert!(xml.contains(&expected), "{expected} not in {xml}");
    }
}
