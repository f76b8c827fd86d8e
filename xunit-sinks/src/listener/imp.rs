// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::run_state::{FinishedSignal, RunState, RunStateCell};
use crate::{
    dispatch::{CancelToken, EventHandler, EventSink, dispatch, should_continue},
    events::{
        AssemblyCleanupFailed, AssemblyFinished, CaseCleanupFailed, ClassCleanupFailed,
        CollectionCleanupFailed, ErrorOccurred, FailureInfo, MethodCleanupFailed, RunnerEvent,
        TestCleanupFailed, TestFailed, TestPassed, TestResultInfo, TestSkipped,
    },
};
use debug_ignore::DebugIgnore;
use quick_xunit::ErrorCategory;
use std::{fmt, time::Duration};
use tracing::debug;

/// The outcome of a single record reported to a [`TestListener`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TestState {
    /// The test passed.
    Passed,

    /// The test failed, or a failure occurred outside of any test.
    Failed,

    /// The test was skipped.
    Ignored,
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestState::Passed => "passed",
            TestState::Failed => "failed",
            TestState::Ignored => "ignored",
        };
        f.pad(s)
    }
}

/// A flattened result, reported once per relevant event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestRecord {
    /// The class that declares the test. `None` for failures outside of a test.
    pub fixture_type: Option<String>,

    /// The test method. `None` for failures outside of a test.
    pub method: Option<String>,

    /// The display name of the test, or a synthesized name for failures outside of a test.
    pub name: String,

    /// The time taken, in milliseconds.
    pub elapsed_ms: u64,

    /// The outcome.
    pub state: TestState,

    /// The total number of tests the host expects, as passed to [`ListenerSink::new`].
    pub total_tests: usize,

    /// The failure message or skip reason, if any.
    pub message: Option<String>,

    /// The stack trace, if any.
    pub stack_trace: Option<String>,
}

/// Receives one [`TestRecord`] for every test result and every failure outside of a test.
pub trait TestListener: Send + Sync {
    /// Called when a test finishes, or when a failure outside of a test occurs.
    fn test_finished(&self, record: TestRecord);
}

impl<F> TestListener for F
where
    F: Fn(TestRecord) + Send + Sync,
{
    fn test_finished(&self, record: TestRecord) {
        self(record)
    }
}

/// An event sink that feeds results to a [`TestListener`] as they arrive, while tracking an
/// overall [`RunState`].
#[derive(Debug)]
pub struct ListenerSink<L> {
    listener: DebugIgnore<L>,
    total_tests: usize,
    run_state: RunStateCell,
    finished: FinishedSignal,
    cancel: Option<CancelToken>,
}

impl<L: TestListener> ListenerSink<L> {
    /// Creates a new sink. `total_tests` is reported verbatim in every record.
    pub fn new(listener: L, total_tests: usize) -> Self {
        Self {
            listener: DebugIgnore(listener),
            total_tests,
            run_state: RunStateCell::new(),
            finished: FinishedSignal::new(),
            cancel: None,
        }
    }

    /// Stops the run once `cancel` is canceled.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Returns the current state of the run.
    pub fn run_state(&self) -> RunState {
        self.run_state.get()
    }

    /// Marks the run as unable to complete. This state is never left.
    pub fn mark_error(&self) {
        self.advance(RunState::Error);
    }

    /// Returns the signal that is set when the assembly finishes.
    pub fn finished(&self) -> &FinishedSignal {
        &self.finished
    }

    fn advance(&self, state: RunState) {
        let previous = self.run_state.advance(state);
        if previous < state {
            debug!(%previous, current = %state, "run state changed");
        }
    }

    fn report_result(
        &self,
        result: &TestResultInfo,
        state: TestState,
        message: Option<String>,
        stack_trace: Option<String>,
    ) {
        let test = &result.test;
        self.listener.test_finished(TestRecord {
            fixture_type: Some(test.class.name.clone()),
            method: Some(test.method_name.clone()),
            name: test.display_name.clone(),
            elapsed_ms: elapsed_ms(result.execution_time),
            state,
            total_tests: self.total_tests,
            message,
            stack_trace,
        });
    }

    fn report_error(&self, category: ErrorCategory, name: Option<&str>, failure: &FailureInfo) {
        let label = error_label(category);
        let name = match name {
            Some(name) => format!("*** {label} ({name}) ***"),
            None => format!("*** {label} ***"),
        };
        debug!(%category, %name, "reporting failure outside of a test");

        self.listener.test_finished(TestRecord {
            fixture_type: None,
            method: None,
            name,
            elapsed_ms: 0,
            state: TestState::Failed,
            total_tests: self.total_tests,
            message: Some(failure.combined_message()),
            stack_trace: failure.combined_stack_trace(),
        });
        self.advance(RunState::Failure);
    }
}

impl<L: TestListener> EventSink for ListenerSink<L> {
    fn on_event(&self, event: &RunnerEvent) -> bool {
        dispatch(self, event);
        should_continue(self.cancel.as_ref())
    }
}

impl<L: TestListener> EventHandler for ListenerSink<L> {
    fn error_occurred(&self, event: &ErrorOccurred) {
        self.report_error(ErrorCategory::Fatal, None, &event.failure);
    }

    fn assembly_cleanup_failed(&self, event: &AssemblyCleanupFailed) {
        self.report_error(
            ErrorCategory::AssemblyCleanup,
            Some(event.assembly_path.as_str()),
            &event.failure,
        );
    }

    fn assembly_finished(&self, _event: &AssemblyFinished) {
        debug!(run_state = %self.run_state(), "assembly finished");
        self.finished.set();
    }

    fn collection_cleanup_failed(&self, event: &CollectionCleanupFailed) {
        self.report_error(
            ErrorCategory::CollectionCleanup,
            Some(event.collection.display_name.as_str()),
            &event.failure,
        );
    }

    fn case_cleanup_failed(&self, event: &CaseCleanupFailed) {
        self.report_error(
            ErrorCategory::CaseCleanup,
            Some(event.test_case.display_name.as_str()),
            &event.failure,
        );
    }

    fn class_cleanup_failed(&self, event: &ClassCleanupFailed) {
        self.report_error(
            ErrorCategory::ClassCleanup,
            Some(event.class.name.as_str()),
            &event.failure,
        );
    }

    fn method_cleanup_failed(&self, event: &MethodCleanupFailed) {
        self.report_error(
            ErrorCategory::MethodCleanup,
            Some(event.method_name.as_str()),
            &event.failure,
        );
    }

    fn test_cleanup_failed(&self, event: &TestCleanupFailed) {
        self.report_error(
            ErrorCategory::TestCleanup,
            Some(event.test.display_name.as_str()),
            &event.failure,
        );
    }

    fn test_passed(&self, event: &TestPassed) {
        self.report_result(&event.result, TestState::Passed, None, None);
        self.advance(RunState::Success);
    }

    fn test_failed(&self, event: &TestFailed) {
        self.report_result(
            &event.result,
            TestState::Failed,
            Some(event.failure.combined_message()),
            event.failure.combined_stack_trace(),
        );
        self.advance(RunState::Failure);
    }

    fn test_skipped(&self, event: &TestSkipped) {
        // The listener shows plain text, so the reason isn't escaped.
        self.report_result(
            &event.result,
            TestState::Ignored,
            Some(event.reason.clone()),
            None,
        );
        self.advance(RunState::Success);
    }
}

fn error_label(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Fatal => "Fatal Error",
        ErrorCategory::AssemblyCleanup => "Test Assembly Cleanup Failure",
        ErrorCategory::CollectionCleanup => "Test Collection Cleanup Failure",
        ErrorCategory::ClassCleanup => "Test Class Cleanup Failure",
        ErrorCategory::MethodCleanup => "Test Method Cleanup Failure",
        ErrorCategory::CaseCleanup => "Test Case Cleanup Failure",
        ErrorCategory::TestCleanup => "Test Cleanup Failure",
    }
}

fn elapsed_ms(time: Duration) -> u64 {
    u64::try_from(time.as_millis()).unwrap_or(u64::MAX)
}
