// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracking totals for a run.

use crate::{
    dispatch::{CancelToken, EventHandler, EventSink, NullSink, dispatch, should_continue},
    events::{
        AssemblyCleanupFailed, AssemblyFinished, CaseCleanupFailed, ClassCleanupFailed,
        CollectionCleanupFailed, ErrorOccurred, MethodCleanupFailed, RunnerEvent,
        TestCleanupFailed,
    },
};
use quick_xunit::AssemblySummary;
use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};
use tracing::debug;

/// Totals for a run.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ExecutionSummary {
    /// The number of tests that were run.
    pub total: usize,

    /// The number of tests that failed.
    pub failed: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,

    /// The number of fatal errors and cleanup failures.
    pub errors: usize,

    /// The time taken.
    pub time: Duration,
}

impl ExecutionSummary {
    /// Returns the number of tests that passed.
    pub fn passed(&self) -> usize {
        AssemblySummary::from(*self).passed()
    }
}

impl From<ExecutionSummary> for AssemblySummary {
    fn from(summary: ExecutionSummary) -> Self {
        AssemblySummary {
            total: summary.total,
            failed: summary.failed,
            skipped: summary.skipped,
            errors: summary.errors,
            time: summary.time,
        }
    }
}

/// An [`EventSink`] that also knows the totals for the run.
pub trait ExecutionSummarySink: EventSink {
    /// Returns the totals observed so far.
    fn summary(&self) -> ExecutionSummary;
}

impl<S: ExecutionSummarySink + ?Sized> ExecutionSummarySink for &S {
    fn summary(&self) -> ExecutionSummary {
        (**self).summary()
    }
}

impl<S: ExecutionSummarySink + ?Sized> ExecutionSummarySink for Box<S> {
    fn summary(&self) -> ExecutionSummary {
        (**self).summary()
    }
}

impl<S: ExecutionSummarySink + ?Sized> ExecutionSummarySink for std::sync::Arc<S> {
    fn summary(&self) -> ExecutionSummary {
        (**self).summary()
    }
}

/// Forwards events to an inner sink while keeping totals for the run.
///
/// Test totals and the time taken come from [`RunnerEvent::AssemblyFinished`]. Every fatal error
/// and cleanup failure adds one to the error count.
#[derive(Debug, Default)]
pub struct SummarySink<S = NullSink> {
    inner: S,
    summary: Mutex<ExecutionSummary>,
    cancel: Option<CancelToken>,
}

impl<S> SummarySink<S> {
    /// Creates a new sink that forwards to `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            summary: Mutex::new(ExecutionSummary::default()),
            cancel: None,
        }
    }

    /// Stops the run once `cancel` is canceled.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Returns the inner sink.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn update(&self, f: impl FnOnce(&mut ExecutionSummary)) {
        let mut summary = self.summary.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut summary);
    }

    fn add_error(&self) {
        self.update(|summary| summary.errors += 1);
    }
}

impl<S: EventSink> EventSink for SummarySink<S> {
    fn on_event(&self, event: &RunnerEvent) -> bool {
        let keep_going = self.inner.on_event(event);
        dispatch(self, event);
        keep_going && should_continue(self.cancel.as_ref())
    }
}

impl<S: EventSink> ExecutionSummarySink for SummarySink<S> {
    fn summary(&self) -> ExecutionSummary {
        *self.summary.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> EventHandler for SummarySink<S> {
    fn error_occurred(&self, _event: &ErrorOccurred) {
        self.add_error();
    }

    fn assembly_cleanup_failed(&self, _event: &AssemblyCleanupFailed) {
        self.add_error();
    }

    fn assembly_finished(&self, event: &AssemblyFinished) {
        let counts = event.counts;
        debug!(
            total = counts.tests_run,
            failed = counts.tests_failed,
            skipped = counts.tests_skipped,
            "recording assembly totals",
        );
        self.update(|summary| {
            summary.total = counts.tests_run;
            summary.failed = counts.tests_failed;
            summary.skipped = counts.tests_skipped;
            summary.time = counts.execution_time;
        });
    }

    fn collection_cleanup_failed(&self, _event: &CollectionCleanupFailed) {
        self.add_error();
    }

    fn case_cleanup_failed(&self, _event: &CaseCleanupFailed) {
        self.add_error();
    }

    fn class_cleanup_failed(&self, _event: &ClassCleanupFailed) {
        self.add_error();
    }

    fn method_cleanup_failed(&self, _event: &MethodCleanupFailed) {
        self.add_error();
    }

    fn test_cleanup_failed(&self, _event: &TestCleanupFailed) {
        self.add_error();
    }
}
