// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::collections::CollectionStore;
use crate::{
    config::ReportConfig,
    dispatch::{EventHandler, EventSink, dispatch},
    errors::SinkDisposedError,
    events::{
        AssemblyCleanupFailed, AssemblyFinished, AssemblyStarting, CaseCleanupFailed,
        ClassCleanupFailed, CollectionCleanupFailed, CollectionFinished, CollectionStarting,
        ErrorOccurred, FailureInfo, MethodCleanupFailed, RunnerEvent, TestCleanupFailed,
        TestFailed, TestPassed, TestResultInfo, TestSkipped,
    },
    summary::{ExecutionSummary, ExecutionSummarySink},
};
use quick_xunit::{
    AssemblyReport, CollectionSummary, ErrorCategory, ErrorEntry, FailureDetail, SourceLocation,
    TestEntry, TestOutcome, Trait, escape,
};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, warn};

/// An event sink that builds an xUnit-style XML report.
///
/// Every event is first forwarded to an inner [`ExecutionSummarySink`], whose totals become the
/// assembly summary when the assembly finishes. The continue signal of the inner sink is passed
/// through unchanged.
///
/// Once [`Self::dispose`] has been called, the aggregator must not be used again:
/// [`EventSink::on_event`] and [`Self::summary`] panic.
#[derive(Debug)]
pub struct XmlAggregator<S> {
    inner: RwLock<Option<S>>,
    config: ReportConfig,
    assembly: Mutex<Option<AssemblyReport>>,
    errors: Mutex<Vec<ErrorEntry>>,
    collections: CollectionStore,
}

impl<S: ExecutionSummarySink> XmlAggregator<S> {
    /// Creates a new aggregator with the default configuration.
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, ReportConfig::default())
    }

    /// Creates a new aggregator with the given configuration.
    pub fn with_config(inner: S, config: ReportConfig) -> Self {
        Self {
            inner: RwLock::new(Some(inner)),
            config,
            assembly: Mutex::new(None),
            errors: Mutex::new(Vec::new()),
            collections: CollectionStore::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Returns the totals tracked by the inner sink.
    ///
    /// # Panics
    ///
    /// Panics if the aggregator has been disposed.
    pub fn summary(&self) -> ExecutionSummary {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        match &*inner {
            Some(inner) => inner.summary(),
            None => panic!("XmlAggregator::summary called after dispose"),
        }
    }

    /// Returns a copy of the report built so far.
    ///
    /// Returns `None` if neither the assembly has started nor any error has been recorded.
    /// Collections are attached to the report once the assembly finishes; errors are always
    /// current.
    pub fn report(&self) -> Option<AssemblyReport> {
        let assembly = self.assembly.lock().unwrap_or_else(PoisonError::into_inner);
        let errors = self.errors.lock().unwrap_or_else(PoisonError::into_inner);
        match &*assembly {
            Some(assembly) => {
                let mut report = assembly.clone();
                report.errors = errors.clone();
                Some(report)
            }
            None if !errors.is_empty() => {
                let mut report = AssemblyReport::default();
                report.errors = errors.clone();
                Some(report)
            }
            None => None,
        }
    }

    /// Returns the number of collections seen so far.
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Returns true if [`Self::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Releases the inner sink and returns it.
    ///
    /// Returns an error if the aggregator was already disposed.
    pub fn dispose(&self) -> Result<S, SinkDisposedError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match inner.take() {
            Some(inner) => {
                debug!("disposed XML aggregator");
                Ok(inner)
            }
            None => Err(SinkDisposedError::new("XmlAggregator")),
        }
    }
}

impl<S: ExecutionSummarySink> EventSink for XmlAggregator<S> {
    fn on_event(&self, event: &RunnerEvent) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let Some(inner) = &*inner else {
            panic!(
                "XmlAggregator received {} event after dispose",
                event.kind_name()
            );
        };

        let keep_going = inner.on_event(event);
        dispatch(
            &XmlHandler {
                aggregator: self,
                summary_source: inner,
            },
            event,
        );
        keep_going
    }
}

/// Handles a single event with access to both the aggregator state and the inner sink.
struct XmlHandler<'a, S> {
    aggregator: &'a XmlAggregator<S>,
    summary_source: &'a S,
}

impl<S> XmlHandler<'_, S> {
    fn add_error(&self, category: ErrorCategory, name: Option<&str>, failure: &FailureInfo) {
        debug!(%category, ?name, "recording error");
        let entry = ErrorEntry::new(category, name.map(escape), failure_detail(failure));
        self.aggregator
            .errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    fn add_test(&self, result: &TestResultInfo, outcome: TestOutcome, store_output: bool) {
        let test = &result.test;
        let mut entry = TestEntry::new(
            escape(&test.display_name),
            &test.class.name,
            &test.method_name,
            outcome,
        );
        entry.set_time(result.execution_time);

        if store_output {
            if let Some(output) = &result.output {
                entry.set_output(output);
            }
        }
        if let Some(source) = &test.test_case.source {
            entry.set_source(SourceLocation::new(
                source.file_name.clone(),
                source.line_number,
            ));
        }
        if self.aggregator.config.store_traits() {
            for (name, values) in &test.test_case.traits {
                for value in values {
                    entry.add_trait(Trait::new(escape(name), escape(value)));
                }
            }
        }

        let collection = self.aggregator.collections.get_or_create(test.collection_id());
        collection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add_test(entry);
    }
}

impl<S: ExecutionSummarySink> EventHandler for XmlHandler<'_, S> {
    fn error_occurred(&self, event: &ErrorOccurred) {
        self.add_error(ErrorCategory::Fatal, None, &event.failure);
    }

    fn assembly_cleanup_failed(&self, event: &AssemblyCleanupFailed) {
        self.add_error(
            ErrorCategory::AssemblyCleanup,
            Some(event.assembly_path.as_str()),
            &event.failure,
        );
    }

    fn assembly_starting(&self, event: &AssemblyStarting) {
        debug!(assembly = %event.assembly_path, "assembly starting");
        let mut report = AssemblyReport::new(&event.assembly_path);
        report
            .set_environment(&event.test_environment)
            .set_test_framework(&event.test_framework_display_name)
            .set_start_time(event.start_time);
        if let Some(config_file) = &event.config_file_path {
            report.set_config_file(config_file);
        }
        if let Some(target_framework) = &event.target_framework {
            report.set_target_framework(target_framework);
        }

        let mut assembly = self
            .aggregator
            .assembly
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if assembly.is_some() {
            warn!(
                assembly = %event.assembly_path,
                "assembly started more than once, replacing previous report",
            );
        }
        *assembly = Some(report);
    }

    fn assembly_finished(&self, _event: &AssemblyFinished) {
        let summary = self.summary_source.summary();
        let mut assembly = self
            .aggregator
            .assembly
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let report = assembly.get_or_insert_with(|| {
            warn!("assembly finished without starting");
            AssemblyReport::default()
        });
        if report.summary.is_some() {
            warn!("assembly finished more than once, keeping the first summary");
            return;
        }

        debug!(
            total = summary.total,
            failed = summary.failed,
            skipped = summary.skipped,
            errors = summary.errors,
            "writing assembly summary",
        );
        report
            .set_summary(summary.into())
            .add_collections(self.aggregator.collections.snapshot());
    }

    fn collection_cleanup_failed(&self, event: &CollectionCleanupFailed) {
        self.add_error(
            ErrorCategory::CollectionCleanup,
            Some(event.collection.display_name.as_str()),
            &event.failure,
        );
    }

    fn collection_starting(&self, event: &CollectionStarting) {
        let collection = self.aggregator.collections.get_or_create(&event.collection.id);
        collection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_name(escape(&event.collection.display_name));
    }

    fn collection_finished(&self, event: &CollectionFinished) {
        let counts = event.counts;
        let collection = self.aggregator.collections.get_or_create(&event.collection.id);
        collection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_summary(CollectionSummary {
                total: counts.tests_run,
                failed: counts.tests_failed,
                skipped: counts.tests_skipped,
                time: counts.execution_time,
            });
    }

    fn case_cleanup_failed(&self, event: &CaseCleanupFailed) {
        self.add_error(
            ErrorCategory::CaseCleanup,
            Some(event.test_case.display_name.as_str()),
            &event.failure,
        );
    }

    fn class_cleanup_failed(&self, event: &ClassCleanupFailed) {
        self.add_error(
            ErrorCategory::ClassCleanup,
            Some(event.class.name.as_str()),
            &event.failure,
        );
    }

    fn method_cleanup_failed(&self, event: &MethodCleanupFailed) {
        self.add_error(
            ErrorCategory::MethodCleanup,
            Some(event.method_name.as_str()),
            &event.failure,
        );
    }

    fn test_cleanup_failed(&self, event: &TestCleanupFailed) {
        self.add_error(
            ErrorCategory::TestCleanup,
            Some(event.test.display_name.as_str()),
            &event.failure,
        );
    }

    fn test_passed(&self, event: &TestPassed) {
        self.add_test(
            &event.result,
            TestOutcome::Pass,
            self.aggregator.config.store_success_output(),
        );
    }

    fn test_failed(&self, event: &TestFailed) {
        self.add_test(
            &event.result,
            TestOutcome::Fail(failure_detail(&event.failure)),
            self.aggregator.config.store_failure_output(),
        );
    }

    fn test_skipped(&self, event: &TestSkipped) {
        self.add_test(
            &event.result,
            TestOutcome::Skip {
                reason: escape(&event.reason),
            },
            self.aggregator.config.store_skipped_output(),
        );
    }
}

fn failure_detail(failure: &FailureInfo) -> FailureDetail {
    let mut detail = FailureDetail::new(escape(&failure.combined_message()));
    if let Some(exception_type) = failure.outer_exception_type() {
        detail.set_exception_type(exception_type);
    }
    if let Some(stack_trace) = failure.combined_stack_trace() {
        detail.set_stack_trace(escape(&stack_trace));
    }
    detail
}
