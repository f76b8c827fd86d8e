// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events produced while a test assembly executes.
//!
//! The main type is [`RunnerEvent`], a closed set of lifecycle notifications. Events are produced
//! by a test execution engine and pushed into an [`EventSink`](crate::dispatch::EventSink).

use chrono::{DateTime, FixedOffset};
use std::{collections::BTreeMap, fmt, time::Duration};

/// A lifecycle notification from a test run.
#[derive(Clone, Debug)]
pub enum RunnerEvent {
    /// A fatal error occurred outside of any test.
    ErrorOccurred(ErrorOccurred),

    /// Cleanup of the assembly failed.
    AssemblyCleanupFailed(AssemblyCleanupFailed),

    /// The assembly started executing.
    AssemblyStarting(AssemblyStarting),

    /// The assembly finished executing.
    AssemblyFinished(AssemblyFinished),

    /// Cleanup of a test collection failed.
    CollectionCleanupFailed(CollectionCleanupFailed),

    /// A test collection started executing.
    CollectionStarting(CollectionStarting),

    /// A test collection finished executing.
    CollectionFinished(CollectionFinished),

    /// Cleanup of a test case failed.
    CaseCleanupFailed(CaseCleanupFailed),

    /// Cleanup of a test class failed.
    ClassCleanupFailed(ClassCleanupFailed),

    /// Cleanup of a test method failed.
    MethodCleanupFailed(MethodCleanupFailed),

    /// Cleanup of a test failed.
    TestCleanupFailed(TestCleanupFailed),

    /// A test passed.
    TestPassed(TestPassed),

    /// A test failed.
    TestFailed(TestFailed),

    /// A test was skipped.
    TestSkipped(TestSkipped),
}

impl RunnerEvent {
    /// Returns a short, stable name for this kind of event, suitable for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RunnerEvent::ErrorOccurred(_) => "error-occurred",
            RunnerEvent::AssemblyCleanupFailed(_) => "assembly-cleanup-failed",
            RunnerEvent::AssemblyStarting(_) => "assembly-starting",
            RunnerEvent::AssemblyFinished(_) => "assembly-finished",
            RunnerEvent::CollectionCleanupFailed(_) => "collection-cleanup-failed",
            RunnerEvent::CollectionStarting(_) => "collection-starting",
            RunnerEvent::CollectionFinished(_) => "collection-finished",
            RunnerEvent::CaseCleanupFailed(_) => "case-cleanup-failed",
            RunnerEvent::ClassCleanupFailed(_) => "class-cleanup-failed",
            RunnerEvent::MethodCleanupFailed(_) => "method-cleanup-failed",
            RunnerEvent::TestCleanupFailed(_) => "test-cleanup-failed",
            RunnerEvent::TestPassed(_) => "test-passed",
            RunnerEvent::TestFailed(_) => "test-failed",
            RunnerEvent::TestSkipped(_) => "test-skipped",
        }
    }
}

/// A fatal error reported by the test framework.
#[derive(Clone, Debug)]
pub struct ErrorOccurred {
    /// The failure.
    pub failure: FailureInfo,
}

/// Cleanup of the assembly failed.
#[derive(Clone, Debug)]
pub struct AssemblyCleanupFailed {
    /// The path to the assembly.
    pub assembly_path: String,

    /// The failure.
    pub failure: FailureInfo,
}

/// The assembly started executing.
#[derive(Clone, Debug)]
pub struct AssemblyStarting {
    /// The path to the assembly.
    pub assembly_path: String,

    /// The configuration file used for this run, if any.
    pub config_file_path: Option<String>,

    /// The target framework the assembly was built for, if known.
    pub target_framework: Option<String>,

    /// A description of the environment, e.g. `64-bit .NET 8.0 [collection-per-class, parallel]`.
    pub test_environment: String,

    /// The display name of the test framework.
    pub test_framework_display_name: String,

    /// The time at which execution started, including the offset from UTC.
    pub start_time: DateTime<FixedOffset>,
}

/// The assembly finished executing.
#[derive(Clone, Debug)]
pub struct AssemblyFinished {
    /// Counts for the whole assembly.
    pub counts: ExecutionCounts,
}

/// Cleanup of a test collection failed.
#[derive(Clone, Debug)]
pub struct CollectionCleanupFailed {
    /// The collection.
    pub collection: CollectionInfo,

    /// The failure.
    pub failure: FailureInfo,
}

/// A test collection started executing.
#[derive(Clone, Debug)]
pub struct CollectionStarting {
    /// The collection.
    pub collection: CollectionInfo,
}

/// A test collection finished executing.
#[derive(Clone, Debug)]
pub struct CollectionFinished {
    /// The collection.
    pub collection: CollectionInfo,

    /// Counts for this collection.
    pub counts: ExecutionCounts,
}

/// Cleanup of a test case failed.
#[derive(Clone, Debug)]
pub struct CaseCleanupFailed {
    /// The test case.
    pub test_case: TestCaseInfo,

    /// The failure.
    pub failure: FailureInfo,
}

/// Cleanup of a test class failed.
#[derive(Clone, Debug)]
pub struct ClassCleanupFailed {
    /// The test class.
    pub class: TestClassInfo,

    /// The failure.
    pub failure: FailureInfo,
}

/// Cleanup of a test method failed.
#[derive(Clone, Debug)]
pub struct MethodCleanupFailed {
    /// The class that declares the method.
    pub class: TestClassInfo,

    /// The name of the method.
    pub method_name: String,

    /// The failure.
    pub failure: FailureInfo,
}

/// Cleanup of a test failed.
#[derive(Clone, Debug)]
pub struct TestCleanupFailed {
    /// The test.
    pub test: TestInfo,

    /// The failure.
    pub failure: FailureInfo,
}

/// A test passed.
#[derive(Clone, Debug)]
pub struct TestPassed {
    /// The result.
    pub result: TestResultInfo,
}

/// A test failed.
#[derive(Clone, Debug)]
pub struct TestFailed {
    /// The result.
    pub result: TestResultInfo,

    /// Why the test failed.
    pub failure: FailureInfo,
}

/// A test was skipped.
#[derive(Clone, Debug)]
pub struct TestSkipped {
    /// The result.
    pub result: TestResultInfo,

    /// Why the test was skipped.
    pub reason: String,
}

/// Counts reported when an assembly or collection finishes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ExecutionCounts {
    /// The number of tests that were run.
    pub tests_run: usize,

    /// The number of tests that failed.
    pub tests_failed: usize,

    /// The number of tests that were skipped.
    pub tests_skipped: usize,

    /// The time taken.
    pub execution_time: Duration,
}

/// Identifies a test collection for the lifetime of a run.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CollectionId(String);

impl CollectionId {
    /// Creates a new collection ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CollectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A test collection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollectionInfo {
    /// The unique ID of the collection.
    pub id: CollectionId,

    /// The display name of the collection.
    pub display_name: String,
}

impl CollectionInfo {
    /// Creates a new `CollectionInfo`.
    pub fn new(id: impl Into<CollectionId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A test class: the fixture that declares test methods.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestClassInfo {
    /// The fully qualified name of the class.
    pub name: String,

    /// The collection the class belongs to.
    pub collection: CollectionInfo,
}

impl TestClassInfo {
    /// Creates a new `TestClassInfo`.
    pub fn new(name: impl Into<String>, collection: CollectionInfo) -> Self {
        Self {
            name: name.into(),
            collection,
        }
    }
}

/// A test case: a test method together with its arguments.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TestCaseInfo {
    /// The display name of the test case.
    pub display_name: String,

    /// Where the test case is defined, if known.
    pub source: Option<SourceInfo>,

    /// Traits attached to the test case. Each trait name maps to its values, in the order they
    /// were declared.
    pub traits: BTreeMap<String, Vec<String>>,
}

impl TestCaseInfo {
    /// Creates a new `TestCaseInfo` with no source information or traits.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    /// Sets the source location.
    pub fn set_source(&mut self, source: SourceInfo) -> &mut Self {
        self.source = Some(source);
        self
    }

    /// Adds a value for the given trait.
    pub fn add_trait(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.traits
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }
}

/// Where a test is defined.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SourceInfo {
    /// The source file.
    pub file_name: Option<String>,

    /// The line within the file.
    pub line_number: Option<u32>,
}

/// A single test: one execution of a test case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestInfo {
    /// The display name of the test.
    pub display_name: String,

    /// The test case this test belongs to.
    pub test_case: TestCaseInfo,

    /// The class that declares the test method.
    pub class: TestClassInfo,

    /// The name of the test method.
    pub method_name: String,
}

impl TestInfo {
    /// Creates a new `TestInfo`. The test case is given the same display name as the test.
    pub fn new(
        display_name: impl Into<String>,
        class: TestClassInfo,
        method_name: impl Into<String>,
    ) -> Self {
        let display_name = display_name.into();
        Self {
            test_case: TestCaseInfo::new(display_name.clone()),
            display_name,
            class,
            method_name: method_name.into(),
        }
    }

    /// Returns the ID of the collection that this test's results are attributed to.
    ///
    /// This is the single place where the owning collection of a test is derived. It currently
    /// uses the collection of the declaring class.
    pub fn collection_id(&self) -> &CollectionId {
        &self.class.collection.id
    }
}

/// Data common to every test result.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestResultInfo {
    /// The test.
    pub test: TestInfo,

    /// The time it took to run the test.
    pub execution_time: Duration,

    /// Output captured while the test ran, if any.
    pub output: Option<String>,
}

impl TestResultInfo {
    /// Creates a new `TestResultInfo` with no captured output.
    pub fn new(test: TestInfo, execution_time: Duration) -> Self {
        Self {
            test,
            execution_time,
            output: None,
        }
    }

    /// Sets the captured output.
    pub fn set_output(&mut self, output: impl Into<String>) -> &mut Self {
        self.output = Some(output.into());
        self
    }
}

/// Information about a failure, flattened across a chain of nested exceptions.
///
/// The three lists run in parallel, outermost exception first.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FailureInfo {
    /// The type name of each exception.
    pub exception_types: Vec<String>,

    /// The message of each exception.
    pub messages: Vec<String>,

    /// The stack trace of each exception, if available.
    pub stack_traces: Vec<Option<String>>,
}

impl FailureInfo {
    /// Creates a new `FailureInfo` for a single exception.
    pub fn new(
        exception_type: impl Into<String>,
        message: impl Into<String>,
        stack_trace: Option<String>,
    ) -> Self {
        Self {
            exception_types: vec![exception_type.into()],
            messages: vec![message.into()],
            stack_traces: vec![stack_trace],
        }
    }

    /// Adds an inner exception below the innermost one recorded so far.
    pub fn with_inner(
        mut self,
        exception_type: impl Into<String>,
        message: impl Into<String>,
        stack_trace: Option<String>,
    ) -> Self {
        self.exception_types.push(exception_type.into());
        self.messages.push(message.into());
        self.stack_traces.push(stack_trace);
        self
    }

    /// Returns the type of the outermost exception.
    pub fn outer_exception_type(&self) -> Option<&str> {
        self.exception_types.first().map(String::as_str)
    }
}
