// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    SerializeError,
    serialize::{serialize_assemblies, serialize_assembly},
};
use chrono::{DateTime, FixedOffset};
use std::{fmt, io, time::Duration};

/// The root element of a report that covers several assemblies.
///
/// Serialized as `<assemblies>`.
#[derive(Clone, Debug, Default)]
pub struct AssembliesReport {
    /// The time at which the report was generated.
    pub timestamp: Option<DateTime<FixedOffset>>,

    /// The assemblies contained in this report.
    pub assemblies: Vec<AssemblyReport>,
}

impl AssembliesReport {
    /// Creates a new, empty `AssembliesReport`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timestamp for the report.
    pub fn set_timestamp(&mut self, timestamp: impl Into<DateTime<FixedOffset>>) -> &mut Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Adds an assembly to the report.
    pub fn add_assembly(&mut self, assembly: AssemblyReport) -> &mut Self {
        self.assemblies.push(assembly);
        self
    }

    /// Serialize this report to the given writer.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), SerializeError> {
        serialize_assemblies(self, writer)
    }

    /// Serialize this report to a string.
    pub fn to_string(&self) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// The report for a single test assembly.
///
/// Serialized as `<assembly>`. The run summary is written once, when the assembly finishes; until
/// then `summary` is `None` and the summary attributes are omitted.
#[derive(Clone, Debug, Default)]
pub struct AssemblyReport {
    /// The name of the assembly, typically its path.
    pub name: String,

    /// A description of the environment the tests ran in.
    pub environment: String,

    /// The display name of the test framework.
    pub test_framework: String,

    /// The time at which the assembly started executing. Serialized as the `run-date` and
    /// `run-time` attributes.
    pub start_time: Option<DateTime<FixedOffset>>,

    /// The configuration file used for the run, if any.
    pub config_file: Option<String>,

    /// The target framework of the assembly, if known.
    pub target_framework: Option<String>,

    /// Summary counters for the run.
    pub summary: Option<AssemblySummary>,

    /// Failures that aren't associated with a single test.
    pub errors: Vec<ErrorEntry>,

    /// The collections in this assembly, in the order they were first seen.
    pub collections: Vec<CollectionReport>,
}

impl AssemblyReport {
    /// Creates a new `AssemblyReport` with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the environment description.
    pub fn set_environment(&mut self, environment: impl Into<String>) -> &mut Self {
        self.environment = environment.into();
        self
    }

    /// Sets the test framework display name.
    pub fn set_test_framework(&mut self, test_framework: impl Into<String>) -> &mut Self {
        self.test_framework = test_framework.into();
        self
    }

    /// Sets the start time for the assembly.
    pub fn set_start_time(&mut self, start_time: impl Into<DateTime<FixedOffset>>) -> &mut Self {
        self.start_time = Some(start_time.into());
        self
    }

    /// Sets the configuration file path.
    pub fn set_config_file(&mut self, config_file: impl Into<String>) -> &mut Self {
        self.config_file = Some(config_file.into());
        self
    }

    /// Sets the target framework.
    pub fn set_target_framework(&mut self, target_framework: impl Into<String>) -> &mut Self {
        self.target_framework = Some(target_framework.into());
        self
    }

    /// Sets the summary counters.
    pub fn set_summary(&mut self, summary: AssemblySummary) -> &mut Self {
        self.summary = Some(summary);
        self
    }

    /// Adds an error entry.
    pub fn add_error(&mut self, error: ErrorEntry) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Adds a collection.
    pub fn add_collection(&mut self, collection: CollectionReport) -> &mut Self {
        self.collections.push(collection);
        self
    }

    /// Adds several collections.
    pub fn add_collections(
        &mut self,
        collections: impl IntoIterator<Item = CollectionReport>,
    ) -> &mut Self {
        self.collections.extend(collections);
        self
    }

    /// Serialize this report to the given writer.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), SerializeError> {
        serialize_assembly(self, writer)
    }

    /// Serialize this report to a string.
    pub fn to_string(&self) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Summary counters for an assembly.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AssemblySummary {
    /// The total number of tests run.
    pub total: usize,

    /// The number of tests that failed.
    pub failed: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,

    /// The number of errors (fatal errors and cleanup failures).
    pub errors: usize,

    /// The overall time taken.
    pub time: Duration,
}

impl AssemblySummary {
    /// Returns the number of tests that passed: `total - failed - skipped`.
    pub fn passed(&self) -> usize {
        passed_count(self.total, self.failed, self.skipped)
    }
}

/// A single test collection: a group of tests that share context.
///
/// Serialized as `<collection>`.
#[derive(Clone, Debug, Default)]
pub struct CollectionReport {
    /// The display name of the collection, once known.
    pub name: Option<String>,

    /// Summary counters, written when the collection finishes.
    pub summary: Option<CollectionSummary>,

    /// The tests in this collection, in the order their results arrived.
    pub tests: Vec<TestEntry>,
}

impl CollectionReport {
    /// Creates a new, empty `CollectionReport`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the summary counters.
    pub fn set_summary(&mut self, summary: CollectionSummary) -> &mut Self {
        self.summary = Some(summary);
        self
    }

    /// Appends a test entry.
    pub fn add_test(&mut self, test: TestEntry) -> &mut Self {
        self.tests.push(test);
        self
    }
}

/// Summary counters for a collection.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CollectionSummary {
    /// The total number of tests run.
    pub total: usize,

    /// The number of tests that failed.
    pub failed: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,

    /// The time taken by the collection.
    pub time: Duration,
}

impl CollectionSummary {
    /// Returns the number of tests that passed: `total - failed - skipped`.
    pub fn passed(&self) -> usize {
        passed_count(self.total, self.failed, self.skipped)
    }
}

fn passed_count(total: usize, failed: usize, skipped: usize) -> usize {
    total.saturating_sub(failed).saturating_sub(skipped)
}

/// The result of a single test.
///
/// Serialized as `<test>`.
#[derive(Clone, Debug)]
pub struct TestEntry {
    /// The display name of the test.
    pub name: String,

    /// The type that declares the test method.
    pub type_name: String,

    /// The name of the test method.
    pub method: String,

    /// The time it took to run the test.
    pub time: Duration,

    /// The outcome of the test.
    pub outcome: TestOutcome,

    /// Output captured while the test ran.
    pub output: Option<Output>,

    /// Where the test is defined.
    pub source: Option<SourceLocation>,

    /// Traits attached to the test.
    pub traits: Vec<Trait>,
}

impl TestEntry {
    /// Creates a new test entry.
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        method: impl Into<String>,
        outcome: TestOutcome,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            method: method.into(),
            time: Duration::ZERO,
            outcome,
            output: None,
            source: None,
            traits: vec![],
        }
    }

    /// Sets the time taken.
    pub fn set_time(&mut self, time: Duration) -> &mut Self {
        self.time = time;
        self
    }

    /// Sets the captured output.
    ///
    /// Output that is empty or only contains whitespace, once non-printable characters are
    /// removed, is not stored.
    pub fn set_output(&mut self, output: impl AsRef<str>) -> &mut Self {
        let output = Output::new(output);
        if !output.as_str().trim().is_empty() {
            self.output = Some(output);
        }
        self
    }

    /// Sets the source location.
    pub fn set_source(&mut self, source: SourceLocation) -> &mut Self {
        self.source = Some(source);
        self
    }

    /// Adds a trait.
    pub fn add_trait(&mut self, test_trait: impl Into<Trait>) -> &mut Self {
        self.traits.push(test_trait.into());
        self
    }

    /// Adds several traits.
    pub fn add_traits(&mut self, traits: impl IntoIterator<Item = impl Into<Trait>>) -> &mut Self {
        for test_trait in traits {
            self.add_trait(test_trait);
        }
        self
    }
}

/// The outcome of a test.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestOutcome {
    /// The test passed.
    Pass,

    /// The test failed.
    Fail(FailureDetail),

    /// The test was not run.
    Skip {
        /// Why the test was skipped.
        reason: String,
    },
}

impl TestOutcome {
    /// Returns the value of the `result` attribute for this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestOutcome::Pass => "Pass",
            TestOutcome::Fail(_) => "Fail",
            TestOutcome::Skip { .. } => "Skip",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Details about a failure: the outermost exception type, plus the combined message and stack
/// trace across the exception chain.
///
/// Serialized as `<failure>`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FailureDetail {
    /// The type of the outermost exception.
    pub exception_type: Option<String>,

    /// The message text.
    pub message: String,

    /// The stack trace, if any.
    pub stack_trace: Option<String>,
}

impl FailureDetail {
    /// Creates a new `FailureDetail` with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Sets the exception type.
    pub fn set_exception_type(&mut self, exception_type: impl Into<String>) -> &mut Self {
        self.exception_type = Some(exception_type.into());
        self
    }

    /// Sets the stack trace.
    pub fn set_stack_trace(&mut self, stack_trace: impl Into<String>) -> &mut Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }
}

/// A failure that isn't associated with a single test.
///
/// Serialized as `<error>` within the `<errors>` element.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorEntry {
    /// The kind of failure.
    pub category: ErrorCategory,

    /// The name of the entity that failed, if any.
    pub name: Option<String>,

    /// Details about the failure.
    pub failure: FailureDetail,
}

impl ErrorEntry {
    /// Creates a new error entry.
    pub fn new(category: ErrorCategory, name: Option<String>, failure: FailureDetail) -> Self {
        Self {
            category,
            name,
            failure,
        }
    }
}

/// The kind of failure recorded in an [`ErrorEntry`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorCategory {
    /// A fatal error reported by the test framework.
    Fatal,

    /// Cleanup of the assembly failed.
    AssemblyCleanup,

    /// Cleanup of a test collection failed.
    CollectionCleanup,

    /// Cleanup of a test class failed.
    ClassCleanup,

    /// Cleanup of a test method failed.
    MethodCleanup,

    /// Cleanup of a test case failed.
    CaseCleanup,

    /// Cleanup of a test failed.
    TestCleanup,
}

impl ErrorCategory {
    /// Returns the value of the `type` attribute for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Fatal => "fatal",
            ErrorCategory::AssemblyCleanup => "assembly-cleanup",
            ErrorCategory::CollectionCleanup => "test-collection-cleanup",
            ErrorCategory::ClassCleanup => "test-class-cleanup",
            ErrorCategory::MethodCleanup => "test-method-cleanup",
            ErrorCategory::CaseCleanup => "test-case-cleanup",
            ErrorCategory::TestCleanup => "test-cleanup",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The location of a test in source code.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SourceLocation {
    /// The source file.
    pub file: Option<String>,

    /// The line within the source file.
    pub line: Option<u32>,
}

impl SourceLocation {
    /// Creates a new source location.
    pub fn new(file: Option<String>, line: Option<u32>) -> Self {
        Self { file, line }
    }
}

/// A name/value pair attached to a test.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trait {
    /// The name of the trait.
    pub name: String,

    /// The value of the trait.
    pub value: String,
}

impl Trait {
    /// Creates a new `Trait` instance.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<T> From<(T, T)> for Trait
where
    T: Into<String>,
{
    fn from((k, v): (T, T)) -> Self {
        Trait::new(k, v)
    }
}

/// Text captured from a test while it ran.
///
/// XML 1.0 can't represent most control characters, so they are removed. Tabs, carriage returns
/// and newlines are kept, so multi-line output stays readable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    output: Box<str>,
}

impl Output {
    /// Creates a new output, removing any non-printable characters from it.
    pub fn new(output: impl AsRef<str>) -> Self {
        let output = output
            .as_ref()
            .replace(
                |c| {
                    matches!(
                        c,
                        '\x00'..='\x08'
                            | '\x0b'
                            | '\x0c'
                            | '\x0e'..='\x1f'
                            | '\u{fffe}'
                            | '\u{ffff}'
                    )
                },
                "",
            )
            .into_boxed_str();
        Self { output }
    }

    /// Returns the output.
    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Converts the output into a string.
    pub fn into_string(self) -> String {
        self.output.into_string()
    }
}

impl AsRef<str> for Output {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<Output> for String {
    fn from(output: Output) -> Self {
        output.into_string()
    }
}
