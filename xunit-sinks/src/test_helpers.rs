// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event constructors shared by unit tests.

use crate::events::{
    AssemblyCleanupFailed, AssemblyFinished, AssemblyStarting, CaseCleanupFailed,
    ClassCleanupFailed, CollectionCleanupFailed, CollectionFinished, CollectionInfo,
    CollectionStarting, ErrorOccurred, ExecutionCounts, FailureInfo, MethodCleanupFailed,
    RunnerEvent, TestCaseInfo, TestClassInfo, TestCleanupFailed, TestFailed, TestInfo,
    TestPassed, TestResultInfo, TestSkipped,
};
use chrono::DateTime;
use std::time::Duration;

pub(crate) fn collection(class: &str) -> CollectionInfo {
    CollectionInfo::new(
        format!("collection-{class}"),
        format!("Test collection for {class}"),
    )
}

pub(crate) fn class(class: &str) -> TestClassInfo {
    TestClassInfo::new(class, collection(class))
}

pub(crate) fn test_info(class_name: &str, method: &str) -> TestInfo {
    TestInfo::new(format!("{class_name}.{method}"), class(class_name), method)
}

pub(crate) fn result(class_name: &str, method: &str, millis: u64) -> TestResultInfo {
    TestResultInfo::new(
        test_info(class_name, method),
        Duration::from_millis(millis),
    )
}

pub(crate) fn starting() -> RunnerEvent {
    RunnerEvent::AssemblyStarting(AssemblyStarting {
        assembly_path: "/tmp/tests.dll".to_owned(),
        config_file_path: None,
        target_framework: Some(".NETCoreApp,Version=v8.0".to_owned()),
        test_environment: "64-bit .NET 8.0".to_owned(),
        test_framework_display_name: "xUnit.net 2.9.0".to_owned(),
        start_time: DateTime::parse_from_rfc3339("2024-05-06T07:08:09+00:00")
            .expect("valid timestamp"),
    })
}

pub(crate) fn finished(total: usize, failed: usize, skipped: usize, millis: u64) -> RunnerEvent {
    RunnerEvent::AssemblyFinished(AssemblyFinished {
        counts: counts(total, failed, skipped, millis),
    })
}

pub(crate) fn counts(total: usize, failed: usize, skipped: usize, millis: u64) -> ExecutionCounts {
    ExecutionCounts {
        tests_run: total,
        tests_failed: failed,
        tests_skipped: skipped,
        execution_time: Duration::from_millis(millis),
    }
}

pub(crate) fn collection_starting(class: &str) -> RunnerEvent {
    RunnerEvent::CollectionStarting(CollectionStarting {
        collection: collection(class),
    })
}

pub(crate) fn collection_finished(class: &str, counts: ExecutionCounts) -> RunnerEvent {
    RunnerEvent::CollectionFinished(CollectionFinished {
        collection: collection(class),
        counts,
    })
}

pub(crate) fn passed(class: &str, method: &str) -> RunnerEvent {
    RunnerEvent::TestPassed(TestPassed {
        result: result(class, method, 100),
    })
}

pub(crate) fn failed(class: &str, method: &str, message: &str) -> RunnerEvent {
    RunnerEvent::TestFailed(TestFailed {
        result: result(class, method, 50),
        failure: FailureInfo::new(
            "Xunit.Sdk.TrueException",
            message,
            Some(format!("at {class}.{method}()")),
        ),
    })
}

pub(crate) fn skipped(class: &str, method: &str, reason: &str) -> RunnerEvent {
    RunnerEvent::TestSkipped(TestSkipped {
        result: result(class, method, 0),
        reason: reason.to_owned(),
    })
}

pub(crate) fn fatal_error(message: &str) -> RunnerEvent {
    RunnerEvent::ErrorOccurred(ErrorOccurred {
        failure: FailureInfo::new("System.Exception", message, None),
    })
}

fn cleanup_failure(message: &str) -> FailureInfo {
    FailureInfo::new("System.InvalidOperationException", message, None)
}

pub(crate) fn assembly_cleanup_failed(assembly_path: &str, message: &str) -> RunnerEvent {
    RunnerEvent::AssemblyCleanupFailed(AssemblyCleanupFailed {
        assembly_path: assembly_path.to_owned(),
        failure: cleanup_failure(message),
    })
}

pub(crate) fn collection_cleanup_failed(class: &str, message: &str) -> RunnerEvent {
    RunnerEvent::CollectionCleanupFailed(CollectionCleanupFailed {
        collection: collection(class),
        failure: cleanup_failure(message),
    })
}

pub(crate) fn case_cleanup_failed(display_name: &str, message: &str) -> RunnerEvent {
    RunnerEvent::CaseCleanupFailed(CaseCleanupFailed {
        test_case: TestCaseInfo::new(display_name),
        failure: cleanup_failure(message),
    })
}

pub(crate) fn class_cleanup_failed(class_name: &str, message: &str) -> RunnerEvent {
    RunnerEvent::ClassCleanupFailed(ClassCleanupFailed {
        class: class(class_name),
        failure: cleanup_failure(message),
    })
}

pub(crate) fn method_cleanup_failed(class_name: &str, method: &str, message: &str) -> RunnerEvent {
    RunnerEvent::MethodCleanupFailed(MethodCleanupFailed {
        class: class(class_name),
        method_name: method.to_owned(),
        failure: cleanup_failure(message),
    })
}

pub(crate) fn test_cleanup_failed(class_name: &str, method: &str, message: &str) -> RunnerEvent {
    RunnerEvent::TestCleanupFailed(TestCleanupFailed {
        test: test_info(class_name, method),
        failure: cleanup_failure(message),
    })
}
