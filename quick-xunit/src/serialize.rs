// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize an `AssemblyReport`.

use crate::{
    AssembliesReport, AssemblyReport, CollectionReport, ErrorEntry, FailureDetail,
    SerializeError, TestEntry, TestOutcome, Trait,
};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::{io, time::Duration};

static ASSEMBLIES_TAG: &str = "assemblies";
static ASSEMBLY_TAG: &str = "assembly";
static ERRORS_TAG: &str = "errors";
static ERROR_TAG: &str = "error";
static COLLECTION_TAG: &str = "collection";
static TEST_TAG: &str = "test";
static OUTPUT_TAG: &str = "output";
static TRAITS_TAG: &str = "traits";
static TRAIT_TAG: &str = "trait";
static FAILURE_TAG: &str = "failure";
static MESSAGE_TAG: &str = "message";
static STACK_TRACE_TAG: &str = "stack-trace";
static REASON_TAG: &str = "reason";

pub(crate) fn serialize_assemblies(
    report: &AssembliesReport,
    writer: impl io::Write,
) -> Result<(), SerializeError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);
    serialize_decl(&mut writer)?;

    let AssembliesReport {
        timestamp,
        assemblies,
    } = report;

    let mut assemblies_tag = BytesStart::new(ASSEMBLIES_TAG);
    if let Some(timestamp) = timestamp {
        assemblies_tag.push_attribute((
            "timestamp",
            timestamp.format("%m/%d/%Y %H:%M:%S").to_string().as_str(),
        ));
    }
    writer.write_event(Event::Start(assemblies_tag))?;
    for assembly in assemblies {
        serialize_assembly_impl(assembly, &mut writer)?;
    }
    serialize_end_tag(ASSEMBLIES_TAG, &mut writer)?;

    // Add a trailing newline.
    writer.write_indent()?;
    Ok(())
}

pub(crate) fn serialize_assembly(
    report: &AssemblyReport,
    writer: impl io::Write,
) -> Result<(), SerializeError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);
    serialize_decl(&mut writer)?;
    serialize_assembly_impl(report, &mut writer)?;

    // Add a trailing newline.
    writer.write_indent()?;
    Ok(())
}

fn serialize_decl(writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))
}

fn serialize_assembly_impl(
    report: &AssemblyReport,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    // Use the destructuring syntax to ensure that all fields are handled.
    let AssemblyReport {
        name,
        environment,
        test_framework,
        start_time,
        config_file,
        target_framework,
        summary,
        errors,
        collections,
    } = report;

    let mut assembly_tag = BytesStart::new(ASSEMBLY_TAG);
    assembly_tag.extend_attributes([
        ("name", name.as_str()),
        ("environment", environment.as_str()),
        ("test-framework", test_framework.as_str()),
    ]);
    if let Some(start_time) = start_time {
        assembly_tag.push_attribute((
            "run-date",
            start_time.format("%Y-%m-%d").to_string().as_str(),
        ));
        assembly_tag.push_attribute((
            "run-time",
            start_time.format("%H:%M:%S").to_string().as_str(),
        ));
    }
    if let Some(config_file) = config_file {
        assembly_tag.push_attribute(("config-file", config_file.as_str()));
    }
    if let Some(target_framework) = target_framework {
        assembly_tag.push_attribute(("target-framework", target_framework.as_str()));
    }
    if let Some(summary) = summary {
        assembly_tag.extend_attributes([
            ("total", summary.total.to_string().as_str()),
            ("passed", summary.passed().to_string().as_str()),
            ("failed", summary.failed.to_string().as_str()),
            ("skipped", summary.skipped.to_string().as_str()),
            ("time", serialize_time(&summary.time).as_str()),
            ("errors", summary.errors.to_string().as_str()),
        ]);
    }
    writer.write_event(Event::Start(assembly_tag))?;

    if errors.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(ERRORS_TAG)))?;
    } else {
        serialize_empty_start_tag(ERRORS_TAG, writer)?;
        for error in errors {
            serialize_error(error, writer)?;
        }
        serialize_end_tag(ERRORS_TAG, writer)?;
    }

    for collection in collections {
        serialize_collection(collection, writer)?;
    }

    serialize_end_tag(ASSEMBLY_TAG, writer)
}

fn serialize_error(
    error: &ErrorEntry,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let ErrorEntry {
        category,
        name,
        failure,
    } = error;

    let mut error_tag = BytesStart::new(ERROR_TAG);
    error_tag.push_attribute(("type", category.as_str()));
    if let Some(name) = name {
        error_tag.push_attribute(("name", name.as_str()));
    }
    writer.write_event(Event::Start(error_tag))?;
    serialize_failure(failure, writer)?;
    serialize_end_tag(ERROR_TAG, writer)
}

fn serialize_collection(
    collection: &CollectionReport,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let CollectionReport {
        name,
        summary,
        tests,
    } = collection;

    let mut collection_tag = BytesStart::new(COLLECTION_TAG);
    if let Some(summary) = summary {
        collection_tag.extend_attributes([
            ("total", summary.total.to_string().as_str()),
            ("passed", summary.passed().to_string().as_str()),
            ("failed", summary.failed.to_string().as_str()),
            ("skipped", summary.skipped.to_string().as_str()),
        ]);
    }
    if let Some(name) = name {
        collection_tag.push_attribute(("name", name.as_str()));
    }
    if let Some(summary) = summary {
        collection_tag.push_attribute(("time", serialize_time(&summary.time).as_str()));
    }

    if tests.is_empty() {
        return writer.write_event(Event::Empty(collection_tag));
    }

    writer.write_event(Event::Start(collection_tag))?;
    for test in tests {
        serialize_test(test, writer)?;
    }
    serialize_end_tag(COLLECTION_TAG, writer)
}

fn serialize_test(
    test: &TestEntry,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let TestEntry {
        name,
        type_name,
        method,
        time,
        outcome,
        output,
        source,
        traits,
    } = test;

    let mut test_tag = BytesStart::new(TEST_TAG);
    test_tag.extend_attributes([
        ("name", name.as_str()),
        ("type", type_name.as_str()),
        ("method", method.as_str()),
        ("time", serialize_time(time).as_str()),
        ("result", outcome.as_str()),
    ]);
    if let Some(source) = source {
        if let Some(file) = &source.file {
            test_tag.push_attribute(("source-file", file.as_str()));
        }
        if let Some(line) = source.line {
            test_tag.push_attribute(("source-line", line.to_string().as_str()));
        }
    }

    let has_children = output.is_some() || !traits.is_empty() || *outcome != TestOutcome::Pass;
    if !has_children {
        return writer.write_event(Event::Empty(test_tag));
    }

    writer.write_event(Event::Start(test_tag))?;

    if let Some(output) = output {
        serialize_text_element(OUTPUT_TAG, output.as_str(), writer)?;
    }
    if !traits.is_empty() {
        serialize_empty_start_tag(TRAITS_TAG, writer)?;
        for test_trait in traits {
            serialize_trait(test_trait, writer)?;
        }
        serialize_end_tag(TRAITS_TAG, writer)?;
    }

    match outcome {
        TestOutcome::Pass => {}
        TestOutcome::Fail(failure) => serialize_failure(failure, writer)?,
        TestOutcome::Skip { reason } => serialize_text_element(REASON_TAG, reason, writer)?,
    }

    serialize_end_tag(TEST_TAG, writer)
}

fn serialize_trait(
    test_trait: &Trait,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut trait_tag = BytesStart::new(TRAIT_TAG);
    trait_tag.extend_attributes([
        ("name", test_trait.name.as_str()),
        ("value", test_trait.value.as_str()),
    ]);
    writer.write_event(Event::Empty(trait_tag))
}

fn serialize_failure(
    failure: &FailureDetail,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let FailureDetail {
        exception_type,
        message,
        stack_trace,
    } = failure;

    let mut failure_tag = BytesStart::new(FAILURE_TAG);
    if let Some(exception_type) = exception_type {
        failure_tag.push_attribute(("exception-type", exception_type.as_str()));
    }
    writer.write_event(Event::Start(failure_tag))?;

    serialize_text_element(MESSAGE_TAG, message, writer)?;
    if let Some(stack_trace) = stack_trace {
        serialize_text_element(STACK_TRACE_TAG, stack_trace, writer)?;
    }

    serialize_end_tag(FAILURE_TAG, writer)
}

fn serialize_text_element(
    tag_name: &'static str,
    text: &str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    serialize_empty_start_tag(tag_name, writer)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    serialize_end_tag(tag_name, writer)
}

fn serialize_empty_start_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag_name)))
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))
}

// Serialize time as seconds with 3 decimal points.
fn serialize_time(time: &Duration) -> String {
    format!("{:.3}", time.as_secs_f64())
}
