// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Sinks that consume the events produced while a test assembly runs.
//!
//! A test execution engine pushes [`RunnerEvent`](events::RunnerEvent)s into an
//! [`EventSink`](dispatch::EventSink), one at a time and possibly from several threads. This
//! crate provides two sinks:
//!
//! * [`XmlAggregator`](xml::XmlAggregator) builds an xUnit-style XML report, using the data model
//!   from [`quick_xunit`].
//! * [`ListenerSink`](listener::ListenerSink) feeds a flattened record for every result to an
//!   external listener, and tracks an overall verdict for the run.
//!
//! Sinks can be composed: the XML aggregator wraps an
//! [`ExecutionSummarySink`](summary::ExecutionSummarySink) and reads its totals when the assembly
//! finishes, and [`Chain`](dispatch::Chain) sends every event to two sinks.

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod events;
mod failure;
pub mod listener;
pub mod summary;
#[cfg(test)]
mod test_helpers;
pub mod xml;

pub use failure::{INNER_EXCEPTION_MARKER, INNER_STACK_TRACE_MARKER};
