// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering a chain of nested exceptions as a single message and stack trace.

use crate::events::FailureInfo;

/// Separates the message of an exception from the message of its inner exception.
pub const INNER_EXCEPTION_MARKER: &str = "----- Inner Exception -----";

/// Separates the stack trace of an exception from the stack trace of its inner exception.
pub const INNER_STACK_TRACE_MARKER: &str = "----- Inner Stack Trace -----";

impl FailureInfo {
    /// Returns the number of exceptions in the chain.
    pub fn depth(&self) -> usize {
        self.exception_types.len().max(self.messages.len())
    }

    /// Combines the messages of every exception in the chain into one string.
    ///
    /// The outermost exception is rendered as `<type> : <message>`. Each inner exception follows
    /// on its own lines, introduced by [`INNER_EXCEPTION_MARKER`] and prefixed with one `----`
    /// per level of nesting. A level with an empty exception type is rendered as its message
    /// alone.
    pub fn combined_message(&self) -> String {
        let mut out = String::new();
        for level in 0..self.depth() {
            let exception_type = self.exception_types.get(level).map_or("", String::as_str);
            let message = self.messages.get(level).map_or("", String::as_str);

            if level > 0 {
                out.push('\n');
                out.push_str(INNER_EXCEPTION_MARKER);
                out.push('\n');
                out.push_str(&"----".repeat(level));
                out.push(' ');
            }
            if !exception_type.is_empty() {
                out.push_str(exception_type);
                out.push_str(" : ");
            }
            out.push_str(message);
        }
        out
    }

    /// Combines the stack traces of every exception in the chain, separated by
    /// [`INNER_STACK_TRACE_MARKER`].
    ///
    /// Levels without a stack trace are skipped. Returns `None` if no level has one.
    pub fn combined_stack_trace(&self) -> Option<String> {
        let mut traces = self
            .stack_traces
            .iter()
            .filter_map(|trace| trace.as_deref())
            .filter(|trace| !trace.is_empty());

        let first = traces.next()?;
        let mut out = first.to_owned();
        for trace in traces {
            out.push('\n');
            out.push_str(INNER_STACK_TRACE_MARKER);
            out.push('\n');
            out.push_str(trace);
        }
        Some(out)
    }
}
