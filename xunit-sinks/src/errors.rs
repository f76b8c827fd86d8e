// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by sinks.

use thiserror::Error;

/// A sink was disposed more than once.
#[derive(Clone, Debug, Error)]
#[error("{sink} was already disposed")]
pub struct SinkDisposedError {
    sink: &'static str,
}

impl SinkDisposedError {
    pub(crate) fn new(sink: &'static str) -> Self {
        Self { sink }
    }

    /// Returns the name of the sink that was disposed.
    pub fn sink(&self) -> &'static str {
        self.sink
    }
}

/// An error that occurred while parsing report configuration.
#[derive(Debug, Error)]
#[error("failed to parse report configuration")]
pub struct ReportConfigParseError {
    #[source]
    err: toml::de::Error,
}

impl ReportConfigParseError {
    pub(crate) fn new(err: toml::de::Error) -> Self {
        Self { err }
    }
}
