// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::string::FromUtf8Error;
use thiserror::Error;

/// An error that occurs while serializing an [`AssemblyReport`](crate::AssemblyReport) or an
/// [`AssembliesReport`](crate::AssembliesReport).
///
/// Returned by the `serialize` and `to_string` methods on those types.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// An error occurred while writing XML events.
    #[error("error serializing xUnit report")]
    Xml(#[from] quick_xml::Error),

    /// The serialized report was not valid UTF-8.
    #[error("serialized xUnit report is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
}
