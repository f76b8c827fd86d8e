// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Build and serialize xUnit v2 style XML result reports.
//!
//! The main type is [`AssemblyReport`], which holds a tree of
//! [`CollectionReport`]s, each containing [`TestEntry`] instances, plus a flat
//! list of [`ErrorEntry`] values for failures that aren't scoped to a single
//! test. Free-form text that ends up in a report should go through [`escape`]
//! first.

mod errors;
mod escape;
mod report;
mod serialize;

pub use errors::*;
pub use escape::*;
pub use report::*;
