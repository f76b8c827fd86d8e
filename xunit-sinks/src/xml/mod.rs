// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregating events into an xUnit-style XML report.
//!
//! The main type here is [`XmlAggregator`], an event sink that builds a
//! [`quick_xunit::AssemblyReport`] as results arrive. Events may be delivered concurrently from
//! several threads; results for the same collection may arrive in any order.

mod collections;
mod imp;

pub use imp::*;
