// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feeding results to an external test runner UI as they arrive.
//!
//! [`ListenerSink`] turns every test result, fatal error and cleanup failure into a single
//! [`TestRecord`] passed to a [`TestListener`]. It also tracks a [`RunState`] that only ever moves
//! to a more severe state, and a [`FinishedSignal`] that is set when the assembly finishes.

mod imp;
mod run_state;

pub use imp::*;
pub use run_state::{FinishedSignal, RunState};
