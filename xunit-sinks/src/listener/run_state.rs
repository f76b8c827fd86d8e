// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    fmt,
    sync::{
        Condvar, Mutex, PoisonError,
        atomic::{AtomicU8, Ordering},
    },
    time::Duration,
};

/// The overall state of a run, as seen by a listener.
///
/// States are ordered by severity. A run only ever moves to a more severe state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u8)]
pub enum RunState {
    /// No test results have been seen.
    NoTests = 0,

    /// Every test seen so far passed or was skipped.
    Success = 1,

    /// At least one test failed.
    Failure = 2,

    /// The run could not complete.
    Error = 3,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RunState::NoTests,
            1 => RunState::Success,
            2 => RunState::Failure,
            _ => RunState::Error,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::NoTests => "no tests",
            RunState::Success => "success",
            RunState::Failure => "failure",
            RunState::Error => "error",
        };
        f.pad(s)
    }
}

/// A [`RunState`] that can be advanced from several threads at once.
#[derive(Debug)]
pub(crate) struct RunStateCell {
    state: AtomicU8,
}

impl RunStateCell {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(RunState::NoTests as u8),
        }
    }

    pub(crate) fn get(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Moves to `state` if it is more severe than the current state. Returns the previous state.
    pub(crate) fn advance(&self, state: RunState) -> RunState {
        RunState::from_u8(self.state.fetch_max(state as u8, Ordering::AcqRel))
    }
}

/// A one-shot signal that is set once a run finishes.
#[derive(Debug, Default)]
pub struct FinishedSignal {
    finished: Mutex<bool>,
    condvar: Condvar,
}

impl FinishedSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self) {
        let mut finished = self.finished.lock().unwrap_or_else(PoisonError::into_inner);
        *finished = true;
        self.condvar.notify_all();
    }

    /// Returns true if the run has finished.
    pub fn is_set(&self) -> bool {
        *self.finished.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks the current thread until the run finishes.
    pub fn wait(&self) {
        let finished = self.finished.lock().unwrap_or_else(PoisonError::into_inner);
        let _finished = self
            .condvar
            .wait_while(finished, |finished| !*finished)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Blocks the current thread until the run finishes or `timeout` elapses.
    ///
    /// Returns true if the run finished.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let finished = self.finished.lock().unwrap_or_else(PoisonError::into_inner);
        let (finished, _) = self
            .condvar
            .wait_timeout_while(finished, timeout, |finished| !*finished)
            .unwrap_or_else(PoisonError::into_inner);
        *finished
    }
}
