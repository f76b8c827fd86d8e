// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing events to per-kind handlers.
//!
//! An [`EventSink`] accepts every [`RunnerEvent`] and returns whether the run should continue. An
//! [`EventHandler`] has one method per kind of event, each of which does nothing by default;
//! [`dispatch`] routes an event to the matching method.

use crate::events::{
    AssemblyCleanupFailed, AssemblyFinished, AssemblyStarting, CaseCleanupFailed,
    ClassCleanupFailed, CollectionCleanupFailed, CollectionFinished, CollectionStarting,
    ErrorOccurred, MethodCleanupFailed, RunnerEvent, TestCleanupFailed, TestFailed, TestPassed,
    TestSkipped,
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A consumer of runner events.
///
/// Sinks may be called concurrently from several threads.
pub trait EventSink: Send + Sync {
    /// Handles an event. Returns `false` if the run should stop.
    fn on_event(&self, event: &RunnerEvent) -> bool;
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn on_event(&self, event: &RunnerEvent) -> bool {
        (**self).on_event(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn on_event(&self, event: &RunnerEvent) -> bool {
        (**self).on_event(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn on_event(&self, event: &RunnerEvent) -> bool {
        (**self).on_event(event)
    }
}

/// Per-kind event handlers. Every method does nothing unless overridden.
#[allow(unused_variables)]
pub trait EventHandler {
    /// Called for [`RunnerEvent::ErrorOccurred`].
    fn error_occurred(&self, event: &ErrorOccurred) {}

    /// Called for [`RunnerEvent::AssemblyCleanupFailed`].
    fn assembly_cleanup_failed(&self, event: &AssemblyCleanupFailed) {}

    /// Called for [`RunnerEvent::AssemblyStarting`].
    fn assembly_starting(&self, event: &AssemblyStarting) {}

    /// Called for [`RunnerEvent::AssemblyFinished`].
    fn assembly_finished(&self, event: &AssemblyFinished) {}

    /// Called for [`RunnerEvent::CollectionCleanupFailed`].
    fn collection_cleanup_failed(&self, event: &CollectionCleanupFailed) {}

    /// Called for [`RunnerEvent::CollectionStarting`].
    fn collection_starting(&self, event: &CollectionStarting) {}

    /// Called for [`RunnerEvent::CollectionFinished`].
    fn collection_finished(&self, event: &CollectionFinished) {}

    /// Called for [`RunnerEvent::CaseCleanupFailed`].
    fn case_cleanup_failed(&self, event: &CaseCleanupFailed) {}

    /// Called for [`RunnerEvent::ClassCleanupFailed`].
    fn class_cleanup_failed(&self, event: &ClassCleanupFailed) {}

    /// Called for [`RunnerEvent::MethodCleanupFailed`].
    fn method_cleanup_failed(&self, event: &MethodCleanupFailed) {}

    /// Called for [`RunnerEvent::TestCleanupFailed`].
    fn test_cleanup_failed(&self, event: &TestCleanupFailed) {}

    /// Called for [`RunnerEvent::TestPassed`].
    fn test_passed(&self, event: &TestPassed) {}

    /// Called for [`RunnerEvent::TestFailed`].
    fn test_failed(&self, event: &TestFailed) {}

    /// Called for [`RunnerEvent::TestSkipped`].
    fn test_skipped(&self, event: &TestSkipped) {}
}

/// Routes an event to the handler method for its kind.
pub fn dispatch<H: EventHandler + ?Sized>(handler: &H, event: &RunnerEvent) {
    match event {
        RunnerEvent::ErrorOccurred(event) => handler.error_occurred(event),
        RunnerEvent::AssemblyCleanupFailed(event) => handler.assembly_cleanup_failed(event),
        RunnerEvent::AssemblyStarting(event) => handler.assembly_starting(event),
        RunnerEvent::AssemblyFinished(event) => handler.assembly_finished(event),
        RunnerEvent::CollectionCleanupFailed(event) => handler.collection_cleanup_failed(event),
        RunnerEvent::CollectionStarting(event) => handler.collection_starting(event),
        RunnerEvent::CollectionFinished(event) => handler.collection_finished(event),
        RunnerEvent::CaseCleanupFailed(event) => handler.case_cleanup_failed(event),
        RunnerEvent::ClassCleanupFailed(event) => handler.class_cleanup_failed(event),
        RunnerEvent::MethodCleanupFailed(event) => handler.method_cleanup_failed(event),
        RunnerEvent::TestCleanupFailed(event) => handler.test_cleanup_failed(event),
        RunnerEvent::TestPassed(event) => handler.test_passed(event),
        RunnerEvent::TestFailed(event) => handler.test_failed(event),
        RunnerEvent::TestSkipped(event) => handler.test_skipped(event),
    }
}

/// Signals a run to stop.
///
/// Clones share the same underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a new token that has not been canceled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the run stop.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }

    /// Returns true if [`Self::cancel`] has been called on this token or a clone of it.
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }
}

/// Returns whether a sink holding an optional cancel token should let the run continue.
pub(crate) fn should_continue(cancel: Option<&CancelToken>) -> bool {
    !cancel.is_some_and(CancelToken::is_canceled)
}

/// An [`EventSink`] that routes events to an [`EventHandler`].
#[derive(Debug)]
pub struct Dispatcher<H> {
    handler: H,
    cancel: Option<CancelToken>,
}

impl<H> Dispatcher<H> {
    /// Creates a new dispatcher.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            cancel: None,
        }
    }

    /// Stops the run once `cancel` is canceled.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Returns the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Consumes the dispatcher, returning the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }
}

impl<H: EventHandler + Send + Sync> EventSink for Dispatcher<H> {
    fn on_event(&self, event: &RunnerEvent) -> bool {
        dispatch(&self.handler, event);
        should_continue(self.cancel.as_ref())
    }
}

/// An [`EventSink`] that ignores every event.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&self, _event: &RunnerEvent) -> bool {
        true
    }
}

/// Sends every event to two sinks in order.
///
/// Both sinks always see the event. The run continues only if both of them say so.
#[derive(Clone, Debug, Default)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    /// Creates a new chain.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Returns the first sink.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Returns the second sink.
    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A: EventSink, B: EventSink> EventSink for Chain<A, B> {
    fn on_event(&self, event: &RunnerEvent) -> bool {
        let first = self.first.on_event(event);
        let second = self.second.on_event(event);
        first && second
    }
}
