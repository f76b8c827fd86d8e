// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::events::CollectionId;
use indexmap::{IndexMap, map::Entry};
use quick_xunit::CollectionReport;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

pub(crate) type SharedCollection = Arc<Mutex<CollectionReport>>;

/// Collection reports keyed by collection ID, in the order they were first seen.
///
/// The map lock is only held while looking up or inserting an entry. Each report has its own
/// lock, so updates to different collections don't contend with each other.
#[derive(Debug, Default)]
pub(crate) struct CollectionStore {
    collections: Mutex<IndexMap<CollectionId, SharedCollection>>,
}

impl CollectionStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the report for `id`, creating it if this is the first time `id` has been seen.
    ///
    /// Concurrent callers with the same ID always observe the same report.
    pub(crate) fn get_or_create(&self, id: &CollectionId) -> SharedCollection {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match collections.entry(id.clone()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                debug!(collection_id = %id, "creating collection report");
                Arc::clone(entry.insert(Arc::new(Mutex::new(CollectionReport::new()))))
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns a copy of every report, in creation order.
    pub(crate) fn snapshot(&self) -> Vec<CollectionReport> {
        let collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        collections
            .values()
            .map(|collection| {
                collection
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
            .collect()
    }
}
