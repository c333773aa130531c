//! The Record Store: the last-fetched snapshot backing one browse view.
//!
//! The store is replaced wholesale on every load. Records are kept behind
//! `Arc` so derived views can share them without copying.

use crate::error::{LoadError, Result};
use crate::facets::Facets;
use crate::types::{Record, RecordKey};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Holds the current snapshot of records in fetch order.
///
/// ## Invariants
/// - every key is non-empty and unique within the snapshot
/// - a failed [`RecordStore::load`] leaves the previous snapshot untouched
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<Arc<Record>>,
    /// key -> position in `records`
    index: HashMap<RecordKey, usize>,
    /// Bumped on every successful load
    generation: u64,
}

impl RecordStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire snapshot.
    ///
    /// The input is checked before anything is swapped in: a blank key or a
    /// key seen twice rejects the whole batch instead of deduplicating it.
    pub fn load(&mut self, records: Vec<Record>) -> Result<()> {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if record.key.trim().is_empty() {
                return Err(LoadError::EmptyKey { index: position });
            }
            if index.insert(record.key.clone(), position).is_some() {
                return Err(LoadError::DuplicateKey {
                    key: record.key.clone(),
                });
            }
        }

        self.records = records.into_iter().map(Arc::new).collect();
        self.index = index;
        self.generation += 1;

        debug!(
            "Record store loaded generation {} ({} records)",
            self.generation,
            self.records.len()
        );
        Ok(())
    }

    /// Current snapshot in fetch order
    pub fn all(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Look up a record by key
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.index
            .get(key)
            .and_then(|&position| self.records.get(position))
            .map(|record| record.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of successful loads so far (0 for a fresh store)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Aggregate tag/category/amount facets over the current snapshot
    pub fn facets(&self) -> Facets {
        Facets::collect(&self.records)
    }
}
