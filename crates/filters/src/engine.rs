//! The Filter Engine: derives the visible list from a store and a predicate.
//!
//! [`apply`] is the pure core; [`FilterEngine`] wraps it with the state a
//! browse view keeps between recomputations (current filter, sort order and
//! the last derived view).

use crate::predicate::{Predicate, compile};
use crate::state::{FilterState, ValidationError};
use records::{Record, RecordStore};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// Sorting
// =============================================================================

/// One ordering criterion applied after filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Featured records first
    Featured,
    /// Ascending display order, records without one last
    DisplayOrder,
    /// Newest first, records without a timestamp last
    Recency,
}

impl SortKey {
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortKey::Featured => b.featured.cmp(&a.featured),
            SortKey::DisplayOrder => present_first(a.display_order, b.display_order, |x, y| x.cmp(&y)),
            // RFC 3339 in a single zone orders lexicographically
            SortKey::Recency => present_first(a.created_at.as_deref(), b.created_at.as_deref(), |x, y| {
                y.cmp(x)
            }),
        }
    }
}

fn present_first<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "featured" => Ok(SortKey::Featured),
            "display_order" => Ok(SortKey::DisplayOrder),
            "recency" | "recent" => Ok(SortKey::Recency),
            _ => Err(ValidationError::UnknownSortKey(s.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Featured => "featured",
            SortKey::DisplayOrder => "display_order",
            SortKey::Recency => "recency",
        };
        f.write_str(name)
    }
}

/// Ordered list of sort keys. Empty means fetch order.
///
/// Keys are compared in turn; records equal on every key keep their fetch
/// order because the sort is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrder {
    keys: Vec<SortKey>,
}

impl SortOrder {
    /// Keep records in the order they were fetched
    pub fn fetch_order() -> Self {
        Self::default()
    }

    /// Featured first, then display order, then newest
    pub fn showcase() -> Self {
        Self::by([SortKey::Featured, SortKey::DisplayOrder, SortKey::Recency])
    }

    pub fn by(keys: impl IntoIterator<Item = SortKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn then(mut self, key: SortKey) -> Self {
        self.keys.push(key);
        self
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_fetch_order(&self) -> bool {
        self.keys.is_empty()
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

// =============================================================================
// Derived view
// =============================================================================

/// The records currently satisfying the filter, in display order.
///
/// A view is never edited; every change produces a new one. Records are
/// shared with the store that produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedView {
    records: Vec<Arc<Record>>,
    /// Store generation this view was derived from
    generation: u64,
}

impl DerivedView {
    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().map(|record| record.as_ref())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.records.iter().map(|record| record.key.as_str()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.iter().any(|record| record.key == key)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Derive a view from the store's current snapshot.
///
/// ## Algorithm
/// 1. Walk the snapshot once, keeping records the predicate accepts
/// 2. If a sort order is given, stable-sort by it (ties keep fetch order)
///
/// Neither the store nor the predicate is modified.
pub fn apply(store: &RecordStore, predicate: &Predicate, order: &SortOrder) -> DerivedView {
    let mut records: Vec<Arc<Record>> = store
        .all()
        .iter()
        .filter(|record| predicate.matches(record))
        .cloned()
        .collect();

    if !order.is_fetch_order() {
        records.sort_by(|a, b| order.compare(a, b));
    }

    DerivedView {
        records,
        generation: store.generation(),
    }
}

// =============================================================================
// Stateful engine
// =============================================================================

/// Owns the filter state, sort order and derived view of one browse view.
///
/// Every setter recompiles (if needed) and recomputes the full view; there is
/// no incremental update.
#[derive(Debug, Default)]
pub struct FilterEngine {
    state: FilterState,
    order: SortOrder,
    predicate: Predicate,
    view: DerivedView,
}

impl FilterEngine {
    /// Engine with the default (match-everything) filter in fetch order
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Replace the filter state and recompute against `store`
    pub fn set_filter(&mut self, state: FilterState, store: &RecordStore) -> &DerivedView {
        self.predicate = compile(&state);
        self.state = state;
        self.refresh(store)
    }

    /// Replace the sort order and recompute against `store`
    pub fn set_sort(&mut self, order: SortOrder, store: &RecordStore) -> &DerivedView {
        self.order = order;
        self.refresh(store)
    }

    /// Recompute the view, typically after the store was reloaded
    pub fn refresh(&mut self, store: &RecordStore) -> &DerivedView {
        self.view = apply(store, &self.predicate, &self.order);
        debug!(
            "Derived view: {} of {} records (generation {})",
            self.view.len(),
            store.len(),
            self.view.generation()
        );
        &self.view
    }

    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.state
    }

    pub fn sort_order(&self) -> &SortOrder {
        &self.order
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}
