//! Facet aggregation over a snapshot.
//!
//! Facets feed the browse page side panel: which skills/tags exist and how
//! many records carry each, how records split across categories, and the
//! span of the numeric attribute.
//!
//! Aggregation runs as a rayon fold/reduce. Each worker folds its share of
//! records into a partial [`Facets`], and partials are merged pairwise.

use crate::types::Record;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Aggregated counts over a set of records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facets {
    /// Number of records observed
    pub total: usize,
    /// tag -> number of records carrying it (counted once per record)
    pub tags: BTreeMap<String, usize>,
    /// category -> number of records
    pub categories: BTreeMap<String, usize>,
    /// (min, max) over records with a known amount
    pub amount_range: Option<(f64, f64)>,
    /// Records whose amount is unknown
    pub missing_amount: usize,
}

impl Facets {
    /// Compute facets over a slice of records in parallel
    pub fn collect(records: &[Arc<Record>]) -> Self {
        records
            .par_iter()
            .fold(Facets::default, |mut acc, record| {
                acc.observe(record);
                acc
            })
            .reduce(Facets::default, Facets::merge)
    }

    fn observe(&mut self, record: &Record) {
        self.total += 1;

        let mut seen = HashSet::with_capacity(record.tags.len());
        for tag in &record.tags {
            if seen.insert(tag.as_str()) {
                *self.tags.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        if let Some(category) = &record.category {
            *self.categories.entry(category.clone()).or_insert(0) += 1;
        }

        match record.amount {
            Some(amount) => {
                self.amount_range = Some(match self.amount_range {
                    Some((lo, hi)) => (lo.min(amount), hi.max(amount)),
                    None => (amount, amount),
                });
            }
            None => self.missing_amount += 1,
        }
    }

    fn merge(mut self, other: Facets) -> Facets {
        self.total += other.total;
        self.missing_amount += other.missing_amount;
        for (tag, count) in other.tags {
            *self.tags.entry(tag).or_insert(0) += count;
        }
        for (category, count) in other.categories {
            *self.categories.entry(category).or_insert(0) += count;
        }
        self.amount_range = match (self.amount_range, other.amount_range) {
            (Some((a_lo, a_hi)), Some((b_lo, b_hi))) => Some((a_lo.min(b_lo), a_hi.max(b_hi))),
            (range, None) | (None, range) => range,
        };
        self
    }

    /// The `n` most common tags, most frequent first, ties by name
    pub fn top_tags(&self, n: usize) -> Vec<(&str, usize)> {
        let mut tags: Vec<(&str, usize)> = self
            .tags
            .iter()
            .map(|(tag, &count)| (tag.as_str(), count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tags.truncate(n);
        tags
    }
}
