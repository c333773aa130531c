//! Inclusive range over the record's numeric attribute.

use crate::traits::Clause;
use records::Record;

/// Keeps records whose amount lies within `[min, max]`.
///
/// ## Algorithm
/// 1. A record without an amount fails: once the user filters on rate or
///    pay, unknown values are excluded
/// 2. An unset bound is unbounded on that side
#[derive(Debug, Clone)]
pub struct AmountRangeClause {
    min: Option<f64>,
    max: Option<f64>,
}

impl AmountRangeClause {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl Clause for AmountRangeClause {
    fn name(&self) -> &str {
        "AmountRangeClause"
    }

    fn matches(&self, record: &Record) -> bool {
        let Some(amount) = record.amount else {
            return false;
        };
        self.min.is_none_or(|min| amount >= min) && self.max.is_none_or(|max| amount <= max)
    }
}
