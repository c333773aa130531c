//! Exact match on the categorical attribute.

use crate::traits::Clause;
use records::Record;

/// Keeps records whose category equals the selected value exactly.
/// Records without a category fail.
#[derive(Debug, Clone)]
pub struct CategoryClause {
    value: String,
}

impl CategoryClause {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

impl Clause for CategoryClause {
    fn name(&self) -> &str {
        "CategoryClause"
    }

    fn matches(&self, record: &Record) -> bool {
        record.category.as_deref() == Some(self.value.as_str())
    }
}
