//! Clause substituted for a rejected filter field.

use crate::traits::Clause;
use records::Record;

/// Matches nothing. The compiler puts this in place of a clause whose
/// input failed validation, so the view degrades to "no results".
#[derive(Debug, Clone)]
pub struct NeverMatchClause {
    reason: String,
}

impl NeverMatchClause {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Clause for NeverMatchClause {
    fn name(&self) -> &str {
        "NeverMatchClause"
    }

    fn matches(&self, _record: &Record) -> bool {
        false
    }
}
