//! Free-text search across a record's descriptive fields.

use crate::traits::Clause;
use records::Record;

/// Keeps records whose name, title, description or any tag contains the
/// search term, ignoring case.
#[derive(Debug, Clone)]
pub struct SearchClause {
    /// Stored lowercased
    term: String,
}

impl SearchClause {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_lowercase(),
        }
    }
}

impl Clause for SearchClause {
    fn name(&self) -> &str {
        "SearchClause"
    }

    fn matches(&self, record: &Record) -> bool {
        let contains = |text: &str| text.to_lowercase().contains(&self.term);

        [&record.name, &record.title, &record.description]
            .into_iter()
            .flatten()
            .any(|text| contains(text.as_str()))
            || record.tags.iter().any(|tag| contains(tag.as_str()))
    }
}
