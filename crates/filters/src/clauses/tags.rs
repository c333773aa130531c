//! Match-any tag filter.

use crate::traits::Clause;
use records::Record;

/// Keeps records carrying at least one of the requested tags.
///
/// ## Algorithm
/// 1. Lowercase the requested tags once, at construction
/// 2. A record tag satisfies a requested tag when it contains it, ignoring
///    case ("react" is satisfied by "React Native")
/// 3. Any single hit is enough (OR within the set)
#[derive(Debug, Clone)]
pub struct AnyTagClause {
    wanted: Vec<String>,
}

impl AnyTagClause {
    pub fn new<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            wanted: tags.into_iter().map(str::to_lowercase).collect(),
        }
    }
}

impl Clause for AnyTagClause {
    fn name(&self) -> &str {
        "AnyTagClause"
    }

    fn matches(&self, record: &Record) -> bool {
        record.tags.iter().any(|tag| {
            let tag = tag.to_lowercase();
            self.wanted.iter().any(|wanted| tag.contains(wanted.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use records::RecordKind;

    #[test]
    fn test_any_tag_semantics() {
        let record = Record::new("r", RecordKind::Freelancer).with_tags(["A", "B"]);

        assert!(AnyTagClause::new(["b", "c"]).matches(&record));
        assert!(!AnyTagClause::new(["c", "d"]).matches(&record));
    }

    #[test]
    fn test_partial_tag_match() {
        let record = Record::new("r", RecordKind::Freelancer).with_tags(["React Native"]);
        assert!(AnyTagClause::new(["react"]).matches(&record));
    }

    #[test]
    fn test_untagged_record_fails() {
        let record = Record::new("r", RecordKind::Freelancer);
        assert!(!AnyTagClause::new(["rust"]).matches(&record));
    }
}
