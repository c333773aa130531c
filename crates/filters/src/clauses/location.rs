//! Free-text location filter.

use crate::traits::Clause;
use records::Record;

/// Keeps records whose city or country contains the term, ignoring case.
#[derive(Debug, Clone)]
pub struct LocationClause {
    term: String,
}

impl LocationClause {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_lowercase(),
        }
    }
}

impl Clause for LocationClause {
    fn name(&self) -> &str {
        "LocationClause"
    }

    fn matches(&self, record: &Record) -> bool {
        [&record.city, &record.country]
            .into_iter()
            .flatten()
            .any(|place| place.to_lowercase().contains(&self.term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use records::RecordKind;

    #[test]
    fn test_location_clause() {
        let clause = LocationClause::new("lis");
        let lisbon = Record::new("a", RecordKind::Freelancer).with_location(Some("Lisbon"), Some("Portugal"));
        let porto = Record::new("b", RecordKind::Freelancer).with_location(Some("Porto"), Some("Portugal"));
        let nowhere = Record::new("c", RecordKind::Freelancer);

        assert!(clause.matches(&lisbon));
        assert!(!clause.matches(&porto));
        assert!(!clause.matches(&nowhere));
        assert!(LocationClause::new("PORTUGAL").matches(&porto));
    }
}
