//! The Predicate and its compiler.
//!
//! A Predicate chains clauses with AND using the builder pattern;
//! [`compile`] builds one from a FilterState.

use crate::clauses::{
    AmountRangeClause, AnyTagClause, CategoryClause, LocationClause, NeverMatchClause,
    SearchClause,
};
use crate::state::FilterState;
use crate::traits::Clause;
use records::Record;
use tracing::{debug, warn};

/// A pure boolean test over a record: the AND of its clauses.
///
/// An empty predicate matches everything.
///
/// ## Usage
/// ```ignore
/// let predicate = Predicate::new()
///     .add_clause(SearchClause::new("react"))
///     .add_clause(AmountRangeClause::new(Some(10.0), None));
///
/// let hits = store.all().iter().filter(|r| predicate.matches(r)).count();
/// ```
#[derive(Debug, Default)]
pub struct Predicate {
    clauses: Vec<Box<dyn Clause>>,
}

impl Predicate {
    /// Create a predicate that matches every record.
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Add a clause to the predicate (builder pattern).
    pub fn add_clause(mut self, clause: impl Clause + 'static) -> Self {
        self.clauses.push(Box::new(clause));
        self
    }

    /// Whether `record` satisfies every clause
    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }

    /// True when no clause is active
    pub fn is_identity(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Names of the active clauses, in evaluation order
    pub fn describe(&self) -> Vec<&str> {
        self.clauses.iter().map(|clause| clause.name()).collect()
    }
}

/// Translate a FilterState into a Predicate.
///
/// ## Algorithm
/// One clause per set field, in a fixed order: search, amount range,
/// category, tags, location. A range that fails validation becomes a
/// [`NeverMatchClause`] (logged at warn) instead of an error.
///
/// Pure: equal states compile to predicates that accept exactly the same
/// records.
pub fn compile(state: &FilterState) -> Predicate {
    let mut predicate = Predicate::new();

    if let Some(term) = state.search_term() {
        predicate = predicate.add_clause(SearchClause::new(term));
    }

    if state.has_range() {
        predicate = match state.validate() {
            Ok(()) => predicate.add_clause(AmountRangeClause::new(state.min_value, state.max_value)),
            Err(err) => {
                warn!("Rejected amount range, view will be empty: {}", err);
                predicate.add_clause(NeverMatchClause::new(err.to_string()))
            }
        };
    }

    if let Some(category) = state.category_value() {
        predicate = predicate.add_clause(CategoryClause::new(category));
    }

    let tags = state.tag_terms();
    if !tags.is_empty() {
        predicate = predicate.add_clause(AnyTagClause::new(tags));
    }

    if let Some(term) = state.location_term() {
        predicate = predicate.add_clause(LocationClause::new(term));
    }

    debug!("Compiled predicate: {:?}", predicate.describe());
    predicate
}
