//! Clause implementations for the predicate compiler.
//!
//! Each clause covers one field of a FilterState. The compiler only adds a
//! clause when its field is set.

pub mod amount_range;
pub mod category;
pub mod location;
pub mod never;
pub mod search;
pub mod tags;

// Re-export for convenience
pub use amount_range::AmountRangeClause;
pub use category::CategoryClause;
pub use location::LocationClause;
pub use never::NeverMatchClause;
pub use search::SearchClause;
pub use tags::AnyTagClause;
