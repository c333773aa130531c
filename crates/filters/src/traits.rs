//! Core traits for predicate composition.
//!
//! This module defines the Clause trait: one independent test over a record.
//! A compiled [`crate::Predicate`] is an AND of clauses.

use records::Record;
use std::fmt::Debug;

/// One condition a record must satisfy.
///
/// ## Design Note
/// - `Send + Sync` lets a compiled predicate be shared across threads
/// - Clauses are pure: same record, same answer, no side effects
pub trait Clause: Send + Sync + Debug {
    /// Returns the name of this clause (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether `record` satisfies this clause
    fn matches(&self, record: &Record) -> bool;
}
