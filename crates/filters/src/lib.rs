//! Filtering for browse views over a record store.
//!
//! This crate provides:
//! - FilterState, the user's declarative filter configuration
//! - Clause trait and implementations, one per filter field
//! - Predicate and `compile`, turning a FilterState into an AND of clauses
//! - `apply` and FilterEngine, producing the ordered DerivedView
//!
//! ## Architecture
//! A view is derived in stages:
//! 1. `compile` turns the current FilterState into a Predicate
//! 2. `apply` walks the store snapshot once and keeps accepted records
//! 3. An optional SortOrder stable-sorts the survivors
//!
//! ## Example Usage
//! ```ignore
//! use filters::{FilterEngine, FilterState, SortOrder};
//!
//! let mut engine = FilterEngine::new().with_sort(SortOrder::showcase());
//! let view = engine.set_filter(
//!     FilterState::new().with_tag("react").with_min(10.0),
//!     &store,
//! );
//! for record in view.iter() {
//!     println!("{}", record.heading());
//! }
//! ```

pub mod clauses;
pub mod engine;
pub mod predicate;
pub mod state;
pub mod traits;

// Re-export main types
pub use engine::{DerivedView, FilterEngine, SortKey, SortOrder, apply};
pub use predicate::{Predicate, compile};
pub use state::{FilterState, ValidationError};
pub use traits::Clause;
