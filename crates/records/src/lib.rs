//! # Records Crate
//!
//! This crate owns the data side of a browse view: the flattened
//! [`Record`] model, the adapter from persistence rows, and the
//! [`RecordStore`] snapshot the filter layer reads from.
//!
//! ## Main Components
//!
//! - **types**: Record, RecordKind, Collection and the categorical enums
//! - **adapter**: Flatten nested persistence rows into records, tag them for
//!   the acting user
//! - **store**: Snapshot holder with wholesale, duplicate-rejecting loads
//! - **facets**: Parallel tag/category/amount aggregation
//! - **error**: Error types for loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use records::{adapter, RecordKind, RecordStore};
//!
//! let records = adapter::adapt_rows(RecordKind::Freelancer, rows)?;
//! let mut store = RecordStore::new();
//! store.load(records)?;
//!
//! println!("{} freelancers, top skills: {:?}", store.len(), store.facets().top_tags(5));
//! ```

// Public modules
pub mod adapter;
pub mod error;
pub mod facets;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{LoadError, Result};
pub use facets::Facets;
pub use store::RecordStore;
pub use types::{
    // Type aliases
    ActorId,
    RecordKey,
    // Core types
    Record,
    // Enums
    Collection,
    ExperienceLevel,
    JobStatus,
    RecordKind,
};
