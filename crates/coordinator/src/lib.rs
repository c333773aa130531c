//! Keeps browse views consistent with the persistence service.
//!
//! This crate provides:
//! - Persistence, the async seam to the hosted backend, and MemoryBackend
//! - Session and ViewContext, identifying who a view is rendered for
//! - BrowseCoordinator, which serializes write-then-reload cycles
//!
//! ## Example Usage
//! ```ignore
//! use coordinator::{BrowseCoordinator, MemoryBackend, Mutation, ViewContext, ViewSource};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(MemoryBackend::from_json_file(path)?);
//! let coordinator = BrowseCoordinator::new(backend, ViewSource::open_jobs(), ViewContext::anonymous());
//! coordinator.reload().await?;
//! coordinator.submit(Mutation::Delete { key: "job-2".into() }).await?;
//! ```

pub mod backend;
pub mod coordinator;
pub mod error;
pub mod memory;
pub mod session;

// Re-export main types
pub use backend::{Ack, BackendError, OrderBy, Persistence, QuerySpec, Row};
pub use coordinator::{BrowseCoordinator, Mutation, MutationKind, MutationOutcome, Phase, ViewSource};
pub use error::{CoordinatorError, Result};
pub use memory::MemoryBackend;
pub use session::{Session, ViewContext};
