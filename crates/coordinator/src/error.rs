//! Error types surfaced at the coordinator boundary.

use crate::backend::{Ack, BackendError};
use crate::coordinator::{MutationKind, Phase};
use records::{Collection, LoadError};
use thiserror::Error;

/// Everything a browse view operation can fail with.
///
/// Backend failures are wrapped with the operation that hit them; none are
/// retried or swallowed.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// A write or reload is already running for this view
    #[error("Another operation is in progress (phase: {phase:?})")]
    Busy { phase: Phase },

    /// A read against the backend failed; the view is left as it was
    #[error("Query on {collection} failed: {source}")]
    QueryFailure {
        collection: Collection,
        #[source]
        source: BackendError,
    },

    /// A write was not acknowledged; nothing was reloaded
    #[error("{kind} failed: {source}")]
    MutationFailure {
        kind: MutationKind,
        #[source]
        source: BackendError,
    },

    /// The write was applied but the reload that followed failed. The store
    /// still holds the snapshot from before the write.
    #[error("{kind} of {} was applied but the reload failed: {source}", ack.key)]
    ReloadAfterAck {
        kind: MutationKind,
        ack: Ack,
        #[source]
        source: Box<CoordinatorError>,
    },

    /// Fetched rows could not be loaded into the store
    #[error("Load rejected: {0}")]
    Load(#[from] LoadError),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
