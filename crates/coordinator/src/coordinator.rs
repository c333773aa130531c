//! # Browse Coordinator
//!
//! Owns one browse view end to end and keeps it consistent with the
//! persistence service:
//! 1. Fetch rows for the view's source
//! 2. Flatten them into records and tag them for the acting user
//! 3. Load the record store
//! 4. Re-derive the filtered view with the current filter state
//!
//! Writes go through [`BrowseCoordinator::submit`]: the backend must
//! acknowledge the write before the view is reloaded in full. Nothing is
//! patched locally.
//!
//! ## Phases
//! `Idle -> Submitting -> {Reloading -> Idle | Failed -> Idle}`; a plain
//! reload goes `Idle -> Reloading -> Idle`. Only one write or reload runs at
//! a time; a second one gets [`CoordinatorError::Busy`]. Filter changes are
//! pure recomputations and are allowed in any phase.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, instrument, warn};

use filters::{DerivedView, FilterEngine, FilterState, SortOrder};
use records::{Collection, Facets, Record, RecordKind, RecordStore, adapter};

use crate::backend::{Ack, Persistence, QuerySpec, Row};
use crate::error::{CoordinatorError, Result};
use crate::session::ViewContext;

// =============================================================================
// Phases and mutations
// =============================================================================

/// Where the coordinator is in its write/reload cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Reloading,
    Failed,
}

/// The kind of a write, reported with its outcome or failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::Create => "Create",
            MutationKind::Update => "Update",
            MutationKind::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// A write against the view's collection
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create { row: Row },
    Update { key: String, patch: Row },
    Delete { key: String },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create { .. } => MutationKind::Create,
            Mutation::Update { .. } => MutationKind::Update,
            Mutation::Delete { .. } => MutationKind::Delete,
        }
    }
}

/// Result of an acknowledged write and the reload that followed
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    /// Collection the write went to
    pub collection: Collection,
    pub ack: Ack,
    /// Records visible after the reload
    pub visible: usize,
    /// Store generation after the reload
    pub generation: u64,
}

// =============================================================================
// View source
// =============================================================================

/// What a view lists and how the backend is asked for it
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSource {
    pub kind: RecordKind,
    pub spec: QuerySpec,
}

impl ViewSource {
    pub fn new(kind: RecordKind, spec: QuerySpec) -> Self {
        Self { kind, spec }
    }

    /// Available freelancers, newest profiles first
    pub fn freelancers() -> Self {
        Self::new(
            RecordKind::Freelancer,
            QuerySpec::new()
                .eq("is_available", true)
                .order_by("created_at", false),
        )
    }

    /// Open job posts, newest first
    pub fn open_jobs() -> Self {
        Self::new(
            RecordKind::JobPost,
            QuerySpec::new().eq("status", "Open").order_by("created_at", false),
        )
    }

    /// Every post owned by one client, any status, newest first
    pub fn jobs_posted_by(owner_id: &str) -> Self {
        Self::new(
            RecordKind::JobPost,
            QuerySpec::new().eq("user_id", owner_id).order_by("created_at", false),
        )
    }

    pub fn collection(&self) -> Collection {
        self.kind.collection()
    }
}

// =============================================================================
// Phase guard
// =============================================================================

/// Holds the coordinator out of `Idle` for the duration of one cycle.
///
/// Dropping the guard, including when the owning future is cancelled,
/// returns the phase to `Idle`.
struct PhaseGuard<'a> {
    phase: &'a watch::Sender<Phase>,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a watch::Sender<Phase>, target: Phase) -> Result<Self> {
        let entered = phase.send_if_modified(|current| {
            if *current == Phase::Idle {
                *current = target;
                true
            } else {
                false
            }
        });
        if entered {
            Ok(Self { phase })
        } else {
            Err(CoordinatorError::Busy {
                phase: *phase.borrow(),
            })
        }
    }

    fn advance(&self, next: Phase) {
        self.phase.send_replace(next);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.send_replace(Phase::Idle);
    }
}

// =============================================================================
// Coordinator
// =============================================================================

#[derive(Debug, Default)]
struct ViewState {
    store: RecordStore,
    engine: FilterEngine,
}

/// Serializes write-then-reload cycles for one browse view.
pub struct BrowseCoordinator {
    backend: Arc<dyn Persistence>,
    source: ViewSource,
    context: ViewContext,
    state: RwLock<ViewState>,
    phase: watch::Sender<Phase>,
}

impl BrowseCoordinator {
    /// Create a coordinator with an empty store; call [`Self::reload`] to
    /// populate it.
    pub fn new(backend: Arc<dyn Persistence>, source: ViewSource, context: ViewContext) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            backend,
            source,
            context,
            state: RwLock::new(ViewState::default()),
            phase,
        }
    }

    /// Sort the derived view (builder pattern)
    pub fn with_sort(mut self, order: SortOrder) -> Self {
        let state = self.state.get_mut();
        state.engine = std::mem::take(&mut state.engine).with_sort(order);
        self
    }

    pub fn source(&self) -> &ViewSource {
        &self.source
    }

    pub fn context(&self) -> &ViewContext {
        &self.context
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Observe phase transitions
    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Fetch the source in full and rebuild store and view.
    ///
    /// On failure the store and view keep their previous contents.
    #[instrument(skip_all, fields(collection = %self.source.collection()))]
    pub async fn reload(&self) -> Result<usize> {
        let _guard = PhaseGuard::enter(&self.phase, Phase::Reloading)?;
        let (visible, _) = self.reload_view().await?;
        Ok(visible)
    }

    /// Send a write to the view's own collection and, once acknowledged,
    /// reload the view.
    ///
    /// A rejected write leaves the store untouched and is returned as
    /// [`CoordinatorError::MutationFailure`]. A write that was acknowledged
    /// but whose reload failed is returned as
    /// [`CoordinatorError::ReloadAfterAck`] carrying the ack; the write must
    /// not be retried.
    pub async fn submit(&self, mutation: Mutation) -> Result<MutationOutcome> {
        self.submit_to(self.source.collection(), mutation).await
    }

    /// Like [`Self::submit`], but writes to `collection`.
    ///
    /// Used for writes that change how the view is tagged without touching
    /// the listed collection, such as an application against a job post.
    #[instrument(skip_all, fields(collection = %collection, kind = %mutation.kind()))]
    pub async fn submit_to(&self, collection: Collection, mutation: Mutation) -> Result<MutationOutcome> {
        let guard = PhaseGuard::enter(&self.phase, Phase::Submitting)?;
        let kind = mutation.kind();

        let written = match mutation {
            Mutation::Create { row } => self.backend.insert(collection, row).await,
            Mutation::Update { key, patch } => self.backend.update(collection, &key, patch).await,
            Mutation::Delete { key } => self.backend.remove(collection, &key).await,
        };

        let ack = match written {
            Ok(ack) => ack,
            Err(source) => {
                guard.advance(Phase::Failed);
                warn!("{} on {} failed, keeping current snapshot: {}", kind, collection, source);
                return Err(CoordinatorError::MutationFailure { kind, source });
            }
        };

        info!("{} of {} in {} acknowledged, reloading", kind, ack.key, collection);
        guard.advance(Phase::Reloading);
        let (visible, generation) = match self.reload_view().await {
            Ok(reloaded) => reloaded,
            Err(source) => {
                warn!("{} of {} applied but reload failed: {}", kind, ack.key, source);
                return Err(CoordinatorError::ReloadAfterAck {
                    kind,
                    ack,
                    source: Box::new(source),
                });
            }
        };

        Ok(MutationOutcome {
            kind,
            collection,
            ack,
            visible,
            generation,
        })
    }

    /// Reload after a write that was sent to the backend by someone else,
    /// for example another component sharing the same collection.
    #[instrument(skip(self), fields(collection = %self.source.collection()))]
    pub async fn on_mutation_acknowledged(&self, kind: MutationKind) -> Result<usize> {
        let _guard = PhaseGuard::enter(&self.phase, Phase::Reloading)?;
        info!("External {} acknowledged, reloading", kind);
        let (visible, _) = self.reload_view().await?;
        Ok(visible)
    }

    /// Replace the filter state and return the recomputed view
    pub async fn set_filter(&self, filter: FilterState) -> DerivedView {
        let mut state = self.state.write().await;
        let ViewState { store, engine } = &mut *state;
        engine.set_filter(filter, store).clone()
    }

    /// Replace the sort order and return the recomputed view
    pub async fn set_sort(&self, order: SortOrder) -> DerivedView {
        let mut state = self.state.write().await;
        let ViewState { store, engine } = &mut *state;
        engine.set_sort(order, store).clone()
    }

    /// Current derived view
    pub async fn view(&self) -> DerivedView {
        self.state.read().await.engine.view().clone()
    }

    pub async fn filter_state(&self) -> FilterState {
        self.state.read().await.engine.filter_state().clone()
    }

    /// Number of records in the store, filtered or not
    pub async fn store_len(&self) -> usize {
        self.state.read().await.store.len()
    }

    /// Facets over the whole store, independent of the current filter
    pub async fn facets(&self) -> Facets {
        self.state.read().await.store.facets()
    }

    async fn reload_view(&self) -> Result<(usize, u64)> {
        let start = Instant::now();
        let records = self.fetch_records().await?;

        let mut state = self.state.write().await;
        let ViewState { store, engine } = &mut *state;
        store.load(records)?;
        let view = engine.refresh(store);

        info!(
            "Reloaded {}: {} records, {} visible, generation {} in {:.2?}",
            self.source.collection(),
            store.len(),
            view.len(),
            view.generation(),
            start.elapsed()
        );
        Ok((view.len(), view.generation()))
    }

    async fn fetch_records(&self) -> Result<Vec<Record>> {
        let collection = self.source.collection();
        let rows = self
            .backend
            .query(collection, &self.source.spec)
            .await
            .map_err(|source| CoordinatorError::QueryFailure { collection, source })?;
        debug!("Fetched {} rows from {}", rows.len(), collection);

        let records = adapter::adapt_rows(self.source.kind, rows)?;
        let applied = self.applied_keys().await?;

        Ok(adapter::tag_for_actor(
            records,
            self.context.actor_id.as_ref(),
            &applied,
            self.context.exclude_own,
        ))
    }

    /// Job posts the actor has applied to. Empty for anonymous views and for
    /// sources that are not job posts.
    async fn applied_keys(&self) -> Result<HashSet<String>> {
        let (Some(actor), RecordKind::JobPost) = (&self.context.actor_id, self.source.kind) else {
            return Ok(HashSet::new());
        };

        let collection = Collection::JobApplications;
        let spec = QuerySpec::new().eq("applicant_id", actor.as_str());
        let rows = self
            .backend
            .query(collection, &spec)
            .await
            .map_err(|source| CoordinatorError::QueryFailure { collection, source })?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get("job_id").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }
}
