//! In-memory implementation of [`Persistence`].
//!
//! Backs the CLI and the test suite. Tables are JSON rows keyed by their
//! `id` field; queries support the equality/ordering subset of
//! [`QuerySpec`]. Reads and writes can be made to fail once on demand to
//! exercise error paths.

use crate::backend::{Ack, BackendError, Persistence, QuerySpec, Row};
use crate::session::Session;
use async_trait::async_trait;
use records::{ActorId, Collection};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info};

/// One-shot failures armed by tests
#[derive(Debug, Default)]
struct Faults {
    query: Option<String>,
    write: Option<String>,
}

/// Persistence service kept entirely in memory
#[derive(Debug)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<Collection, Vec<Row>>>,
    next_id: AtomicU64,
    faults: Mutex<Faults>,
    sessions: watch::Sender<Option<Session>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty backend with nobody signed in
    pub fn new() -> Self {
        Self::with_tables(HashMap::new())
    }

    fn with_tables(tables: HashMap<Collection, Vec<Row>>) -> Self {
        let (sessions, _) = watch::channel(None);
        Self {
            tables: RwLock::new(tables),
            next_id: AtomicU64::new(1),
            faults: Mutex::new(Faults::default()),
            sessions,
        }
    }

    /// Seed from a JSON object of `collection name -> [rows]`.
    ///
    /// Unknown collection names and non-array values are rejected.
    pub fn from_json(dataset: Value) -> Result<Self, BackendError> {
        let Value::Object(map) = dataset else {
            return Err(BackendError::Seed("dataset must be a JSON object".to_string()));
        };

        let mut tables = HashMap::new();
        for (name, rows) in map {
            let collection = Collection::from_name(&name)
                .ok_or_else(|| BackendError::Seed(format!("unknown collection: {name}")))?;
            let Value::Array(rows) = rows else {
                return Err(BackendError::Seed(format!("{name} must be an array of rows")));
            };
            tables.insert(collection, rows);
        }

        let counts: Vec<String> = tables
            .iter()
            .map(|(collection, rows)| format!("{}={}", collection, rows.len()))
            .collect();
        info!("Seeded memory backend: {}", counts.join(", "));
        Ok(Self::with_tables(tables))
    }

    /// Read and seed from a JSON dataset file
    pub fn from_json_file(path: &Path) -> Result<Self, BackendError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BackendError::Seed(format!("{}: {}", path.display(), e)))?;
        let dataset: Value = serde_json::from_str(&text)
            .map_err(|e| BackendError::Seed(format!("{}: {}", path.display(), e)))?;
        Self::from_json(dataset)
    }

    /// Make the next query fail with `reason`
    pub fn fail_next_query(&self, reason: impl Into<String>) {
        self.with_faults(|faults| faults.query = Some(reason.into()));
    }

    /// Make the next insert/update/remove fail with `reason`
    pub fn fail_next_write(&self, reason: impl Into<String>) {
        self.with_faults(|faults| faults.write = Some(reason.into()));
    }

    pub fn sign_in(&self, actor_id: impl Into<ActorId>) {
        let session = Session::new(actor_id);
        debug!("Session started for {}", session.actor_id);
        self.sessions.send_replace(Some(session));
    }

    pub fn sign_out(&self) {
        self.sessions.send_replace(None);
    }

    /// Number of rows currently in `collection`
    pub async fn count(&self, collection: Collection) -> usize {
        self.tables
            .read()
            .await
            .get(&collection)
            .map_or(0, |rows| rows.len())
    }

    fn with_faults<T>(&self, f: impl FnOnce(&mut Faults) -> T) -> T {
        let mut faults = self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut faults)
    }

    fn take_query_fault(&self) -> Result<(), BackendError> {
        match self.with_faults(|faults| faults.query.take()) {
            Some(reason) => Err(BackendError::Unavailable(reason)),
            None => Ok(()),
        }
    }

    fn take_write_fault(&self) -> Result<(), BackendError> {
        match self.with_faults(|faults| faults.write.take()) {
            Some(reason) => Err(BackendError::Unavailable(reason)),
            None => Ok(()),
        }
    }

    fn fresh_key(&self, collection: Collection) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", collection, n)
    }
}

fn row_key(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[async_trait]
impl Persistence for MemoryBackend {
    async fn query(&self, collection: Collection, spec: &QuerySpec) -> Result<Vec<Row>, BackendError> {
        self.take_query_fault()?;

        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(&collection)
            .map(|rows| rows.iter().filter(|row| spec.matches(row)).cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| spec.compare(a, b));

        debug!("Query on {} returned {} rows", collection, rows.len());
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, mut row: Row) -> Result<Ack, BackendError> {
        self.take_write_fault()?;

        let Some(fields) = row.as_object_mut() else {
            return Err(BackendError::Rejected("row must be a JSON object".to_string()));
        };
        let key = match fields.get("id") {
            Some(Value::String(key)) => key.clone(),
            Some(other) => {
                return Err(BackendError::Rejected(format!("row id must be a string, got {other}")));
            }
            None => {
                let key = self.fresh_key(collection);
                fields.insert("id".to_string(), Value::String(key.clone()));
                key
            }
        };

        let mut tables = self.tables.write().await;
        let rows = tables.entry(collection).or_default();
        if rows.iter().any(|existing| row_key(existing) == Some(key.as_str())) {
            return Err(BackendError::Rejected(format!("duplicate key {key}")));
        }
        rows.push(row);

        debug!("Inserted {} into {}", key, collection);
        Ok(Ack { key, affected: 1 })
    }

    async fn update(&self, collection: Collection, key: &str, patch: Row) -> Result<Ack, BackendError> {
        self.take_write_fault()?;

        let Value::Object(patch) = patch else {
            return Err(BackendError::Rejected("patch must be a JSON object".to_string()));
        };
        if patch.get("id").is_some_and(|id| id.as_str() != Some(key)) {
            return Err(BackendError::Rejected("patch may not change the row key".to_string()));
        }

        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|row| row_key(row) == Some(key)))
            .ok_or_else(|| BackendError::NotFound {
                collection,
                key: key.to_string(),
            })?;

        if let Some(fields) = row.as_object_mut() {
            for (field, value) in patch {
                fields.insert(field, value);
            }
        }

        debug!("Updated {} in {}", key, collection);
        Ok(Ack {
            key: key.to_string(),
            affected: 1,
        })
    }

    async fn remove(&self, collection: Collection, key: &str) -> Result<Ack, BackendError> {
        self.take_write_fault()?;

        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(&collection).ok_or_else(|| BackendError::NotFound {
            collection,
            key: key.to_string(),
        })?;
        let before = rows.len();
        rows.retain(|row| row_key(row) != Some(key));
        if rows.len() == before {
            return Err(BackendError::NotFound {
                collection,
                key: key.to_string(),
            });
        }

        debug!("Removed {} from {}", key, collection);
        Ok(Ack {
            key: key.to_string(),
            affected: before - rows.len(),
        })
    }

    fn session(&self) -> Option<Session> {
        self.sessions.borrow().clone()
    }

    fn subscribe_sessions(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}
