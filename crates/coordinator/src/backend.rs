//! The persistence/auth collaborator seam.
//!
//! Everything that talks to the hosted backend goes through [`Persistence`].
//! The trait is object safe (via `async_trait`) so a coordinator can hold an
//! `Arc<dyn Persistence>` and tests can swap in their own implementation.

use crate::session::Session;
use async_trait::async_trait;
use records::Collection;
use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;
use tokio::sync::watch;

/// A raw row as returned by the persistence service
pub type Row = Value;

/// Errors reported by a persistence backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("No row with key {key} in {collection}")]
    NotFound { collection: Collection, key: String },

    #[error("Row rejected: {0}")]
    Rejected(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to seed backend: {0}")]
    Seed(String),
}

/// Acknowledgement of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Key of the row written
    pub key: String,
    /// Rows affected
    pub affected: usize,
}

/// One ordering clause of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub ascending: bool,
}

/// Server-side selection pushed to the backend with a query.
///
/// Mirrors what the browse pages ask for: equality constraints
/// (`status = Open`) and ordering (`created_at desc`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub filters: Vec<(String, Value)>,
    pub order: Vec<OrderBy>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.order.push(OrderBy {
            field: field.into(),
            ascending,
        });
        self
    }

    /// Whether a row satisfies every equality constraint
    pub fn matches(&self, row: &Row) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| row.get(field) == Some(value))
    }

    /// Compare two rows by the ordering clauses. Missing or null fields sort
    /// last in either direction.
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        for clause in &self.order {
            let left = a.get(&clause.field).filter(|v| !v.is_null());
            let right = b.get(&clause.field).filter(|v| !v.is_null());
            let ordering = match (left, right) {
                (Some(x), Some(y)) => {
                    let ordering = compare_values(x, y);
                    if clause.ascending { ordering } else { ordering.reverse() }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering.is_ne() {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// The hosted persistence/auth service.
///
/// Writes return an [`Ack`] once the backend has applied them. Session state
/// is exposed for callers to build a [`crate::ViewContext`] from; the
/// coordinator itself never reads it.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn query(&self, collection: Collection, spec: &QuerySpec) -> Result<Vec<Row>, BackendError>;

    async fn insert(&self, collection: Collection, row: Row) -> Result<Ack, BackendError>;

    async fn update(&self, collection: Collection, key: &str, patch: Row) -> Result<Ack, BackendError>;

    async fn remove(&self, collection: Collection, key: &str) -> Result<Ack, BackendError>;

    /// Currently signed-in session, if any
    fn session(&self) -> Option<Session>;

    /// Receive every future session change
    fn subscribe_sessions(&self) -> watch::Receiver<Option<Session>>;
}
