//! Session and per-view actor context.
//!
//! The signed-in session lives in the persistence service. Views do not read
//! it implicitly: callers turn it into a [`ViewContext`] and hand that to the
//! coordinator.

use records::ActorId;
use serde::{Deserialize, Serialize};

/// An authenticated session as reported by the persistence service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub actor_id: ActorId,
    pub email: Option<String>,
}

impl Session {
    pub fn new(actor_id: impl Into<ActorId>) -> Self {
        Self {
            actor_id: actor_id.into(),
            email: None,
        }
    }
}

/// Who is looking at a view, and how their own records are treated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewContext {
    pub actor_id: Option<ActorId>,
    /// Drop the actor's own records instead of tagging them
    pub exclude_own: bool,
}

impl ViewContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_actor(actor_id: impl Into<ActorId>) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
            exclude_own: false,
        }
    }

    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) => Self::for_actor(session.actor_id.clone()),
            None => Self::anonymous(),
        }
    }

    pub fn excluding_own(mut self) -> Self {
        self.exclude_own = true;
        self
    }
}
