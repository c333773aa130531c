//! Core domain types for browsable marketplace entities.
//!
//! A [`Record`] is the flattened shape both browse pages work with: a
//! freelancer card or a job post. Everything the filter layer looks at lives
//! directly on the record; the nested shapes returned by the persistence
//! service are handled in [`crate::adapter`].

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Type Aliases
// =============================================================================

/// Opaque identity of a record, unique within one loaded snapshot
pub type RecordKey = String;

/// Identity of a user of the marketplace (the "actor" of a view)
pub type ActorId = String;

// =============================================================================
// Enums
// =============================================================================

/// Which kind of entity a record was flattened from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Freelancer,
    JobPost,
}

impl RecordKind {
    /// Name of the backing collection in the persistence service
    pub fn collection(&self) -> Collection {
        match self {
            RecordKind::Freelancer => Collection::FreelancerProfiles,
            RecordKind::JobPost => Collection::JobPosts,
        }
    }
}

/// Collections the browse layer reads from or writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    FreelancerProfiles,
    JobPosts,
    JobApplications,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::FreelancerProfiles => "freelancer_profiles",
            Collection::JobPosts => "job_posts",
            Collection::JobApplications => "job_applications",
        }
    }

    /// Inverse of [`Collection::as_str`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "freelancer_profiles" => Some(Collection::FreelancerProfiles),
            "job_posts" => Some(Collection::JobPosts),
            "job_applications" => Some(Collection::JobApplications),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-declared experience level of a freelancer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Expert => "expert",
        }
    }
}

/// Lifecycle status of a job post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Open,
    Hired,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "Open",
            JobStatus::Hired => "Hired",
            JobStatus::Closed => "Closed",
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// One listable entity after flattening from the persistence service.
///
/// `amount` is the numeric attribute range filters compare against
/// (preferred rate for freelancers, pay amount for job posts) and `category`
/// the categorical one (experience level or job status).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: RecordKey,
    pub kind: RecordKind,
    pub owner_id: Option<ActorId>,

    // Text attributes
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,

    pub amount: Option<f64>,
    pub category: Option<String>,
    /// Display order is meaningful, matching ignores it
    pub tags: Vec<String>,

    // Location
    pub city: Option<String>,
    pub country: Option<String>,

    // Ordering
    pub featured: bool,
    pub display_order: Option<i64>,
    /// RFC 3339 timestamp as returned by the persistence service
    pub created_at: Option<String>,

    // Supplementary counters shown on cards
    pub application_count: Option<u32>,
    pub portfolio_count: Option<u32>,

    // Relative to the acting user of the view
    pub owned_by_actor: bool,
    pub applied_by_actor: bool,
}

impl Record {
    /// Create a bare record with only its identity set
    pub fn new(key: impl Into<RecordKey>, kind: RecordKind) -> Self {
        Self {
            key: key.into(),
            kind,
            owner_id: None,
            name: None,
            title: None,
            description: None,
            amount: None,
            category: None,
            tags: Vec::new(),
            city: None,
            country: None,
            featured: false,
            display_order: None,
            created_at: None,
            application_count: None,
            portfolio_count: None,
            owned_by_actor: false,
            applied_by_actor: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, city: Option<&str>, country: Option<&str>) -> Self {
        self.city = city.map(str::to_string);
        self.country = country.map(str::to_string);
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<ActorId>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }

    pub fn with_display_order(mut self, display_order: i64) -> Self {
        self.display_order = Some(display_order);
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Human-facing heading: the person's name for freelancers, the title
    /// otherwise, falling back to the key
    pub fn heading(&self) -> &str {
        self.name
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or(&self.key)
    }
}
