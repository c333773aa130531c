//! User-controlled filter configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Problems with a [`FilterState`] or sort specification.
///
/// The predicate compiler never returns these: it fails closed instead, and
/// the offending clause matches nothing. Callers that want to tell the user
/// why the list went empty call [`FilterState::validate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} is not a number")]
    NotANumber { field: &'static str },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("minimum {min} is greater than maximum {max}")]
    InvertedRange { min: f64, max: f64 },

    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),
}

/// Declarative description of the subset of records a user wants to see.
///
/// The default value filters nothing. Empty strings and an empty tag set are
/// treated as "not set", so a form that clears a field yields the same state
/// as one that never touched it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterState {
    pub search: String,
    #[serde(alias = "minValue")]
    pub min_value: Option<f64>,
    #[serde(alias = "maxValue")]
    pub max_value: Option<f64>,
    pub category: Option<String>,
    pub tags: BTreeSet<String>,
    pub location: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// True when no clause is active
    pub fn is_default(&self) -> bool {
        self.search_term().is_none()
            && !self.has_range()
            && self.category_value().is_none()
            && self.tag_terms().is_empty()
            && self.location_term().is_none()
    }

    pub fn has_range(&self) -> bool {
        self.min_value.is_some() || self.max_value.is_some()
    }

    /// Check the numeric bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_bound("min_value", self.min_value)?;
        check_bound("max_value", self.max_value)?;
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(ValidationError::InvertedRange { min, max });
            }
        }
        Ok(())
    }

    pub(crate) fn search_term(&self) -> Option<&str> {
        non_blank(&self.search)
    }

    pub(crate) fn location_term(&self) -> Option<&str> {
        non_blank(&self.location)
    }

    pub(crate) fn category_value(&self) -> Option<&str> {
        self.category.as_deref().and_then(non_blank)
    }

    pub(crate) fn tag_terms(&self) -> Vec<&str> {
        self.tags.iter().filter_map(|tag| non_blank(tag)).collect()
    }
}

fn check_bound(field: &'static str, bound: Option<f64>) -> Result<(), ValidationError> {
    match bound {
        Some(value) if value.is_nan() => Err(ValidationError::NotANumber { field }),
        Some(value) if value < 0.0 => Err(ValidationError::Negative { field, value }),
        _ => Ok(()),
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
