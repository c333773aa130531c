//! Row adapter: raw persistence rows -> [`Record`].
//!
//! The persistence service returns rows shaped by its own schema, with
//! joined tables nested inside:
//! - `freelancer_profiles`: `profiles` (inner join, name and location) and
//!   `freelancer_skills[].skills` (skill name plus category)
//! - `job_posts`: flat, optionally with an `application_count` column from
//!   the counting view
//!
//! This module is the only place that knows those shapes. It flattens each
//! row into a [`Record`] so nothing downstream depends on the external
//! schema.

use crate::error::{LoadError, Result};
use crate::types::{ActorId, ExperienceLevel, JobStatus, Record, RecordKind};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

// =============================================================================
// Raw row shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct FreelancerRow {
    id: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    preferred_rate: Option<f64>,
    #[serde(default)]
    experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    is_featured: bool,
    #[serde(default)]
    display_order: Option<i64>,
    #[serde(default)]
    portfolio_count: Option<u32>,
    profiles: ProfileJoin,
    #[serde(default)]
    freelancer_skills: Vec<FreelancerSkillJoin>,
}

#[derive(Debug, Deserialize)]
struct ProfileJoin {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FreelancerSkillJoin {
    skills: SkillRef,
}

#[derive(Debug, Deserialize)]
struct SkillRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct JobPostRow {
    id: String,
    user_id: String,
    #[serde(default)]
    created_at: Option<String>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    pay_amount: Option<f64>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    status: JobStatus,
    #[serde(default)]
    application_count: Option<u32>,
}

// =============================================================================
// Flattening
// =============================================================================

/// Flatten a batch of raw rows of one kind into records, preserving order.
///
/// The first row that does not fit the expected shape aborts the batch with
/// [`LoadError::MalformedRow`].
pub fn adapt_rows(kind: RecordKind, rows: Vec<Value>) -> Result<Vec<Record>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            adapt_row(kind, row).map_err(|reason| LoadError::MalformedRow {
                collection: kind.collection().to_string(),
                index,
                reason,
            })
        })
        .collect()
}

fn adapt_row(kind: RecordKind, row: Value) -> std::result::Result<Record, String> {
    match kind {
        RecordKind::Freelancer => {
            let row: FreelancerRow = serde_json::from_value(row).map_err(|e| e.to_string())?;
            freelancer_record(row)
        }
        RecordKind::JobPost => {
            let row: JobPostRow = serde_json::from_value(row).map_err(|e| e.to_string())?;
            job_post_record(row)
        }
    }
}

fn freelancer_record(row: FreelancerRow) -> std::result::Result<Record, String> {
    let amount = non_negative("preferred_rate", row.preferred_rate)?;

    let name = [row.profiles.first_name, row.profiles.last_name]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut record = Record::new(row.id, RecordKind::Freelancer);
    record.owner_id = row.user_id;
    record.name = (!name.is_empty()).then_some(name);
    record.title = row.title;
    record.description = row.description;
    record.amount = amount;
    record.category = row.experience_level.map(|level| level.as_str().to_string());
    record.tags = row
        .freelancer_skills
        .into_iter()
        .map(|join| join.skills.name)
        .collect();
    record.city = row.profiles.city;
    record.country = row.profiles.country;
    record.featured = row.is_featured;
    record.display_order = row.display_order;
    record.created_at = row.created_at;
    record.portfolio_count = row.portfolio_count;
    Ok(record)
}

fn job_post_record(row: JobPostRow) -> std::result::Result<Record, String> {
    let amount = non_negative("pay_amount", row.pay_amount)?;

    let mut record = Record::new(row.id, RecordKind::JobPost);
    record.owner_id = Some(row.user_id);
    record.title = Some(row.title);
    record.description = row.description;
    record.amount = amount;
    record.category = Some(row.status.as_str().to_string());
    record.tags = row.tags.unwrap_or_default();
    record.created_at = row.created_at;
    record.application_count = row.application_count;
    Ok(record)
}

fn non_negative(field: &str, value: Option<f64>) -> std::result::Result<Option<f64>, String> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(format!("{field} must be a non-negative number, got {v}")),
        other => Ok(other),
    }
}

// =============================================================================
// Actor tagging
// =============================================================================

/// Mark records relative to the acting user of a view.
///
/// - `owned_by_actor` when the record's owner is the actor
/// - `applied_by_actor` when the record key is in `applied_keys`
///
/// With `exclude_own`, the actor's own records are dropped instead of tagged.
/// Without an actor every flag is cleared.
pub fn tag_for_actor(
    records: Vec<Record>,
    actor_id: Option<&ActorId>,
    applied_keys: &HashSet<String>,
    exclude_own: bool,
) -> Vec<Record> {
    records
        .into_iter()
        .filter_map(|mut record| {
            let owned = match (actor_id, record.owner_id.as_ref()) {
                (Some(actor), Some(owner)) => actor == owner,
                _ => false,
            };
            if owned && exclude_own {
                return None;
            }
            record.owned_by_actor = owned;
            record.applied_by_actor = actor_id.is_some() && applied_keys.contains(&record.key);
            Some(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn freelancer_row() -> Value {
        json!({
            "id": "fp-1",
            "user_id": "u-1",
            "title": "Frontend Developer",
            "description": "React and TypeScript",
            "preferred_rate": 45.0,
            "experience_level": "expert",
            "is_available": true,
            "created_at": "2024-05-01T10:00:00Z",
            "profiles": {
                "first_name": "Ada",
                "last_name": "Lovelace",
                "city": "London",
                "country": "United Kingdom"
            },
            "freelancer_skills": [
                { "proficiency_level": 5, "skills": { "name": "React", "skill_categories": { "name": "Web" } } },
                { "proficiency_level": 3, "skills": { "name": "Figma", "skill_categories": null } }
            ]
        })
    }

    #[test]
    fn test_freelancer_row_is_flattened() {
        let records = adapt_rows(RecordKind::Freelancer, vec![freelancer_row()]).unwrap();
        let record = &records[0];

        assert_eq!(record.key, "fp-1");
        assert_eq!(record.kind, RecordKind::Freelancer);
        assert_eq!(record.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(record.amount, Some(45.0));
        assert_eq!(record.category.as_deref(), Some("expert"));
        assert_eq!(record.tags, vec!["React", "Figma"]);
        assert_eq!(record.city.as_deref(), Some("London"));
        assert_eq!(record.owner_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn test_job_post_row() {
        let row = json!({
            "id": "job-9",
            "user_id": "client-1",
            "created_at": "2024-06-01T09:00:00Z",
            "title": "Landing page",
            "description": null,
            "pay_amount": null,
            "tags": ["html", "css"],
            "status": "Open",
            "application_count": 4
        });

        let records = adapt_rows(RecordKind::JobPost, vec![row]).unwrap();
        let record = &records[0];

        assert_eq!(record.title.as_deref(), Some("Landing page"));
        assert_eq!(record.amount, None);
        assert_eq!(record.category.as_deref(), Some("Open"));
        assert_eq!(record.application_count, Some(4));
        assert_eq!(record.heading(), "Landing page");
    }

    #[test]
    fn test_missing_profile_join_is_malformed() {
        let mut row = freelancer_row();
        row.as_object_mut().unwrap().remove("profiles");

        let err = adapt_rows(RecordKind::Freelancer, vec![freelancer_row(), row]).unwrap_err();
        match err {
            LoadError::MalformedRow { collection, index, .. } => {
                assert_eq!(collection, "freelancer_profiles");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_amount_is_malformed() {
        let mut row = freelancer_row();
        row["preferred_rate"] = json!(-5.0);
        assert!(adapt_rows(RecordKind::Freelancer, vec![row]).is_err());
    }

    #[test]
    fn test_unknown_status_is_malformed() {
        let row = json!({ "id": "j", "user_id": "u", "title": "t", "status": "Archived" });
        assert!(adapt_rows(RecordKind::JobPost, vec![row]).is_err());
    }

    #[test]
    fn test_tag_for_actor() {
        let records = vec![
            Record::new("j1", RecordKind::JobPost).with_owner("alice"),
            Record::new("j2", RecordKind::JobPost).with_owner("bob"),
            Record::new("j3", RecordKind::JobPost).with_owner("bob"),
        ];
        let applied: HashSet<String> = ["j3".to_string()].into_iter().collect();
        let actor = "alice".to_string();

        let tagged = tag_for_actor(records.clone(), Some(&actor), &applied, false);
        assert!(tagged[0].owned_by_actor);
        assert!(!tagged[1].applied_by_actor);
        assert!(tagged[2].applied_by_actor);

        let excluded = tag_for_actor(records.clone(), Some(&actor), &applied, true);
        let keys: Vec<&str> = excluded.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["j2", "j3"]);

        let anonymous = tag_for_actor(records, None, &applied, true);
        assert_eq!(anonymous.len(), 3);
        assert!(anonymous.iter().all(|r| !r.owned_by_actor && !r.applied_by_actor));
    }
}
