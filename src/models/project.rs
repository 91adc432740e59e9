// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Volunteer project model and capacity bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Approval workflow state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Pending,
    Active,
    Rejected,
    Completed,
}

impl ProjectStatus {
    /// Stored string form, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }
}

/// Volunteer opportunity stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Document ID (UUID v4)
    pub id: String,
    pub title: String,
    pub description: String,
    /// Organization hosting the project (empty for peer-posted projects)
    #[serde(default)]
    pub organization: String,
    /// Category used by category achievements (e.g. "environment")
    pub category: String,
    #[serde(default)]
    pub location: String,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Maximum hours a volunteer may log on this project
    pub duration: f64,
    pub max_volunteers: u32,
    #[serde(default)]
    pub current_volunteers: u32,
    #[serde(default)]
    pub spots_available: u32,
    pub status: ProjectStatus,
    #[serde(default)]
    pub is_approved: bool,
    /// User who submitted the project
    pub created_by_id: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Whether volunteers may currently join.
    pub fn is_open(&self) -> bool {
        self.status == ProjectStatus::Active && self.is_approved
    }

    /// Take one spot for a joining volunteer.
    ///
    /// Returns `false` (leaving the counters untouched) when the project is full.
    pub fn reserve_spot(&mut self, now: DateTime<Utc>) -> bool {
        if self.spots_available == 0 {
            return false;
        }
        self.spots_available -= 1;
        self.current_volunteers += 1;
        self.updated_at = now;
        true
    }

    /// Give a spot back when a volunteer leaves.
    pub fn release_spot(&mut self, now: DateTime<Utc>) {
        self.current_volunteers = self.current_volunteers.saturating_sub(1);
        self.spots_available = (self.spots_available + 1).min(self.max_volunteers);
        self.updated_at = now;
    }

    /// Mark the project approved and open for volunteers.
    pub fn approve(&mut self, now: DateTime<Utc>) {
        self.status = ProjectStatus::Active;
        self.is_approved = true;
        self.rejection_reason = None;
        self.updated_at = now;
    }

    /// Mark the project rejected with the reviewer's reason.
    pub fn reject(&mut self, reason: Option<String>, now: DateTime<Utc>) {
        self.status = ProjectStatus::Rejected;
        self.is_approved = false;
        self.rejection_reason = reason;
        self.updated_at = now;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn test_status_str_matches_serde() {
        for status in [
            ProjectStatus::Draft,
            ProjectStatus::Pending,
            ProjectStatus::Active,
            ProjectStatus::Rejected,
            ProjectStatus::Completed,
        ] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, serde_json::Value::String(status.as_str().to_string()));
        }
    }

    pub(crate) fn make_project(id: &str, category: &str, duration: f64, spots: u32) -> Project {
        let now = Utc::now();
        Project {
            id: id.to_string(),
            title: format!("Project {}", id),
            description: "Help out".to_string(),
            organization: "Food Bank".to_string(),
            category: category.to_string(),
            location: "Palo Alto".to_string(),
            start_date: now,
            end_date: None,
            duration,
            max_volunteers: spots,
            current_volunteers: 0,
            spots_available: spots,
            status: ProjectStatus::Active,
            is_approved: true,
            created_by_id: "owner".to_string(),
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reserve_spot_until_full() {
        let mut project = make_project("p1", "environment", 10.0, 2);
        let now = Utc::now();

        assert!(project.reserve_spot(now));
        assert!(project.reserve_spot(now));
        assert_eq!(project.spots_available, 0);
        assert_eq!(project.current_volunteers, 2);

        // Full: counters stay put
        assert!(!project.reserve_spot(now));
        assert_eq!(project.spots_available, 0);
        assert_eq!(project.current_volunteers, 2);
    }

    #[test]
    fn test_release_spot_never_exceeds_capacity() {
        let mut project = make_project("p1", "environment", 10.0, 1);
        project.release_spot(Utc::now());
        assert_eq!(project.spots_available, 1);
        assert_eq!(project.current_volunteers, 0);
    }

    #[test]
    fn test_review_transitions() {
        let mut project = make_project("p1", "environment", 10.0, 5);
        project.status = ProjectStatus::Pending;
        project.is_approved = false;
        assert!(!project.is_open());

        project.reject(Some("Missing details".into()), Utc::now());
        assert_eq!(project.status, ProjectStatus::Rejected);
        assert_eq!(project.rejection_reason.as_deref(), Some("Missing details"));

        project.approve(Utc::now());
        assert!(project.is_open());
        assert!(project.rejection_reason.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ProjectStatus::Pending).unwrap(),
            serde_json::json!("pending")
        );
    }
}
