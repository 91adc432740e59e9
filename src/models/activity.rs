// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Volunteer activity model: one user's participation in one project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Participation state of a volunteer activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// Signed up, no hours logged yet
    Joined,
    /// Hours are being logged
    Active,
    /// Marked complete; counts toward totals and achievements
    Completed,
}

/// Stored volunteer activity record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerActivity {
    /// Document ID (UUID v4)
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub status: ActivityStatus,
    #[serde(default)]
    pub hours_logged: f64,
    #[serde(default)]
    pub hours_verified: f64,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl VolunteerActivity {
    /// New record for a user who just joined a project.
    pub fn joined(id: String, user_id: String, project_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            project_id,
            status: ActivityStatus::Joined,
            hours_logged: 0.0,
            hours_verified: 0.0,
            joined_at: now,
            started_at: None,
            completed_at: None,
            notes: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ActivityStatus::Completed
    }

    /// Add logged hours, keeping the cumulative total within `max_hours`.
    ///
    /// The record is left untouched when the request is rejected.
    pub fn log_hours(&mut self, hours: f64, max_hours: f64, now: DateTime<Utc>) -> Result<()> {
        if self.is_completed() {
            return Err(AppError::BadRequest(
                "Cannot log hours on a completed activity".to_string(),
            ));
        }
        if !hours.is_finite() || hours <= 0.0 {
            return Err(AppError::BadRequest(
                "Hours must be greater than 0".to_string(),
            ));
        }

        let total = self.hours_logged + hours;
        if total > max_hours {
            return Err(AppError::BadRequest(format!(
                "Cannot log {} hours: total would be {} but the project allows at most {}",
                hours, total, max_hours
            )));
        }

        self.hours_logged = total;
        self.status = ActivityStatus::Active;
        self.started_at.get_or_insert(now);
        Ok(())
    }

    /// Mark the activity completed. Logged hours become the verified hours.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.is_completed() {
            return Err(AppError::Conflict("Activity already completed".to_string()));
        }
        if self.hours_logged <= 0.0 {
            return Err(AppError::BadRequest(
                "Log some hours before completing the project".to_string(),
            ));
        }

        self.status = ActivityStatus::Completed;
        self.hours_verified = self.hours_logged;
        self.completed_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_completed(
        id: &str,
        project_id: &str,
        hours: f64,
        completed_at: &str,
    ) -> VolunteerActivity {
        let completed_at = DateTime::parse_from_rfc3339(completed_at)
            .unwrap()
            .with_timezone(&Utc);
        VolunteerActivity {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            project_id: project_id.to_string(),
            status: ActivityStatus::Completed,
            hours_logged: hours,
            hours_verified: hours,
            joined_at: completed_at - chrono::Duration::days(7),
            started_at: Some(completed_at - chrono::Duration::days(6)),
            completed_at: Some(completed_at),
            notes: None,
        }
    }

    fn fresh() -> VolunteerActivity {
        VolunteerActivity::joined("a1".into(), "u1".into(), "p1".into(), Utc::now())
    }

    #[test]
    fn test_log_hours_accumulates_and_activates() {
        let mut activity = fresh();
        activity.log_hours(2.0, 5.0, Utc::now()).unwrap();
        activity.log_hours(3.0, 5.0, Utc::now()).unwrap();

        assert_eq!(activity.hours_logged, 5.0);
        assert_eq!(activity.status, ActivityStatus::Active);
        assert!(activity.started_at.is_some());
    }

    #[test]
    fn test_log_hours_over_duration_rejected_without_change() {
        let mut activity = fresh();
        activity.log_hours(4.0, 5.0, Utc::now()).unwrap();

        let err = activity.log_hours(1.5, 5.0, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(activity.hours_logged, 4.0);
    }

    #[test]
    fn test_log_hours_rejects_non_positive() {
        let mut activity = fresh();
        assert!(activity.log_hours(0.0, 5.0, Utc::now()).is_err());
        assert!(activity.log_hours(-1.0, 5.0, Utc::now()).is_err());
        assert!(activity.log_hours(f64::NAN, 5.0, Utc::now()).is_err());
        assert_eq!(activity.status, ActivityStatus::Joined);
        assert!(activity.started_at.is_none());
    }

    #[test]
    fn test_complete_with_zero_hours_rejected() {
        let mut activity = fresh();
        let err = activity.complete(Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(activity.status, ActivityStatus::Joined);
    }

    #[test]
    fn test_complete_verifies_logged_hours() {
        let mut activity = fresh();
        activity.log_hours(3.5, 10.0, Utc::now()).unwrap();
        activity.complete(Utc::now()).unwrap();

        assert!(activity.is_completed());
        assert_eq!(activity.hours_verified, 3.5);
        assert!(activity.completed_at.is_some());

        // No more hours after completion
        assert!(activity.log_hours(1.0, 10.0, Utc::now()).is_err());
        assert!(matches!(
            activity.complete(Utc::now()),
            Err(AppError::Conflict(_))
        ));
    }
}
