//! Activity aggregates and the user totals derived from them.
//!
//! Totals are always recomputed from the full set of a user's activities,
//! so running the computation again with no new activity yields the same result.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{ActivityStatus, User, VolunteerActivity};

/// Points awarded per completed hour.
pub const POINTS_PER_HOUR: f64 = 10.0;
/// Points needed to advance one level.
pub const POINTS_PER_LEVEL: u32 = 100;

/// Which hours field a caller sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursBasis {
    /// `hours_verified` (set when an activity is completed)
    Verified,
    /// `hours_logged` (self-reported)
    Logged,
}

/// Aggregate view over one user's activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitySummary {
    /// Hours summed over completed activities
    pub completed_hours: f64,
    /// Distinct projects among completed activities
    pub completed_projects: u32,
    /// Logged hours on activities not yet completed
    pub in_progress_hours: f64,
    pub joined_count: u32,
    pub active_count: u32,
    pub completed_count: u32,
}

impl ActivitySummary {
    /// Aggregate a user's activities.
    pub fn from_activities(activities: &[VolunteerActivity], basis: HoursBasis) -> Self {
        let mut summary = Self::default();
        let mut completed_projects: HashSet<&str> = HashSet::new();

        for activity in activities {
            match activity.status {
                ActivityStatus::Joined => {
                    summary.joined_count += 1;
                    summary.in_progress_hours += activity.hours_logged;
                }
                ActivityStatus::Active => {
                    summary.active_count += 1;
                    summary.in_progress_hours += activity.hours_logged;
                }
                ActivityStatus::Completed => {
                    summary.completed_count += 1;
                    summary.completed_hours += match basis {
                        HoursBasis::Verified => activity.hours_verified,
                        HoursBasis::Logged => activity.hours_logged,
                    };
                    completed_projects.insert(activity.project_id.as_str());
                }
            }
        }

        summary.completed_projects = completed_projects.len() as u32;
        summary
    }
}

/// Aggregate counters persisted on the user record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserTotals {
    pub total_hours: f64,
    pub total_projects: u32,
    pub points: u32,
    pub level: u32,
}

impl UserTotals {
    /// Totals from verified hours on completed activities.
    pub fn from_activities(activities: &[VolunteerActivity]) -> Self {
        let summary = ActivitySummary::from_activities(activities, HoursBasis::Verified);
        Self::from_summary(&summary)
    }

    pub fn from_summary(summary: &ActivitySummary) -> Self {
        let points = points_for_hours(summary.completed_hours);
        Self {
            total_hours: summary.completed_hours,
            total_projects: summary.completed_projects,
            points,
            level: level_for_points(points),
        }
    }

    /// Whether the user record already carries these totals.
    pub fn matches(&self, user: &User) -> bool {
        user.total_hours == self.total_hours
            && user.total_projects == self.total_projects
            && user.points == self.points
            && user.level == self.level
    }

    /// Copy the totals onto a user record.
    pub fn apply_to(&self, user: &mut User) {
        user.total_hours = self.total_hours;
        user.total_projects = self.total_projects;
        user.points = self.points;
        user.level = self.level;
    }
}

/// Points for a number of hours (10 per hour, rounded down).
pub fn points_for_hours(hours: f64) -> u32 {
    if !hours.is_finite() || hours <= 0.0 {
        return 0;
    }
    (hours * POINTS_PER_HOUR).floor() as u32
}

/// Level for a points balance; everyone starts at level 1.
pub fn level_for_points(points: u32) -> u32 {
    points / POINTS_PER_LEVEL + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::tests::make_completed;

    fn in_progress(id: &str, project_id: &str, hours: f64, status: ActivityStatus) -> VolunteerActivity {
        let mut activity = make_completed(id, project_id, hours, "2024-03-04T10:00:00Z");
        activity.status = status;
        activity.hours_verified = 0.0;
        activity.completed_at = None;
        activity
    }

    #[test]
    fn test_three_completed_projects() {
        let activities = vec![
            make_completed("a1", "p1", 2.0, "2024-03-01T10:00:00Z"),
            make_completed("a2", "p2", 5.0, "2024-03-02T10:00:00Z"),
            make_completed("a3", "p3", 3.0, "2024-03-03T10:00:00Z"),
        ];

        let totals = UserTotals::from_activities(&activities);
        assert_eq!(totals.total_hours, 10.0);
        assert_eq!(totals.total_projects, 3);
        assert_eq!(totals.points, 100);
        assert_eq!(totals.level, 2);
    }

    #[test]
    fn test_only_completed_activities_count() {
        let activities = vec![
            make_completed("a1", "p1", 4.0, "2024-03-01T10:00:00Z"),
            in_progress("a2", "p2", 6.0, ActivityStatus::Active),
            in_progress("a3", "p3", 0.0, ActivityStatus::Joined),
        ];

        let summary = ActivitySummary::from_activities(&activities, HoursBasis::Verified);
        assert_eq!(summary.completed_hours, 4.0);
        assert_eq!(summary.completed_projects, 1);
        assert_eq!(summary.in_progress_hours, 6.0);
        assert_eq!(summary.joined_count, 1);
        assert_eq!(summary.active_count, 1);
        assert_eq!(summary.completed_count, 1);
    }

    #[test]
    fn test_distinct_projects_not_double_counted() {
        let activities = vec![
            make_completed("a1", "p1", 2.0, "2024-03-01T10:00:00Z"),
            make_completed("a2", "p1", 3.0, "2024-03-08T10:00:00Z"),
        ];

        let summary = ActivitySummary::from_activities(&activities, HoursBasis::Verified);
        assert_eq!(summary.completed_hours, 5.0);
        assert_eq!(summary.completed_projects, 1);
        assert_eq!(summary.completed_count, 2);
    }

    #[test]
    fn test_hours_basis_selects_field() {
        let mut activity = make_completed("a1", "p1", 4.0, "2024-03-01T10:00:00Z");
        activity.hours_verified = 3.0;

        let verified = ActivitySummary::from_activities(&[activity.clone()], HoursBasis::Verified);
        let logged = ActivitySummary::from_activities(&[activity], HoursBasis::Logged);
        assert_eq!(verified.completed_hours, 3.0);
        assert_eq!(logged.completed_hours, 4.0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let activities = vec![
            make_completed("a1", "p1", 2.5, "2024-03-01T10:00:00Z"),
            make_completed("a2", "p2", 1.25, "2024-03-02T10:00:00Z"),
        ];
        let first = UserTotals::from_activities(&activities);
        let second = UserTotals::from_activities(&activities);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_history_is_level_one() {
        let totals = UserTotals::from_activities(&[]);
        assert_eq!(totals.total_hours, 0.0);
        assert_eq!(totals.points, 0);
        assert_eq!(totals.level, 1);
    }

    #[test]
    fn test_points_and_levels() {
        assert_eq!(points_for_hours(0.0), 0);
        assert_eq!(points_for_hours(1.55), 15);
        assert_eq!(points_for_hours(-3.0), 0);
        assert_eq!(level_for_points(0), 1);
        assert_eq!(level_for_points(99), 1);
        assert_eq!(level_for_points(100), 2);
        assert_eq!(level_for_points(250), 3);
    }

    #[test]
    fn test_apply_and_match() {
        let mut user = User::new("u1".into(), "a@b.org".into(), "Ada".into(), chrono::Utc::now());
        let totals = UserTotals {
            total_hours: 12.0,
            total_projects: 2,
            points: 120,
            level: 2,
        };
        assert!(!totals.matches(&user));
        totals.apply_to(&mut user);
        assert!(totals.matches(&user));
    }
}
