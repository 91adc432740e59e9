// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Joining projects, logging hours, and completing activities.

use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Project, User, VolunteerActivity};
use crate::services::locks::KeyedLocks;
use crate::services::stats::{StatsRefresh, StatsService};

/// Request body for logging hours.
#[derive(Debug, Deserialize, Validate)]
pub struct LogHoursRequest {
    #[validate(range(exclusive_min = 0.0, max = 24.0))]
    pub hours: f64,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Outcome of an action that changed the user's totals.
#[derive(Debug, Clone)]
pub struct ActivityUpdate {
    pub activity: VolunteerActivity,
    /// `None` when the activity was saved but the stats refresh failed
    pub stats: Option<StatsRefresh>,
}

/// Volunteer-facing activity workflow.
#[derive(Clone)]
pub struct VolunteerService {
    db: FirestoreDb,
    stats: StatsService,
    project_locks: KeyedLocks,
    /// Serializes changes to one activity within this instance
    activity_locks: KeyedLocks,
}

impl VolunteerService {
    pub fn new(db: FirestoreDb, stats: StatsService, project_locks: KeyedLocks) -> Self {
        Self {
            db,
            stats,
            project_locks,
            activity_locks: KeyedLocks::new(),
        }
    }

    async fn load_project(&self, project_id: &str) -> Result<Project> {
        self.db
            .get_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", project_id)))
    }

    /// Load an activity and check it belongs to `user`.
    async fn load_own_activity(&self, user: &User, activity_id: &str) -> Result<VolunteerActivity> {
        let activity = self
            .db
            .get_activity(activity_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", activity_id)))?;

        if activity.user_id != user.id {
            tracing::warn!(
                user_id = %user.id,
                activity_id,
                owner = %activity.user_id,
                "Attempt to modify another user's activity"
            );
            return Err(AppError::Forbidden(
                "Activity belongs to another user".to_string(),
            ));
        }
        Ok(activity)
    }

    /// Join an open project, taking one spot.
    pub async fn join(&self, user: &User, project_id: &str) -> Result<VolunteerActivity> {
        // Serialize joins and leaves per project; the transaction re-checks the spots.
        let _guard = self.project_locks.lock(project_id).await;

        let project = self.load_project(project_id).await?;
        if !project.is_open() {
            return Err(AppError::BadRequest(
                "Project is not open for volunteers".to_string(),
            ));
        }

        if self.db.find_activity(&user.id, project_id).await?.is_some() {
            return Err(AppError::Conflict(
                "Already joined this project".to_string(),
            ));
        }

        let activity = VolunteerActivity::joined(
            uuid::Uuid::new_v4().to_string(),
            user.id.clone(),
            project.id.clone(),
            Utc::now(),
        );
        self.db.join_project_atomic(&project.id, &activity).await?;

        Ok(activity)
    }

    /// Leave a project that has not been completed, giving the spot back.
    pub async fn leave(&self, user: &User, activity_id: &str) -> Result<()> {
        let activity = self.load_own_activity(user, activity_id).await?;
        if activity.is_completed() {
            return Err(AppError::BadRequest(
                "Cannot leave a completed project".to_string(),
            ));
        }

        let _project_guard = self.project_locks.lock(&activity.project_id).await;
        let _activity_guard = self.activity_locks.lock(activity_id).await;
        let project = self.db.leave_project_atomic(&user.id, activity_id).await?;

        tracing::info!(
            user_id = %user.id,
            project_id = %project.id,
            spots_available = project.spots_available,
            "Volunteer left project"
        );
        Ok(())
    }

    /// Add hours to an activity, then refresh the user's stats.
    pub async fn log_hours(
        &self,
        user: &User,
        activity_id: &str,
        request: LogHoursRequest,
    ) -> Result<ActivityUpdate> {
        request.validate()?;

        let activity = self.load_own_activity(user, activity_id).await?;
        let project = self.load_project(&activity.project_id).await?;

        let hours = request.hours;
        let max_hours = project.duration;
        let notes = request.notes.filter(|n| !n.trim().is_empty());

        let _guard = self.activity_locks.lock(activity_id).await;
        let activity = self
            .db
            .update_activity_atomic(activity_id, move |activity| {
                activity.log_hours(hours, max_hours, Utc::now())?;
                if let Some(notes) = &notes {
                    activity.notes = Some(notes.clone());
                }
                Ok(())
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            activity_id,
            hours,
            hours_logged = activity.hours_logged,
            "Hours logged"
        );

        let stats = self.refresh_stats(&user.id).await;
        Ok(ActivityUpdate { activity, stats })
    }

    /// Mark an activity completed, then refresh the user's stats.
    pub async fn complete(&self, user: &User, activity_id: &str) -> Result<ActivityUpdate> {
        self.load_own_activity(user, activity_id).await?;

        let _guard = self.activity_locks.lock(activity_id).await;
        let activity = self
            .db
            .update_activity_atomic(activity_id, |activity| activity.complete(Utc::now()))
            .await?;

        tracing::info!(
            user_id = %user.id,
            activity_id,
            hours_verified = activity.hours_verified,
            "Activity completed"
        );

        let stats = self.refresh_stats(&user.id).await;
        Ok(ActivityUpdate { activity, stats })
    }

    /// The user's activities, most recently joined first.
    pub async fn my_activities(&self, user: &User) -> Result<Vec<VolunteerActivity>> {
        let mut activities = self.db.list_activities_for_user(&user.id).await?;
        activities.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
        Ok(activities)
    }

    /// The activity itself is already saved; a failed refresh is retried on the next action.
    async fn refresh_stats(&self, user_id: &str) -> Option<StatsRefresh> {
        match self.stats.refresh_user(user_id).await {
            Ok(refresh) => Some(refresh),
            Err(e) => {
                tracing::error!(user_id, error = %e, "Stats refresh failed");
                None
            }
        }
    }
}
