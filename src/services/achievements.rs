// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Achievement evaluation and awarding.
//!
//! Progress is computed from a user's activities, the projects those
//! activities reference, and the user's stored streak counter. The project
//! lookups happen once per evaluation pass and are shared by every
//! achievement checked in that pass.

use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::achievement::default_achievements;
use crate::models::{
    Achievement, AchievementCriteria, AchievementStatus, Project, User, UserAchievement,
    VolunteerActivity,
};
use crate::time_utils::{format_utc_rfc3339, is_weekend, within_days_of};

/// Fixed program start date (2024-01-01T00:00:00Z) used by the quick-start rule.
///
/// The rule compares against this instead of the user's `created_at`;
/// kept as-is pending product clarification.
pub const QUICK_START_REFERENCE_TS: i64 = 1_704_067_200;

/// Projects keyed by ID, built once per evaluation pass.
pub type ProjectIndex = HashMap<String, Project>;

/// Everything an evaluation pass reads.
pub struct EvaluationContext<'a> {
    pub user: &'a User,
    pub activities: &'a [VolunteerActivity],
    pub projects: &'a ProjectIndex,
}

impl EvaluationContext<'_> {
    fn completed(&self) -> impl Iterator<Item = &VolunteerActivity> {
        self.activities.iter().filter(|a| a.is_completed())
    }

    fn completed_in_category<'b>(
        &'b self,
        category: &'b str,
    ) -> impl Iterator<Item = &'b VolunteerActivity> + 'b {
        self.completed().filter(move |a| {
            self.projects
                .get(&a.project_id)
                .is_some_and(|p| p.category.eq_ignore_ascii_case(category))
        })
    }
}

/// Computed progress toward one achievement.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AchievementProgress {
    pub achievement_id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub points: u32,
    pub progress: f64,
    pub target: f64,
    pub is_earned: bool,
    pub status: AchievementStatus,
    /// When the award was stored, if it has been
    pub earned_at: Option<String>,
}

/// Progress value for one criteria rule.
pub fn progress_for(criteria: &AchievementCriteria, ctx: &EvaluationContext<'_>) -> f64 {
    match criteria {
        AchievementCriteria::ProjectCompletion { .. } | AchievementCriteria::TeamProjects { .. } => {
            distinct_projects(ctx.completed()) as f64
        }
        AchievementCriteria::TotalHours { .. } => ctx.completed().map(|a| a.hours_verified).sum(),
        AchievementCriteria::CategoryHours { category, .. } => ctx
            .completed_in_category(category)
            .map(|a| a.hours_verified)
            .sum(),
        AchievementCriteria::CategoryProjects { category, .. } => {
            distinct_projects(ctx.completed_in_category(category)) as f64
        }
        AchievementCriteria::WeeklyStreak { .. } => f64::from(ctx.user.current_streak),
        AchievementCriteria::WeekendCompletion => {
            let on_weekend = ctx
                .completed()
                .any(|a| is_weekend(a.completed_at.unwrap_or(a.joined_at)));
            if on_weekend {
                1.0
            } else {
                0.0
            }
        }
        AchievementCriteria::QuickStart { within_days } => {
            let first_join = ctx.activities.iter().map(|a| a.joined_at).min();
            match first_join {
                Some(joined) if within_days_of(joined, QUICK_START_REFERENCE_TS, *within_days) => {
                    1.0
                }
                _ => 0.0,
            }
        }
    }
}

/// Evaluate one achievement against a context.
pub fn evaluate(achievement: &Achievement, ctx: &EvaluationContext<'_>) -> AchievementProgress {
    let progress = progress_for(&achievement.criteria, ctx);
    let target = achievement.criteria.target();
    let is_earned = progress >= target;
    let status = if is_earned {
        AchievementStatus::Completed
    } else if progress > 0.0 {
        AchievementStatus::InProgress
    } else {
        AchievementStatus::NotStarted
    };

    AchievementProgress {
        achievement_id: achievement.id.clone(),
        name: achievement.name.clone(),
        description: achievement.description.clone(),
        icon: achievement.icon.clone(),
        points: achievement.points,
        progress,
        target,
        is_earned,
        status,
        earned_at: None,
    }
}

fn distinct_projects<'a>(activities: impl Iterator<Item = &'a VolunteerActivity>) -> usize {
    activities
        .map(|a| a.project_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// IDs of projects referenced by completed activities.
fn completed_project_ids(activities: &[VolunteerActivity]) -> Vec<String> {
    let ids: HashSet<&str> = activities
        .iter()
        .filter(|a| a.is_completed())
        .map(|a| a.project_id.as_str())
        .collect();
    ids.into_iter().map(String::from).collect()
}

/// Loads definitions, evaluates them, and stores awards.
#[derive(Clone)]
pub struct AchievementService {
    db: FirestoreDb,
    lookup_concurrency: usize,
}

impl AchievementService {
    pub fn new(db: FirestoreDb, lookup_concurrency: usize) -> Self {
        Self {
            db,
            lookup_concurrency,
        }
    }

    /// Write the default definitions if none exist yet.
    ///
    /// Returns the number of definitions written.
    pub async fn seed_defaults(&self) -> Result<usize> {
        let existing = self.db.list_achievements().await?;
        if !existing.is_empty() {
            tracing::debug!(count = existing.len(), "Achievements already seeded");
            return Ok(0);
        }

        let defaults = default_achievements();
        for achievement in &defaults {
            self.db.set_achievement(achievement).await?;
        }
        tracing::info!(count = defaults.len(), "Seeded default achievements");
        Ok(defaults.len())
    }

    /// Active definitions.
    async fn active_achievements(&self) -> Result<Vec<Achievement>> {
        Ok(self
            .db
            .list_achievements()
            .await?
            .into_iter()
            .filter(|a| a.is_active)
            .collect())
    }

    /// Look up the projects a pass needs, or nothing if no rule uses them.
    async fn project_index(
        &self,
        achievements: &[Achievement],
        activities: &[VolunteerActivity],
    ) -> Result<ProjectIndex> {
        if !achievements.iter().any(|a| a.criteria.needs_projects()) {
            return Ok(ProjectIndex::new());
        }
        let ids = completed_project_ids(activities);
        if ids.is_empty() {
            return Ok(ProjectIndex::new());
        }
        self.db
            .get_projects_by_ids(&ids, self.lookup_concurrency)
            .await
    }

    /// Progress on every active achievement, for display.
    ///
    /// Fetch failures are logged and degrade to empty inputs.
    pub async fn progress_for_user(&self, user: &User) -> Vec<AchievementProgress> {
        let achievements = self.active_achievements().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load achievements");
            Vec::new()
        });
        if achievements.is_empty() {
            return Vec::new();
        }

        let activities = self
            .db
            .list_activities_for_user(&user.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to load activities");
                Vec::new()
            });

        let projects = self
            .project_index(&achievements, &activities)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to load projects");
                ProjectIndex::new()
            });

        let awarded: HashMap<String, UserAchievement> = self
            .db
            .list_user_achievements(&user.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to load awards");
                Vec::new()
            })
            .into_iter()
            .map(|ua| (ua.achievement_id.clone(), ua))
            .collect();

        let ctx = EvaluationContext {
            user,
            activities: &activities,
            projects: &projects,
        };

        achievements
            .iter()
            .map(|achievement| {
                let mut progress = evaluate(achievement, &ctx);
                if let Some(award) = awarded.get(&achievement.id) {
                    // A stored award stays earned even if the inputs changed since.
                    progress.is_earned = true;
                    progress.status = AchievementStatus::Completed;
                    progress.earned_at = Some(format_utc_rfc3339(award.earned_at));
                }
                progress
            })
            .collect()
    }

    /// Evaluate every active achievement and store awards for newly earned ones.
    ///
    /// Pairs that already have an award record are left alone. Returns the
    /// IDs of achievements awarded by this call.
    pub async fn award_earned(
        &self,
        user: &User,
        activities: &[VolunteerActivity],
    ) -> Result<Vec<String>> {
        let achievements = self.active_achievements().await?;
        if achievements.is_empty() {
            return Ok(Vec::new());
        }

        let projects = self.project_index(&achievements, activities).await?;
        let already: HashSet<String> = self
            .db
            .list_user_achievements(&user.id)
            .await?
            .into_iter()
            .map(|ua| ua.achievement_id)
            .collect();

        let ctx = EvaluationContext {
            user,
            activities,
            projects: &projects,
        };

        let mut awarded = Vec::new();
        for achievement in &achievements {
            if already.contains(&achievement.id) {
                continue;
            }
            let progress = evaluate(achievement, &ctx);
            if !progress.is_earned {
                continue;
            }

            // Re-check right before writing; another request may have awarded it.
            if self
                .db
                .get_user_achievement(&user.id, &achievement.id)
                .await?
                .is_some()
            {
                continue;
            }

            let award = UserAchievement {
                user_id: user.id.clone(),
                achievement_id: achievement.id.clone(),
                status: AchievementStatus::Completed,
                progress: progress.progress,
                earned_at: Utc::now(),
            };
            self.db.set_user_achievement(&award).await?;

            tracing::info!(
                user_id = %user.id,
                achievement_id = %achievement.id,
                progress = progress.progress,
                "Achievement awarded"
            );
            awarded.push(achievement.id.clone());
        }

        Ok(awarded)
    }
}
