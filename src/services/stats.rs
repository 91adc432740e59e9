// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User stats refresh.
//!
//! Handles the workflow run after an activity changes:
//! 1. Take the per-user lock
//! 2. Read the user and all of their activities
//! 3. Recompute totals and write them if the stored version still matches
//! 4. Award any achievements the new state earns

use crate::db::firestore::StatsWrite;
use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::UserTotals;
use crate::services::achievements::AchievementService;
use crate::services::locks::KeyedLocks;

/// Attempts before a persistent version conflict is surfaced.
const MAX_STATS_ATTEMPTS: u32 = 3;

/// Result of a stats refresh.
#[derive(Debug, Clone)]
pub struct StatsRefresh {
    pub totals: UserTotals,
    /// Whether the user record changed
    pub written: bool,
    /// Achievements awarded by this refresh
    pub awarded: Vec<String>,
}

/// Recomputes and stores per-user aggregates.
#[derive(Clone)]
pub struct StatsService {
    db: FirestoreDb,
    achievements: AchievementService,
    locks: KeyedLocks,
}

impl StatsService {
    pub fn new(db: FirestoreDb, achievements: AchievementService, locks: KeyedLocks) -> Self {
        Self {
            db,
            achievements,
            locks,
        }
    }

    /// Recompute a user's totals from their activities and store them.
    ///
    /// Concurrent refreshes for one user in this instance are serialized by
    /// the per-user lock; writers in other instances are caught by the
    /// stats version check and the refresh is recomputed from fresh data.
    pub async fn refresh_user(&self, user_id: &str) -> Result<StatsRefresh> {
        let _guard = self.locks.lock(user_id).await;

        for attempt in 1..=MAX_STATS_ATTEMPTS {
            let user = self
                .db
                .get_user(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
            let activities = self.db.list_activities_for_user(user_id).await?;
            let totals = UserTotals::from_activities(&activities);

            let written = match self
                .db
                .update_user_stats(user_id, user.stats_version, &totals)
                .await?
            {
                StatsWrite::Written { version } => {
                    tracing::info!(
                        user_id,
                        version,
                        total_hours = totals.total_hours,
                        total_projects = totals.total_projects,
                        points = totals.points,
                        level = totals.level,
                        "User stats updated"
                    );
                    true
                }
                StatsWrite::Unchanged => {
                    tracing::debug!(user_id, "User stats unchanged");
                    false
                }
                StatsWrite::VersionConflict { current } => {
                    tracing::warn!(
                        user_id,
                        attempt,
                        expected = user.stats_version,
                        current,
                        "Stats version conflict, recomputing"
                    );
                    continue;
                }
            };

            let mut updated = user;
            totals.apply_to(&mut updated);

            let awarded = match self.achievements.award_earned(&updated, &activities).await {
                Ok(awarded) => awarded,
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Achievement check failed");
                    Vec::new()
                }
            };

            return Ok(StatsRefresh {
                totals,
                written,
                awarded,
            });
        }

        Err(AppError::Conflict(format!(
            "Stats for user {} changed concurrently, try again",
            user_id
        )))
    }
}
