// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard reads.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::FirestoreDb;
use crate::models::leaderboard::{platform_stats, rank_users, LEADERBOARD_SIZE};
use crate::models::{LeaderboardEntry, LeaderboardMetric, PlatformStats};

/// Ranked board plus platform-wide totals.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardView {
    pub metric: LeaderboardMetric,
    pub entries: Vec<LeaderboardEntry>,
    pub stats: PlatformStats,
}

#[derive(Clone)]
pub struct LeaderboardService {
    db: FirestoreDb,
}

impl LeaderboardService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Top users for `metric`. A failed fetch yields an empty board.
    pub async fn board(&self, metric: LeaderboardMetric) -> LeaderboardView {
        let users = self.db.list_active_users().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load users for leaderboard");
            Vec::new()
        });

        LeaderboardView {
            metric,
            entries: rank_users(&users, metric, LEADERBOARD_SIZE),
            stats: platform_stats(&users),
        }
    }
}
