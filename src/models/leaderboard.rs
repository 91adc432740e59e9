// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard ranking over user aggregates.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::User;

/// Number of entries returned on a leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Field a leaderboard sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardMetric {
    #[default]
    Hours,
    Projects,
    Streak,
    Points,
}

impl LeaderboardMetric {
    /// The user's value for this metric.
    pub fn value(self, user: &User) -> f64 {
        match self {
            Self::Hours => user.total_hours,
            Self::Projects => f64::from(user.total_projects),
            Self::Streak => f64::from(user.current_streak),
            Self::Points => f64::from(user.points),
        }
    }
}

impl FromStr for LeaderboardMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hours" => Ok(Self::Hours),
            "projects" => Ok(Self::Projects),
            "streak" => Ok(Self::Streak),
            "points" => Ok(Self::Points),
            other => Err(format!(
                "Unknown leaderboard metric '{}' (expected hours, projects, streak or points)",
                other
            )),
        }
    }
}

/// Cosmetic rank indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Trophy,
    Gold,
    Silver,
    Bronze,
    Star,
}

impl Badge {
    /// Badge for a 1-based rank, if any.
    pub fn for_rank(rank: u32) -> Option<Self> {
        match rank {
            1 => Some(Self::Trophy),
            2 => Some(Self::Gold),
            3 => Some(Self::Silver),
            4..=5 => Some(Self::Bronze),
            6..=10 => Some(Self::Star),
            _ => None,
        }
    }
}

/// One row of a ranked leaderboard.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub name: String,
    pub school: Option<String>,
    pub level: u32,
    /// Value of the ranked metric
    pub value: f64,
    pub badge: Option<Badge>,
}

/// Platform-wide totals over the active users.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlatformStats {
    pub active_users: u32,
    pub schools: u32,
    pub total_hours: f64,
    pub total_projects: u32,
    pub total_points: u64,
}

/// Configured leaderboard stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Leaderboard {
    pub id: String,
    pub name: String,
    pub metric: LeaderboardMetric,
    /// "all_time", "weekly" or "monthly"
    pub period: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Rank users by a metric and keep the top `limit`.
///
/// The sort is stable, so ties keep the order in which users were fetched.
/// Ranks are positional: 1, 2, 3, ... over the returned slice.
pub fn rank_users(users: &[User], metric: LeaderboardMetric, limit: usize) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&User> = users.iter().collect();
    sorted.sort_by(|a, b| metric.value(b).total_cmp(&metric.value(a)));

    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, user)| {
            let rank = i as u32 + 1;
            LeaderboardEntry {
                rank,
                user_id: user.id.clone(),
                name: user.name.clone(),
                school: user.school.clone(),
                level: user.level,
                value: metric.value(user),
                badge: Badge::for_rank(rank),
            }
        })
        .collect()
}

/// Totals across all given users.
pub fn platform_stats(users: &[User]) -> PlatformStats {
    let schools: HashSet<String> = users
        .iter()
        .filter_map(|u| u.school.as_deref())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    PlatformStats {
        active_users: users.len() as u32,
        schools: schools.len() as u32,
        total_hours: users.iter().map(|u| u.total_hours).sum(),
        total_projects: users.iter().map(|u| u.total_projects).sum(),
        total_points: users.iter().map(|u| u64::from(u.points)).sum(),
    }
}
