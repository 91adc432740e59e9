// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod achievement;
pub mod activity;
pub mod admin;
pub mod challenge;
pub mod leaderboard;
pub mod project;
pub mod stats;
pub mod user;

pub use achievement::{Achievement, AchievementCriteria, AchievementStatus, UserAchievement};
pub use activity::{ActivityStatus, VolunteerActivity};
pub use admin::{AdminAction, AdminActivity};
pub use challenge::{UserChallenge, WeeklyChallenge};
pub use leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardMetric, PlatformStats};
pub use project::{Project, ProjectStatus};
pub use stats::{ActivitySummary, HoursBasis, UserTotals};
pub use user::User;
