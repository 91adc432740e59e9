// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod achievements;
pub mod leaderboard;
pub mod locks;
pub mod profile;
pub mod projects;
pub mod stats;
pub mod volunteering;

pub use achievements::{AchievementProgress, AchievementService};
pub use leaderboard::{LeaderboardService, LeaderboardView};
pub use locks::KeyedLocks;
pub use profile::{ProfileService, ProfileUpdate};
pub use projects::{NewProject, ProjectService, RejectProject};
pub use stats::{StatsRefresh, StatsService};
pub use volunteering::{ActivityUpdate, LogHoursRequest, VolunteerService};
