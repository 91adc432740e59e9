// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Volunteer Tracker: volunteer matching with hours, points and achievements
//!
//! This crate provides the backend API where students join volunteer
//! projects, log hours against them, and earn levels, achievements and
//! leaderboard placements for the work they complete.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{
    AchievementService, KeyedLocks, LeaderboardService, ProfileService, ProjectService,
    StatsService, VolunteerService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub profiles: ProfileService,
    pub projects: ProjectService,
    pub volunteering: VolunteerService,
    pub achievements: AchievementService,
    pub leaderboards: LeaderboardService,
}

impl AppState {
    /// Wire up the services over one database handle.
    ///
    /// Lock maps live here, so every request in this instance shares them.
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        let achievements = AchievementService::new(db.clone(), config.lookup_concurrency);
        let stats = StatsService::new(db.clone(), achievements.clone(), KeyedLocks::new());
        let volunteering = VolunteerService::new(db.clone(), stats, KeyedLocks::new());

        Self {
            profiles: ProfileService::new(db.clone()),
            projects: ProjectService::new(db.clone()),
            leaderboards: LeaderboardService::new(db.clone()),
            volunteering,
            achievements,
            config,
            db,
        }
    }
}
