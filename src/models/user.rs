// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document ID (UUID v4)
    pub id: String,
    /// Email address from the identity provider (lookup key)
    pub email: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Interest tags (e.g. "environment", "tutoring")
    #[serde(default)]
    pub interests: Vec<String>,
    /// Availability tags (e.g. "weekends", "after_school")
    #[serde(default)]
    pub availability: Vec<String>,

    // ─── Aggregates (written by the stats writer) ────────────────
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub total_projects: u32,
    /// Consecutive weeks with activity, maintained outside the stats writer
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Bumped on every aggregate write; used as an optimistic concurrency token.
    #[serde(default)]
    pub stats_version: u64,

    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_level() -> u32 {
    1
}

fn default_active() -> bool {
    true
}

impl User {
    /// Build a fresh profile for a first-time identity.
    pub fn new(id: String, email: String, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            name,
            school: None,
            grade: None,
            phone: None,
            bio: None,
            interests: Vec::new(),
            availability: Vec::new(),
            total_hours: 0.0,
            total_projects: 0,
            current_streak: 0,
            points: 0,
            level: 1,
            stats_version: 0,
            is_admin: false,
            is_active: true,
            created_at: now,
            last_login_at: now,
            updated_at: now,
        }
    }

    /// Whether the profile still lacks the fields the setup page collects.
    pub fn needs_setup(&self) -> bool {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map_or(true, |s| s.trim().is_empty())
        }
        blank(&self.school) || blank(&self.grade)
    }
}
