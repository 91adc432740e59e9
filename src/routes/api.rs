// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the signed-in user's profile and progress.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ActivitySummary, Leaderboard, User, UserChallenge, WeeklyChallenge};
use crate::routes::current_user;
use crate::services::{AchievementProgress, ProfileUpdate};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).put(update_me))
        .route("/api/me/summary", get(get_summary))
        .route("/api/me/achievements", get(get_achievements))
        .route("/api/me/challenges", get(get_my_challenges))
        .route("/api/challenges", get(get_challenges))
        .route("/api/leaderboards", get(get_leaderboards))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub school: Option<String>,
    pub grade: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub availability: Vec<String>,
    pub total_hours: f64,
    pub total_projects: u32,
    pub current_streak: u32,
    pub points: u32,
    pub level: u32,
    pub is_admin: bool,
    /// Profile is missing school or grade; the UI sends the user to setup
    pub needs_setup: bool,
    pub created_at: String,
    pub last_login_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            needs_setup: user.needs_setup(),
            created_at: format_utc_rfc3339(user.created_at),
            last_login_at: format_utc_rfc3339(user.last_login_at),
            id: user.id,
            email: user.email,
            name: user.name,
            school: user.school,
            grade: user.grade,
            phone: user.phone,
            bio: user.bio,
            interests: user.interests,
            availability: user.availability,
            total_hours: user.total_hours,
            total_projects: user.total_projects,
            current_streak: user.current_streak,
            points: user.points,
            level: user.level,
            is_admin: user.is_admin,
        }
    }
}

/// Get current user profile, creating it on first sign-in.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let user = state.profiles.resolve(&auth.email, &auth.name).await?;
    tracing::debug!(user_id = %user.id, subject = %auth.subject, "Resolved profile");
    Ok(Json(user.into()))
}

/// Update profile fields.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserResponse>> {
    let user = current_user(&state, &auth).await?;
    let user = state.profiles.update(&user.id, update).await?;
    Ok(Json(user.into()))
}

// ─── Progress ────────────────────────────────────────────────

/// Dashboard numbers for the current user.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SummaryResponse {
    pub activities: ActivitySummary,
    pub total_hours: f64,
    pub points: u32,
    pub level: u32,
    pub current_streak: u32,
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<SummaryResponse>> {
    let user = current_user(&state, &auth).await?;
    let activities = state.profiles.summary(&user).await;

    Ok(Json(SummaryResponse {
        activities,
        total_hours: user.total_hours,
        points: user.points,
        level: user.level,
        current_streak: user.current_streak,
    }))
}

/// Progress toward every active achievement.
async fn get_achievements(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<AchievementProgress>>> {
    let user = current_user(&state, &auth).await?;
    Ok(Json(state.achievements.progress_for_user(&user).await))
}

// ─── Challenges & Boards ─────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengeResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub target_hours: f64,
    pub reward_points: u32,
    pub week_start: String,
    pub week_end: String,
    /// Current time falls inside the challenge week
    pub is_running: bool,
}

impl ChallengeResponse {
    fn from_challenge(challenge: WeeklyChallenge, now: chrono::DateTime<Utc>) -> Self {
        Self {
            is_running: challenge.is_running(now),
            week_start: format_utc_rfc3339(challenge.week_start),
            week_end: format_utc_rfc3339(challenge.week_end),
            id: challenge.id,
            title: challenge.title,
            description: challenge.description,
            target_hours: challenge.target_hours,
            reward_points: challenge.reward_points,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserChallengeResponse {
    pub challenge_id: String,
    pub progress: f64,
    pub is_completed: bool,
    pub completed_at: Option<String>,
}

impl From<UserChallenge> for UserChallengeResponse {
    fn from(entry: UserChallenge) -> Self {
        Self {
            challenge_id: entry.challenge_id,
            progress: entry.progress,
            is_completed: entry.is_completed,
            completed_at: entry.completed_at.map(format_utc_rfc3339),
        }
    }
}

/// Active weekly challenges.
async fn get_challenges(State(state): State<Arc<AppState>>) -> Json<Vec<ChallengeResponse>> {
    let challenges = state.db.list_active_challenges().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load weekly challenges");
        Vec::new()
    });

    let now = Utc::now();
    Json(
        challenges
            .into_iter()
            .map(|c| ChallengeResponse::from_challenge(c, now))
            .collect(),
    )
}

/// The current user's challenge progress.
async fn get_my_challenges(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<UserChallengeResponse>>> {
    let user = current_user(&state, &auth).await?;
    let entries = state
        .db
        .list_user_challenges(&user.id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to load user challenges");
            Vec::new()
        });

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Configured leaderboards.
async fn get_leaderboards(State(state): State<Arc<AppState>>) -> Json<Vec<Leaderboard>> {
    Json(state.db.list_leaderboards().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load leaderboards");
        Vec::new()
    }))
}
