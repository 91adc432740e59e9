// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Project browsing and volunteering routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityStatus, Project, ProjectStatus, VolunteerActivity};
use crate::routes::current_user;
use crate::services::{ActivityUpdate, LogHoursRequest, NewProject};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects", get(list_projects).post(submit_project))
        .route("/api/projects/{id}", get(get_project))
        .route("/api/projects/{id}/join", post(join_project))
        .route("/api/me/activities", get(my_activities))
        .route("/api/activities/{id}", delete(leave_project))
        .route("/api/activities/{id}/hours", post(log_hours))
        .route("/api/activities/{id}/complete", post(complete_activity))
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProjectResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub organization: String,
    pub category: String,
    pub location: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub duration: f64,
    pub max_volunteers: u32,
    pub current_volunteers: u32,
    pub spots_available: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub status: ProjectStatus,
    pub is_approved: bool,
    pub rejection_reason: Option<String>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            start_date: format_utc_rfc3339(p.start_date),
            end_date: p.end_date.map(format_utc_rfc3339),
            id: p.id,
            title: p.title,
            description: p.description,
            organization: p.organization,
            category: p.category,
            location: p.location,
            duration: p.duration,
            max_volunteers: p.max_volunteers,
            current_volunteers: p.current_volunteers,
            spots_available: p.spots_available,
            status: p.status,
            is_approved: p.is_approved,
            rejection_reason: p.rejection_reason,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityResponse {
    pub id: String,
    pub project_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub status: ActivityStatus,
    pub hours_logged: f64,
    pub hours_verified: f64,
    pub joined_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub notes: Option<String>,
}

impl From<VolunteerActivity> for ActivityResponse {
    fn from(a: VolunteerActivity) -> Self {
        Self {
            joined_at: format_utc_rfc3339(a.joined_at),
            started_at: a.started_at.map(format_utc_rfc3339),
            completed_at: a.completed_at.map(format_utc_rfc3339),
            id: a.id,
            project_id: a.project_id,
            status: a.status,
            hours_logged: a.hours_logged,
            hours_verified: a.hours_verified,
            notes: a.notes,
        }
    }
}

/// Activity plus the user's refreshed totals after logging or completing.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityUpdateResponse {
    pub activity: ActivityResponse,
    /// Present when the stats refresh succeeded
    pub total_hours: Option<f64>,
    pub points: Option<u32>,
    pub level: Option<u32>,
    /// Achievements earned by this action
    pub new_achievements: Vec<String>,
}

impl From<ActivityUpdate> for ActivityUpdateResponse {
    fn from(update: ActivityUpdate) -> Self {
        let (totals, awarded) = match update.stats {
            Some(refresh) => (Some(refresh.totals), refresh.awarded),
            None => (None, Vec::new()),
        };
        Self {
            activity: update.activity.into(),
            total_hours: totals.map(|t| t.total_hours),
            points: totals.map(|t| t.points),
            level: totals.map(|t| t.level),
            new_achievements: awarded,
        }
    }
}

// ─── Projects ────────────────────────────────────────────────

#[derive(Deserialize)]
struct ProjectsQuery {
    category: Option<String>,
}

/// Open projects, optionally filtered by category.
async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProjectsQuery>,
) -> Result<Json<Vec<ProjectResponse>>> {
    let category = params.category.as_deref().filter(|c| !c.trim().is_empty());
    let projects = state.projects.list_open(category).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>> {
    Ok(Json(state.projects.get(&id).await?.into()))
}

/// Submit a project for admin review.
async fn submit_project(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<NewProject>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let user = current_user(&state, &auth).await?;
    let project = state.projects.submit(&user, request).await?;
    Ok((StatusCode::CREATED, Json(project.into())))
}

// ─── Volunteering ────────────────────────────────────────────

async fn join_project(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ActivityResponse>)> {
    let user = current_user(&state, &auth).await?;
    let activity = state.volunteering.join(&user, &id).await?;
    Ok((StatusCode::CREATED, Json(activity.into())))
}

async fn leave_project(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let user = current_user(&state, &auth).await?;
    state.volunteering.leave(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn log_hours(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<LogHoursRequest>,
) -> Result<Json<ActivityUpdateResponse>> {
    let user = current_user(&state, &auth).await?;
    let update = state.volunteering.log_hours(&user, &id, request).await?;
    Ok(Json(update.into()))
}

async fn complete_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ActivityUpdateResponse>> {
    let user = current_user(&state, &auth).await?;
    let update = state.volunteering.complete(&user, &id).await?;
    Ok(Json(update.into()))
}

async fn my_activities(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ActivityResponse>>> {
    let user = current_user(&state, &auth).await?;
    let activities = state.volunteering.my_activities(&user).await?;
    Ok(Json(activities.into_iter().map(Into::into).collect()))
}
