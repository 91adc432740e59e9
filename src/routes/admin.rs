// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin review routes. Role checks happen in the project service.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{AdminAction, AdminActivity};
use crate::routes::current_user;
use crate::routes::projects::ProjectResponse;
use crate::services::RejectProject;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/projects/pending", get(list_pending))
        .route("/api/admin/projects/{id}/approve", post(approve))
        .route("/api/admin/projects/{id}/reject", post(reject))
        .route("/api/admin/activity", get(activity_log))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AdminActivityResponse {
    pub id: String,
    pub admin_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub action: AdminAction,
    pub target_id: String,
    pub details: Option<String>,
    pub created_at: String,
}

impl From<AdminActivity> for AdminActivityResponse {
    fn from(entry: AdminActivity) -> Self {
        Self {
            created_at: format_utc_rfc3339(entry.created_at),
            id: entry.id,
            admin_id: entry.admin_id,
            action: entry.action,
            target_id: entry.target_id,
            details: entry.details,
        }
    }
}

async fn list_pending(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ProjectResponse>>> {
    let admin = current_user(&state, &auth).await?;
    let projects = state.projects.list_pending(&admin).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

async fn approve(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>> {
    let admin = current_user(&state, &auth).await?;
    Ok(Json(state.projects.approve(&admin, &id).await?.into()))
}

/// Reject a submission; `{"reason": ...}` is shown to the submitter.
async fn reject(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<RejectProject>,
) -> Result<Json<ProjectResponse>> {
    let admin = current_user(&state, &auth).await?;
    Ok(Json(state.projects.reject(&admin, &id, request).await?.into()))
}

async fn activity_log(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<AdminActivityResponse>>> {
    let admin = current_user(&state, &auth).await?;
    let entries = state.projects.admin_log(&admin).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
