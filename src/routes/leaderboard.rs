// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard route.

use crate::error::{AppError, Result};
use crate::models::LeaderboardMetric;
use crate::services::LeaderboardView;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/leaderboard", get(get_leaderboard))
}

#[derive(Deserialize)]
struct LeaderboardQuery {
    /// hours | projects | streak | points (default hours)
    metric: Option<String>,
}

/// Top users by the requested metric, plus platform stats.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardView>> {
    let metric = match params.metric.as_deref() {
        None | Some("") => LeaderboardMetric::default(),
        Some(raw) => raw.parse().map_err(AppError::BadRequest)?,
    };

    Ok(Json(state.leaderboards.board(metric).await))
}
