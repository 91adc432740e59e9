// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes.
//!
//! Sign-in happens at the identity provider, which sets the session cookie.
//! This service only ends sessions.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::middleware::auth::SESSION_COOKIE;
use crate::AppState;

/// Non-HttpOnly hint the frontend reads to decide whether to show signed-in UI.
pub const LOGGED_IN_HINT_COOKIE: &str = "volunteer_logged_in";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/logout", post(logout))
}

/// Removal cookie carrying the same attributes the cookie was set with.
fn removal(name: &'static str, http_only: bool, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(http_only)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Clear the session cookies.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let secure = state.config.frontend_url.starts_with("https://");

    let jar = jar
        .remove(removal(SESSION_COOKIE, true, secure))
        .remove(removal(LOGGED_IN_HINT_COOKIE, false, secure));

    tracing::debug!("Session cookies cleared");
    (jar, StatusCode::NO_CONTENT)
}
