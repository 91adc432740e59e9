// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::Utc;
use std::sync::Arc;
use volunteer_tracker::config::Config;
use volunteer_tracker::db::FirestoreDb;
use volunteer_tracker::middleware::auth::create_jwt;
use volunteer_tracker::models::{Project, ProjectStatus, User};
use volunteer_tracker::routes::create_router;
use volunteer_tracker::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with an offline database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_frontend_url("http://localhost:5173")
}

#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    let state = Arc::new(AppState::new(config, test_db_offline()));
    (create_router(state.clone()), state)
}

/// Session token for the test signing key.
#[allow(dead_code)]
pub fn create_test_jwt(email: &str) -> String {
    let config = Config::test_default();
    create_jwt("test-subject", email, "Test Volunteer", &config.jwt_signing_key)
        .expect("Failed to create JWT")
}

/// Unique suffix so emulator tests don't collide.
#[allow(dead_code)]
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

#[allow(dead_code)]
pub fn test_user(id: &str) -> User {
    User::new(
        id.to_string(),
        format!("{}@example.org", id),
        "Test Volunteer".to_string(),
        Utc::now(),
    )
}

/// An approved, open project.
#[allow(dead_code)]
pub fn open_project(id: &str, category: &str, duration: f64, spots: u32) -> Project {
    let now = Utc::now();
    Project {
        id: id.to_string(),
        title: format!("Project {}", id),
        description: "Help out".to_string(),
        organization: "Food Bank".to_string(),
        category: category.to_string(),
        location: "Palo Alto".to_string(),
        start_date: now,
        end_date: None,
        duration,
        max_volunteers: spots,
        current_volunteers: 0,
        spots_available: spots,
        status: ProjectStatus::Active,
        is_approved: true,
        created_by_id: "owner".to_string(),
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    }
}
