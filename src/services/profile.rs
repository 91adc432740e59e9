// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resolving authenticated identities to user profiles.

use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{ActivitySummary, HoursBasis, User};
use crate::services::locks::KeyedLocks;

/// Request body for `PUT /api/me`.
///
/// Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub school: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub grade: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(length(max = 20))]
    pub interests: Option<Vec<String>>,
    #[validate(length(max = 14))]
    pub availability: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct ProfileService {
    db: FirestoreDb,
    /// Guards first-login creation, keyed by email
    creation_locks: KeyedLocks,
}

impl ProfileService {
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            db,
            creation_locks: KeyedLocks::new(),
        }
    }

    /// Find the profile for an identity by email, creating it on first sight.
    ///
    /// Updates `last_login_at` on every call. An existing profile only has
    /// that field written.
    pub async fn resolve(&self, email: &str, name: &str) -> Result<User> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::InvalidToken);
        }

        let _guard = self.creation_locks.lock(&email).await;
        let now = Utc::now();

        match self.db.find_user_by_email(&email).await? {
            Some(mut user) => {
                user.last_login_at = now;
                self.db.record_login(&user).await?;
                Ok(user)
            }
            None => {
                let display_name = if name.trim().is_empty() {
                    email.split('@').next().unwrap_or_default().to_string()
                } else {
                    name.trim().to_string()
                };
                let user = User::new(uuid::Uuid::new_v4().to_string(), email, display_name, now);
                self.db.upsert_user(&user).await?;
                tracing::info!(user_id = %user.id, "Created new user profile");
                Ok(user)
            }
        }
    }

    /// The profile for an identity, without touching `last_login_at`.
    ///
    /// Falls back to [`Self::resolve`] when the identity has no profile yet.
    pub async fn current(&self, email: &str, name: &str) -> Result<User> {
        match self.db.find_user_by_email(&normalize_email(email)).await? {
            Some(user) => Ok(user),
            None => self.resolve(email, name).await,
        }
    }

    /// Apply a profile edit.
    ///
    /// Only the profile fields are written; the counters stay with the
    /// stats writer.
    pub async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<User> {
        update.validate()?;

        let mut user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        if let Some(name) = update.name {
            user.name = name.trim().to_string();
        }
        if let Some(school) = update.school {
            user.school = Some(school.trim().to_string());
        }
        if let Some(grade) = update.grade {
            user.grade = Some(grade.trim().to_string());
        }
        if let Some(phone) = update.phone {
            user.phone = non_blank(phone);
        }
        if let Some(bio) = update.bio {
            user.bio = non_blank(bio);
        }
        if let Some(interests) = update.interests {
            user.interests = clean_tags(interests);
        }
        if let Some(availability) = update.availability {
            user.availability = clean_tags(availability);
        }
        user.updated_at = Utc::now();

        self.db.update_user_profile(&user).await?;
        tracing::info!(user_id = %user.id, needs_setup = user.needs_setup(), "Profile updated");
        Ok(user)
    }

    /// Dashboard aggregate; fetch failures yield a zeroed summary.
    pub async fn summary(&self, user: &User) -> ActivitySummary {
        match self.db.list_activities_for_user(&user.id).await {
            Ok(activities) => ActivitySummary::from_activities(&activities, HoursBasis::Verified),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to load activities for summary");
                ActivitySummary::default()
            }
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trim, drop empties, and dedupe while keeping order.
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_tags() {
        let tags = vec![
            " Tutoring".to_string(),
            "tutoring".to_string(),
            "".to_string(),
            "Environment ".to_string(),
        ];
        assert_eq!(clean_tags(tags), vec!["tutoring", "environment"]);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.ORG "), "ada@example.org");
    }

    #[test]
    fn test_profile_update_validation() {
        let empty_name = ProfileUpdate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(empty_name.validate().is_err());

        let ok = ProfileUpdate {
            school: Some("Gunn High".into()),
            grade: Some("11".into()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[tokio::test]
    async fn test_summary_degrades_offline() {
        let service = ProfileService::new(FirestoreDb::new_mock());
        let user = User::new("u1".into(), "a@b.org".into(), "Ada".into(), Utc::now());
        assert_eq!(service.summary(&user).await, ActivitySummary::default());
    }

    #[tokio::test]
    async fn test_invalid_update_rejected_before_read() {
        let service = ProfileService::new(FirestoreDb::new_mock());
        let update = ProfileUpdate {
            grade: Some(String::new()),
            ..Default::default()
        };
        let result = service.update("u1", update).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_resolve_rejects_blank_email() {
        let service = ProfileService::new(FirestoreDb::new_mock());
        let result = service.resolve("   ", "Ada").await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
