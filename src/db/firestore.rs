// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles and aggregate counters)
//! - Projects and volunteer activities
//! - Achievements and earned achievements
//! - Leaderboards, weekly challenges and the admin audit log
//!
//! Filters are equality-only; joins across collections happen in the caller.

use crate::db::collections;
use crate::error::AppError;
use crate::models::achievement::StoredAchievement;
use crate::models::{
    Achievement, AdminActivity, Leaderboard, Project, ProjectStatus, User, UserAchievement,
    UserChallenge, UserTotals, VolunteerActivity, WeeklyChallenge,
};
use chrono::Utc;
use firestore::errors::{BackoffError, FirestoreError};
use firestore::FirestoreTransaction;
use futures_util::{stream, StreamExt};
use std::collections::HashMap;

/// Result of a transaction body. The inner result carries domain rejections,
/// which commit nothing; the outer error aborts the transaction.
type TransactionResult<T> = std::result::Result<Result<T, AppError>, BackoffError<FirestoreError>>;

/// User fields owned by the stats writer.
const STATS_FIELDS: [&str; 6] = [
    "total_hours",
    "total_projects",
    "points",
    "level",
    "stats_version",
    "updated_at",
];

/// User fields editable through the profile.
const PROFILE_FIELDS: [&str; 8] = [
    "name",
    "school",
    "grade",
    "phone",
    "bio",
    "interests",
    "availability",
    "updated_at",
];

/// Outcome of a versioned stats write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsWrite {
    /// Totals written; the user now carries this version.
    Written { version: u64 },
    /// Stored totals already matched; nothing written.
    Unchanged,
    /// Another writer bumped the version since the totals were computed.
    VersionConflict { current: u64 },
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by document ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email (the identity-provider lookup key).
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let mut users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.pop())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All users flagged active (leaderboard input).
    pub async fn list_active_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.field("is_active").eq(true))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write only `fields` of a user document; the rest stays as stored.
    async fn update_user_fields(&self, user: &User, fields: &[&str]) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields.iter().copied())
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Store `last_login_at` without touching profile or counters.
    pub async fn record_login(&self, user: &User) -> Result<(), AppError> {
        self.update_user_fields(user, &["last_login_at"]).await
    }

    /// Store the editable profile fields without touching the counters.
    pub async fn update_user_profile(&self, user: &User) -> Result<(), AppError> {
        self.update_user_fields(user, &PROFILE_FIELDS).await
    }

    /// Write recomputed totals if the stored `stats_version` still matches.
    ///
    /// The user is read inside the transaction, so a writer that commits in
    /// between aborts and retries this one. A match with identical totals
    /// writes nothing, so repeated recomputation is a no-op.
    pub async fn update_user_stats(
        &self,
        user_id: &str,
        expected_version: u64,
        totals: &UserTotals,
    ) -> Result<StatsWrite, AppError> {
        let user_id = user_id.to_string();
        let totals = *totals;

        self.get_client()?
            .run_transaction(|db, transaction| {
                Box::pin(write_stats(
                    db,
                    transaction,
                    user_id.clone(),
                    expected_version,
                    totals,
                ))
            })
            .await
            .map_err(|e| AppError::Database(format!("Stats transaction failed: {}", e)))?
    }

    // ─── Project Operations ──────────────────────────────────────

    /// Get a project by ID.
    pub async fn get_project(&self, project_id: &str) -> Result<Option<Project>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROJECTS)
            .obj()
            .one(project_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List projects in a workflow state, newest first.
    pub async fn list_projects_by_status(
        &self,
        status: ProjectStatus,
    ) -> Result<Vec<Project>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PROJECTS)
            .filter(move |q| q.field("status").eq(status.as_str()))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a project.
    pub async fn set_project(&self, project: &Project) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROJECTS)
            .document_id(&project.id)
            .object(project)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Fetch several projects by ID, keyed by ID.
    ///
    /// Lookups run concurrently (at most `concurrency` in flight). Missing
    /// projects are left out of the map.
    pub async fn get_projects_by_ids(
        &self,
        project_ids: &[String],
        concurrency: usize,
    ) -> Result<HashMap<String, Project>, AppError> {
        self.get_client()?;

        let results = stream::iter(project_ids.to_vec())
            .map(|id| async move { self.get_project(&id).await })
            .buffer_unordered(concurrency.max(1))
            .collect::<Vec<Result<Option<Project>, AppError>>>()
            .await;

        let mut projects = HashMap::with_capacity(results.len());
        for result in results {
            if let Some(project) = result? {
                projects.insert(project.id.clone(), project);
            }
        }
        Ok(projects)
    }

    // ─── Volunteer Activity Operations ───────────────────────────

    /// Get an activity by ID.
    pub async fn get_activity(
        &self,
        activity_id: &str,
    ) -> Result<Option<VolunteerActivity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::VOLUNTEER_ACTIVITIES)
            .obj()
            .one(activity_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All activities belonging to a user.
    pub async fn list_activities_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<VolunteerActivity>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::VOLUNTEER_ACTIVITIES)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The user's activity on a project, if they joined it.
    pub async fn find_activity(
        &self,
        user_id: &str,
        project_id: &str,
    ) -> Result<Option<VolunteerActivity>, AppError> {
        let user_id = user_id.to_string();
        let project_id = project_id.to_string();
        let mut found: Vec<VolunteerActivity> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::VOLUNTEER_ACTIVITIES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("project_id").eq(project_id.clone()),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found.pop())
    }

    /// Store an activity.
    pub async fn set_activity(&self, activity: &VolunteerActivity) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::VOLUNTEER_ACTIVITIES)
            .document_id(&activity.id)
            .object(activity)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Apply `change` to an activity and store it in one transaction.
    ///
    /// The activity is re-read inside the transaction, so `change` always sees
    /// the committed state. An error from `change` writes nothing.
    pub async fn update_activity_atomic<F>(
        &self,
        activity_id: &str,
        change: F,
    ) -> Result<VolunteerActivity, AppError>
    where
        F: Fn(&mut VolunteerActivity) -> Result<(), AppError> + Clone + Send + Sync + 'static,
    {
        let activity_id = activity_id.to_string();

        self.get_client()?
            .run_transaction(|db, transaction| {
                Box::pin(change_activity(
                    db,
                    transaction,
                    activity_id.clone(),
                    change.clone(),
                ))
            })
            .await
            .map_err(|e| AppError::Database(format!("Activity transaction failed: {}", e)))?
    }

    /// Atomically take a spot on a project and store the new activity.
    ///
    /// The project is re-read inside the transaction; a project that closed
    /// or filled up in the meantime is rejected without writes.
    pub async fn join_project_atomic(
        &self,
        project_id: &str,
        activity: &VolunteerActivity,
    ) -> Result<Project, AppError> {
        let project_id = project_id.to_string();

        let project = self
            .get_client()?
            .run_transaction(|db, transaction| {
                Box::pin(join_project(
                    db,
                    transaction,
                    project_id.clone(),
                    activity.clone(),
                ))
            })
            .await
            .map_err(|e| AppError::Database(format!("Join transaction failed: {}", e)))??;

        tracing::info!(
            user_id = %activity.user_id,
            project_id = %project.id,
            spots_available = project.spots_available,
            "Volunteer joined project"
        );
        Ok(project)
    }

    /// Atomically delete a user's activity and give its spot back.
    ///
    /// The activity is re-read inside the transaction: one that is already
    /// gone is NotFound and a completed one is refused, so a spot is released
    /// at most once per activity.
    pub async fn leave_project_atomic(
        &self,
        user_id: &str,
        activity_id: &str,
    ) -> Result<Project, AppError> {
        let user_id = user_id.to_string();
        let activity_id = activity_id.to_string();

        self.get_client()?
            .run_transaction(|db, transaction| {
                Box::pin(leave_project(
                    db,
                    transaction,
                    user_id.clone(),
                    activity_id.clone(),
                ))
            })
            .await
            .map_err(|e| AppError::Database(format!("Leave transaction failed: {}", e)))?
    }

    // ─── Achievement Operations ──────────────────────────────────

    /// All achievement definitions.
    ///
    /// Definitions whose criteria do not parse are logged and skipped.
    pub async fn list_achievements(&self) -> Result<Vec<Achievement>, AppError> {
        let stored: Vec<StoredAchievement> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACHIEVEMENTS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(stored
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                match Achievement::try_from(doc) {
                    Ok(achievement) => Some(achievement),
                    Err(e) => {
                        tracing::warn!(achievement_id = %id, error = %e, "Skipping achievement with invalid criteria");
                        None
                    }
                }
            })
            .collect())
    }

    /// Store an achievement definition.
    pub async fn set_achievement(&self, achievement: &Achievement) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACHIEVEMENTS)
            .document_id(&achievement.id)
            .object(achievement)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Achievements the user has been awarded.
    pub async fn list_user_achievements(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserAchievement>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_ACHIEVEMENTS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the award record for one (user, achievement) pair.
    pub async fn get_user_achievement(
        &self,
        user_id: &str,
        achievement_id: &str,
    ) -> Result<Option<UserAchievement>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_ACHIEVEMENTS)
            .obj()
            .one(UserAchievement::doc_id(user_id, achievement_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store an award record under its deterministic pair ID.
    pub async fn set_user_achievement(&self, award: &UserAchievement) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_ACHIEVEMENTS)
            .document_id(UserAchievement::doc_id(&award.user_id, &award.achievement_id))
            .object(award)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Leaderboards, Challenges, Audit Log ─────────────────────

    /// Configured leaderboards that are switched on.
    pub async fn list_leaderboards(&self) -> Result<Vec<Leaderboard>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::LEADERBOARDS)
            .filter(|q| q.field("is_active").eq(true))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Weekly challenges flagged active.
    pub async fn list_active_challenges(&self) -> Result<Vec<WeeklyChallenge>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WEEKLY_CHALLENGES)
            .filter(|q| q.field("is_active").eq(true))
            .order_by([("week_start", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's challenge progress records.
    pub async fn list_user_challenges(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserChallenge>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_CHALLENGES)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append an entry to the admin audit log.
    pub async fn record_admin_activity(&self, entry: &AdminActivity) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ADMIN_ACTIVITIES)
            .document_id(&entry.id)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Most recent admin audit entries.
    pub async fn list_admin_activities(&self, limit: u32) -> Result<Vec<AdminActivity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ADMIN_ACTIVITIES)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

// ─── Transaction Bodies ──────────────────────────────────────
//
// Reads go through the transaction-bound `db`, which registers the documents
// for conflict detection. Each body runs again if Firestore aborts the commit.

async fn write_stats(
    db: firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    user_id: String,
    expected_version: u64,
    totals: UserTotals,
) -> TransactionResult<StatsWrite> {
    let current: Option<User> = db
        .fluent()
        .select()
        .by_id_in(collections::USERS)
        .obj()
        .one(&user_id)
        .await?;

    let Some(mut user) = current else {
        return Ok(Err(AppError::NotFound(format!("User {} not found", user_id))));
    };

    if user.stats_version != expected_version {
        return Ok(Ok(StatsWrite::VersionConflict {
            current: user.stats_version,
        }));
    }
    if totals.matches(&user) {
        return Ok(Ok(StatsWrite::Unchanged));
    }

    totals.apply_to(&mut user);
    user.stats_version += 1;
    user.updated_at = Utc::now();

    db.fluent()
        .update()
        .fields(STATS_FIELDS)
        .in_col(collections::USERS)
        .document_id(&user.id)
        .object(&user)
        .add_to_transaction(transaction)?;

    Ok(Ok(StatsWrite::Written {
        version: user.stats_version,
    }))
}

async fn change_activity<F>(
    db: firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    activity_id: String,
    change: F,
) -> TransactionResult<VolunteerActivity>
where
    F: Fn(&mut VolunteerActivity) -> Result<(), AppError>,
{
    let current: Option<VolunteerActivity> = db
        .fluent()
        .select()
        .by_id_in(collections::VOLUNTEER_ACTIVITIES)
        .obj()
        .one(&activity_id)
        .await?;

    let Some(mut activity) = current else {
        return Ok(Err(AppError::NotFound(format!(
            "Activity {} not found",
            activity_id
        ))));
    };
    if let Err(e) = change(&mut activity) {
        return Ok(Err(e));
    }

    db.fluent()
        .update()
        .in_col(collections::VOLUNTEER_ACTIVITIES)
        .document_id(&activity.id)
        .object(&activity)
        .add_to_transaction(transaction)?;

    Ok(Ok(activity))
}

async fn join_project(
    db: firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    project_id: String,
    activity: VolunteerActivity,
) -> TransactionResult<Project> {
    let current: Option<Project> = db
        .fluent()
        .select()
        .by_id_in(collections::PROJECTS)
        .obj()
        .one(&project_id)
        .await?;

    let Some(mut project) = current else {
        return Ok(Err(AppError::NotFound(format!(
            "Project {} not found",
            project_id
        ))));
    };
    if !project.is_open() {
        return Ok(Err(AppError::BadRequest(
            "Project is not open for volunteers".to_string(),
        )));
    }
    if !project.reserve_spot(Utc::now()) {
        return Ok(Err(AppError::BadRequest("Project is full".to_string())));
    }

    db.fluent()
        .update()
        .in_col(collections::PROJECTS)
        .document_id(&project.id)
        .object(&project)
        .add_to_transaction(transaction)?;

    db.fluent()
        .update()
        .in_col(collections::VOLUNTEER_ACTIVITIES)
        .document_id(&activity.id)
        .object(&activity)
        .add_to_transaction(transaction)?;

    Ok(Ok(project))
}

async fn leave_project(
    db: firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    user_id: String,
    activity_id: String,
) -> TransactionResult<Project> {
    let current: Option<VolunteerActivity> = db
        .fluent()
        .select()
        .by_id_in(collections::VOLUNTEER_ACTIVITIES)
        .obj()
        .one(&activity_id)
        .await?;

    let Some(activity) = current else {
        return Ok(Err(AppError::NotFound(format!(
            "Activity {} not found",
            activity_id
        ))));
    };
    if activity.user_id != user_id {
        return Ok(Err(AppError::Forbidden(
            "Activity belongs to another user".to_string(),
        )));
    }
    if activity.is_completed() {
        return Ok(Err(AppError::BadRequest(
            "Cannot leave a completed project".to_string(),
        )));
    }

    let current: Option<Project> = db
        .fluent()
        .select()
        .by_id_in(collections::PROJECTS)
        .obj()
        .one(&activity.project_id)
        .await?;

    let Some(mut project) = current else {
        return Ok(Err(AppError::NotFound(format!(
            "Project {} not found",
            activity.project_id
        ))));
    };
    project.release_spot(Utc::now());

    db.fluent()
        .update()
        .in_col(collections::PROJECTS)
        .document_id(&project.id)
        .object(&project)
        .add_to_transaction(transaction)?;

    db.fluent()
        .delete()
        .from(collections::VOLUNTEER_ACTIVITIES)
        .document_id(&activity.id)
        .add_to_transaction(transaction)?;

    Ok(Ok(project))
}
