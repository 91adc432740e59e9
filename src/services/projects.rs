// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Project submission, browsing, and admin review.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{AdminAction, AdminActivity, Project, ProjectStatus, User};

/// Request body for submitting a project.
#[derive(Debug, Deserialize, Validate)]
pub struct NewProject {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub organization: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 300))]
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    /// Expected hours per volunteer
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub duration: f64,
    #[validate(range(min = 1, max = 10000))]
    pub max_volunteers: u32,
}

/// Request body for rejecting a project.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RejectProject {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// Default page size for the admin audit log.
const ADMIN_LOG_LIMIT: u32 = 50;

#[derive(Clone)]
pub struct ProjectService {
    db: FirestoreDb,
}

impl ProjectService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Store a submitted project for admin review.
    pub async fn submit(&self, user: &User, request: NewProject) -> Result<Project> {
        request.validate()?;
        if let Some(end) = request.end_date {
            if end < request.start_date {
                return Err(AppError::BadRequest(
                    "end_date must not be before start_date".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let project = Project {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title.trim().to_string(),
            description: request.description,
            organization: request.organization.trim().to_string(),
            category: request.category.trim().to_lowercase(),
            location: request.location.trim().to_string(),
            start_date: request.start_date,
            end_date: request.end_date,
            duration: request.duration,
            max_volunteers: request.max_volunteers,
            current_volunteers: 0,
            spots_available: request.max_volunteers,
            status: ProjectStatus::Pending,
            is_approved: false,
            created_by_id: user.id.clone(),
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.db.set_project(&project).await?;

        tracing::info!(
            project_id = %project.id,
            created_by = %user.id,
            category = %project.category,
            "Project submitted for review"
        );
        Ok(project)
    }

    /// Projects open for volunteers, optionally limited to one category.
    pub async fn list_open(&self, category: Option<&str>) -> Result<Vec<Project>> {
        let projects = self
            .db
            .list_projects_by_status(ProjectStatus::Active)
            .await?;
        Ok(projects
            .into_iter()
            .filter(Project::is_open)
            .filter(|p| category.map_or(true, |c| p.category.eq_ignore_ascii_case(c.trim())))
            .collect())
    }

    pub async fn get(&self, project_id: &str) -> Result<Project> {
        self.db
            .get_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", project_id)))
    }

    /// Submissions awaiting review.
    pub async fn list_pending(&self, admin: &User) -> Result<Vec<Project>> {
        require_admin(admin)?;
        self.db
            .list_projects_by_status(ProjectStatus::Pending)
            .await
    }

    pub async fn approve(&self, admin: &User, project_id: &str) -> Result<Project> {
        require_admin(admin)?;
        let mut project = self.pending(project_id).await?;

        let now = Utc::now();
        project.approve(now);
        self.db.set_project(&project).await?;
        self.audit(admin, AdminAction::ApproveProject, &project.id, None, now)
            .await;

        tracing::info!(project_id, admin_id = %admin.id, "Project approved");
        Ok(project)
    }

    pub async fn reject(
        &self,
        admin: &User,
        project_id: &str,
        request: RejectProject,
    ) -> Result<Project> {
        require_admin(admin)?;
        request.validate()?;
        let mut project = self.pending(project_id).await?;

        let now = Utc::now();
        let reason = request.reason.filter(|r| !r.trim().is_empty());
        project.reject(reason.clone(), now);
        self.db.set_project(&project).await?;
        self.audit(admin, AdminAction::RejectProject, &project.id, reason, now)
            .await;

        tracing::info!(project_id, admin_id = %admin.id, "Project rejected");
        Ok(project)
    }

    /// Most recent admin actions.
    pub async fn admin_log(&self, admin: &User) -> Result<Vec<AdminActivity>> {
        require_admin(admin)?;
        self.db.list_admin_activities(ADMIN_LOG_LIMIT).await
    }

    async fn pending(&self, project_id: &str) -> Result<Project> {
        let project = self.get(project_id).await?;
        if project.status != ProjectStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Project {} has already been reviewed",
                project_id
            )));
        }
        Ok(project)
    }

    /// The review itself is already stored; a lost audit row is only logged.
    async fn audit(
        &self,
        admin: &User,
        action: AdminAction,
        target_id: &str,
        details: Option<String>,
        now: DateTime<Utc>,
    ) {
        let entry = AdminActivity {
            id: uuid::Uuid::new_v4().to_string(),
            admin_id: admin.id.clone(),
            action,
            target_id: target_id.to_string(),
            details,
            created_at: now,
        };
        if let Err(e) = self.db.record_admin_activity(&entry).await {
            tracing::error!(target_id, error = %e, "Failed to record admin activity");
        }
    }
}

fn require_admin(user: &User) -> Result<()> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}
