// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Achievement definitions, their criteria, and earned-achievement records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Rule deciding how progress toward an achievement is measured.
///
/// Stored as a tagged object, e.g. `{"type": "category_hours", "category": "environment", "target": 20}`.
/// An unrecognized `type` fails to deserialize instead of silently scoring zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementCriteria {
    /// Distinct completed projects
    ProjectCompletion { target: u32 },
    /// Verified hours on completed activities
    TotalHours { target: f64 },
    /// Verified hours on completed projects in one category
    CategoryHours { category: String, target: f64 },
    /// Distinct completed projects in one category
    CategoryProjects { category: String, target: u32 },
    /// The user's stored weekly streak counter
    WeeklyStreak { target: u32 },
    /// Any completion falling on a Saturday or Sunday
    WeekendCompletion,
    /// Placeholder: counts all distinct completed projects until team data exists
    TeamProjects { target: u32 },
    /// First project joined within `within_days` of the program reference date
    QuickStart { within_days: i64 },
}

impl AchievementCriteria {
    /// Progress value at which the achievement is earned.
    pub fn target(&self) -> f64 {
        match self {
            Self::ProjectCompletion { target }
            | Self::CategoryProjects { target, .. }
            | Self::WeeklyStreak { target }
            | Self::TeamProjects { target } => f64::from(*target),
            Self::TotalHours { target } | Self::CategoryHours { target, .. } => *target,
            Self::WeekendCompletion | Self::QuickStart { .. } => 1.0,
        }
    }

    /// Whether evaluation needs project records (for category lookups).
    pub fn needs_projects(&self) -> bool {
        matches!(
            self,
            Self::CategoryHours { .. } | Self::CategoryProjects { .. }
        )
    }
}

/// Static achievement definition stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    /// Document ID (stable slug, e.g. "hour-hero")
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub criteria: AchievementCriteria,
    /// Reward shown with the badge
    #[serde(default)]
    pub points: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Achievement document as read back from Firestore, criteria still untyped.
///
/// Lets a single malformed definition be skipped instead of failing the whole listing.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredAchievement {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub criteria: serde_json::Value,
    #[serde(default)]
    pub points: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl TryFrom<StoredAchievement> for Achievement {
    type Error = serde_json::Error;

    fn try_from(stored: StoredAchievement) -> Result<Self, Self::Error> {
        Ok(Self {
            criteria: serde_json::from_value(stored.criteria)?,
            id: stored.id,
            name: stored.name,
            description: stored.description,
            icon: stored.icon,
            points: stored.points,
            is_active: stored.is_active,
        })
    }
}

/// Derived progress state; only `Completed` is ever persisted (as a [`UserAchievement`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Record of a user having earned an achievement.
///
/// Document ID is `{user_id}_{achievement_id}` so a pair can only be stored once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAchievement {
    pub user_id: String,
    pub achievement_id: String,
    pub status: AchievementStatus,
    /// Progress value at the time of the award
    pub progress: f64,
    pub earned_at: DateTime<Utc>,
}

impl UserAchievement {
    pub fn doc_id(user_id: &str, achievement_id: &str) -> String {
        format!("{}_{}", user_id, achievement_id)
    }
}

/// Definitions written by the one-time seed when the collection is empty.
pub fn default_achievements() -> Vec<Achievement> {
    fn def(
        id: &str,
        name: &str,
        description: &str,
        icon: &str,
        criteria: AchievementCriteria,
        points: u32,
    ) -> Achievement {
        Achievement {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            criteria,
            points,
            is_active: true,
        }
    }

    use AchievementCriteria::*;
    vec![
        def(
            "first-steps",
            "First Steps",
            "Complete your first volunteer project",
            "🌱",
            ProjectCompletion { target: 1 },
            50,
        ),
        def(
            "hour-hero",
            "Hour Hero",
            "Volunteer for 10 hours",
            "⏰",
            TotalHours { target: 10.0 },
            100,
        ),
        def(
            "dedicated-helper",
            "Dedicated Helper",
            "Volunteer for 50 hours",
            "💪",
            TotalHours { target: 50.0 },
            250,
        ),
        def(
            "project-pro",
            "Project Pro",
            "Complete 5 volunteer projects",
            "🏅",
            ProjectCompletion { target: 5 },
            200,
        ),
        def(
            "eco-warrior",
            "Eco Warrior",
            "Volunteer 20 hours on environmental projects",
            "🌍",
            CategoryHours {
                category: "environment".to_string(),
                target: 20.0,
            },
            150,
        ),
        def(
            "community-builder",
            "Community Builder",
            "Complete 3 community service projects",
            "🏘️",
            CategoryProjects {
                category: "community".to_string(),
                target: 3,
            },
            150,
        ),
        def(
            "streak-master",
            "Streak Master",
            "Volunteer 4 weeks in a row",
            "🔥",
            WeeklyStreak { target: 4 },
            150,
        ),
        def(
            "weekend-warrior",
            "Weekend Warrior",
            "Complete a project on a weekend",
            "🎉",
            WeekendCompletion,
            75,
        ),
        def(
            "team-player",
            "Team Player",
            "Complete 3 team projects",
            "🤝",
            TeamProjects { target: 3 },
            100,
        ),
        def(
            "quick-start",
            "Quick Start",
            "Join a project within your first week",
            "⚡",
            QuickStart { within_days: 7 },
            50,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_tagged_representation() {
        let criteria = AchievementCriteria::CategoryHours {
            category: "environment".into(),
            target: 20.0,
        };
        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "category_hours", "category": "environment", "target": 20.0})
        );

        let unit = serde_json::to_value(AchievementCriteria::WeekendCompletion).unwrap();
        assert_eq!(unit, serde_json::json!({"type": "weekend_completion"}));
    }

    #[test]
    fn test_unknown_criteria_type_is_an_error() {
        let json = serde_json::json!({"type": "total_hourz", "target": 10});
        assert!(serde_json::from_value::<AchievementCriteria>(json).is_err());
    }

    #[test]
    fn test_stored_achievement_conversion() {
        let good: StoredAchievement = serde_json::from_value(serde_json::json!({
            "id": "hour-hero",
            "name": "Hour Hero",
            "criteria": {"type": "total_hours", "target": 10}
        }))
        .unwrap();
        let achievement = Achievement::try_from(good).unwrap();
        assert_eq!(achievement.criteria, AchievementCriteria::TotalHours { target: 10.0 });
        assert!(achievement.is_active);

        let typo: StoredAchievement = serde_json::from_value(serde_json::json!({
            "id": "broken",
            "name": "Broken",
            "criteria": {"type": "category_hour", "target": 10}
        }))
        .unwrap();
        assert!(Achievement::try_from(typo).is_err());
    }

    #[test]
    fn test_targets() {
        assert_eq!(AchievementCriteria::TotalHours { target: 10.0 }.target(), 10.0);
        assert_eq!(AchievementCriteria::ProjectCompletion { target: 3 }.target(), 3.0);
        assert_eq!(AchievementCriteria::WeekendCompletion.target(), 1.0);
        assert_eq!(AchievementCriteria::QuickStart { within_days: 7 }.target(), 1.0);
    }

    #[test]
    fn test_default_achievements_have_unique_ids() {
        let defs = default_achievements();
        let mut ids: Vec<&str> = defs.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), defs.len());
        assert!(defs.iter().any(|a| a.name == "Hour Hero"));
    }

    #[test]
    fn test_user_achievement_doc_id() {
        assert_eq!(UserAchievement::doc_id("u1", "hour-hero"), "u1_hour-hero");
    }
}
