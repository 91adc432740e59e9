// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly challenge definitions and per-user challenge progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time-boxed challenge stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyChallenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub target_hours: f64,
    #[serde(default)]
    pub reward_points: u32,
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
}

impl WeeklyChallenge {
    /// Whether `now` falls inside the challenge week.
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.week_start <= now && now < self.week_end
    }
}

/// A user's progress on one challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserChallenge {
    pub id: String,
    pub user_id: String,
    pub challenge_id: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_running_window() {
        let start = Utc::now();
        let challenge = WeeklyChallenge {
            id: "c1".into(),
            title: "Ten for Ten".into(),
            description: "Log ten hours this week".into(),
            target_hours: 10.0,
            reward_points: 50,
            week_start: start,
            week_end: start + Duration::days(7),
            is_active: true,
        };

        assert!(challenge.is_running(start));
        assert!(challenge.is_running(start + Duration::days(3)));
        assert!(!challenge.is_running(start + Duration::days(7)));
        assert!(!challenge.is_running(start - Duration::seconds(1)));

        let inactive = WeeklyChallenge {
            is_active: false,
            ..challenge
        };
        assert!(!inactive.is_running(start));
    }
}
