//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PROJECTS: &str = "projects";
    pub const VOLUNTEER_ACTIVITIES: &str = "volunteer_activities";
    pub const ACHIEVEMENTS: &str = "achievements";
    /// Earned achievements (keyed by `{user_id}_{achievement_id}`)
    pub const USER_ACHIEVEMENTS: &str = "user_achievements";
    pub const LEADERBOARDS: &str = "leaderboards";
    pub const WEEKLY_CHALLENGES: &str = "weekly_challenges";
    pub const USER_CHALLENGES: &str = "user_challenges";
    pub const ADMIN_ACTIVITIES: &str = "admin_activities";
}
