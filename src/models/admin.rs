// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Audit log of administrator review actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of review action an administrator took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    ApproveProject,
    RejectProject,
}

/// One administrator action, stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminActivity {
    pub id: String,
    pub admin_id: String,
    pub action: AdminAction,
    /// ID of the record acted upon
    pub target_id: String,
    #[serde(default)]
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}
