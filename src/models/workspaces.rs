use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::roles::WorkspaceRole;

/// Top-level tenant unit. Structurally immutable after creation; all
/// membership churn happens on the member records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkspace {
    pub name: String,
    pub created_by: Uuid,
}

/// A user's role-bearing membership in a workspace. The
/// (workspace_id, user_id) pair is unique, enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMember {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub profile_url: Option<String>,
    pub role: WorkspaceRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkspaceMember {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub profile_url: Option<String>,
    pub role: WorkspaceRole,
}
