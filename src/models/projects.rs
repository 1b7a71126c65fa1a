use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::roles::ProjectRole;

/// Project status constants
pub const PROJECT_STATUS_ACTIVE: &str = "ACTIVE";
pub const PROJECT_STATUS_ARCHIVED: &str = "ARCHIVED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectStatus {
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => PROJECT_STATUS_ACTIVE,
            ProjectStatus::Archived => PROJECT_STATUS_ARCHIVED,
        }
    }

    pub fn from_str(status: &str) -> Option<Self> {
        match status {
            PROJECT_STATUS_ACTIVE => Some(ProjectStatus::Active),
            PROJECT_STATUS_ARCHIVED => Some(ProjectStatus::Archived),
            _ => None,
        }
    }
}

/// A unit of work within a workspace, with its own membership, position
/// labels, and workflow graph. (workspace_id, name) and
/// (workspace_id, project_prefix) are unique, enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub project_prefix: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub members: Vec<ProjectMember>,
    pub positions: Vec<String>,
    pub workflows: Vec<Workflow>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub workspace_id: Uuid,
    pub name: String,
    pub project_prefix: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub owner: NewProjectMember,
    pub workflows: Vec<Workflow>,
    pub created_by: Uuid,
}

/// A user's role-bearing membership in a project, independent of their
/// workspace role. Position is a free-text label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub profile_url: Option<String>,
    pub position: Option<String>,
    pub role: ProjectRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProjectMember {
    pub user_id: Uuid,
    pub display_name: String,
    pub profile_url: Option<String>,
    pub position: Option<String>,
    pub role: ProjectRole,
}

/// A node in a project's workflow graph: a task status plus the statuses
/// allowed to immediately precede it. The graph is additive-only after
/// project creation.
///
/// Predecessor names are NOT checked against the existing status set and
/// cycles are not rejected; the graph is permissive by design of the
/// source system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub status: String,
    pub previous_statuses: Vec<String>,
}

impl Workflow {
    /// The conventional seed graph attached to every new project:
    /// Todo -> In Progress -> Done. Injectable via
    /// [`crate::services::projects::ProjectService::new`], so deployments
    /// can vary it.
    pub fn default_seed() -> Vec<Workflow> {
        vec![
            Workflow {
                status: "TODO".to_string(),
                previous_statuses: vec![],
            },
            Workflow {
                status: "IN_PROGRESS".to_string(),
                previous_statuses: vec!["TODO".to_string()],
            },
            Workflow {
                status: "DONE".to_string(),
                previous_statuses: vec!["IN_PROGRESS".to_string()],
            },
        ]
    }
}
