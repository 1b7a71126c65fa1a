//! Workspace setup. Creating a workspace is the only path that mints an
//! Owner role; every later member arrives through the invitation flow.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    requests::{CreateWorkspaceRequest, CreateWorkspaceResult},
    roles::WorkspaceRole,
    workspaces::{NewWorkspace, NewWorkspaceMember, Workspace},
};
use crate::repo::{UserRepository, WorkspaceRepository};

pub struct WorkspaceService {
    users: Arc<dyn UserRepository>,
    workspaces: Arc<dyn WorkspaceRepository>,
}

impl WorkspaceService {
    pub fn new(users: Arc<dyn UserRepository>, workspaces: Arc<dyn WorkspaceRepository>) -> Self {
        Self { users, workspaces }
    }

    /// Creates a workspace with the caller as its sole Owner member,
    /// copying display metadata from the user record.
    pub async fn create_workspace(
        &self,
        request: CreateWorkspaceRequest,
        creator_id: Uuid,
    ) -> Result<CreateWorkspaceResult> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(Error::Validation(
                "workspace name cannot be empty".to_string(),
            ));
        }
        if name.len() > 100 {
            return Err(Error::Validation(
                "workspace name cannot exceed 100 characters".to_string(),
            ));
        }

        let creator = self
            .users
            .find_by_id(creator_id)
            .await?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))?;

        let workspace = self
            .workspaces
            .create(NewWorkspace {
                name: name.to_string(),
                created_by: creator_id,
            })
            .await?;

        let owner_membership = self
            .workspaces
            .create_member(NewWorkspaceMember {
                workspace_id: workspace.id,
                user_id: creator_id,
                display_name: creator.display_name,
                profile_url: creator.profile_url,
                role: WorkspaceRole::Owner,
            })
            .await?;

        tracing::info!(
            workspace_id = %workspace.id,
            owner = %creator_id,
            "workspace created"
        );
        Ok(CreateWorkspaceResult {
            workspace,
            owner_membership,
        })
    }

    /// Looks up a workspace by id.
    pub async fn get_workspace(&self, workspace_id: Uuid) -> Result<Workspace> {
        self.workspaces
            .find_by_id(workspace_id)
            .await?
            .ok_or_else(|| Error::NotFound("workspace not found".to_string()))
    }
}
