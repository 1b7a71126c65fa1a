//! Shared test fixture
//!
//! Wires the three services over a single in-memory store, so every test
//! exercises the same adapter the Postgres schema mirrors.

// not every test binary uses every helper
#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;
use worktrack::models::{
    projects::Workflow,
    requests::{CreateInvitationRequest, CreateProjectRequest, CreateWorkspaceRequest,
        RespondInvitationRequest},
    users::{NewUser, User},
    workspaces::Workspace,
};
use worktrack::repo::memory::MemoryStore;
use worktrack::services::invitations::InvitationService;
use worktrack::services::projects::ProjectService;
use worktrack::services::workspaces::WorkspaceService;

pub const TEST_VALIDITY_DAYS: i64 = 7;

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub workspaces: WorkspaceService,
    pub invitations: InvitationService,
    pub projects: ProjectService,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let workspaces = WorkspaceService::new(store.clone(), store.clone());
        let invitations = InvitationService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            TEST_VALIDITY_DAYS,
        );
        let projects = ProjectService::new(store.clone(), store.clone(), Workflow::default_seed());
        Self {
            store,
            workspaces,
            invitations,
            projects,
        }
    }

    /// Seeds a user with a unique email derived from the display name.
    pub fn seed_user(&self, display_name: &str) -> User {
        let suffix = Uuid::now_v7().simple().to_string();
        self.store
            .create_user(NewUser {
                email: format!("{}_{}@example.com", display_name.to_lowercase(), suffix),
                full_name: format!("{} Test", display_name),
                display_name: display_name.to_string(),
                profile_url: None,
            })
            .unwrap()
    }

    /// Creates a workspace owned by `owner_id`.
    pub async fn create_workspace(&self, owner_id: Uuid, name: &str) -> Workspace {
        self.workspaces
            .create_workspace(
                CreateWorkspaceRequest {
                    name: name.to_string(),
                },
                owner_id,
            )
            .await
            .unwrap()
            .workspace
    }

    /// Runs the full invitation flow to turn `user_id` into a workspace
    /// member with the given role literal.
    pub async fn join_workspace(
        &self,
        workspace_id: Uuid,
        inviter_id: Uuid,
        user_id: Uuid,
        role: &str,
    ) {
        let invitation = self
            .invitations
            .create_invitation(
                CreateInvitationRequest {
                    workspace_id,
                    invitee_user_id: user_id,
                    role: role.to_string(),
                    custom_message: None,
                },
                inviter_id,
            )
            .await
            .unwrap();
        self.invitations
            .respond_invitation(
                RespondInvitationRequest {
                    invitation_id: invitation.id,
                    action: "ACCEPT".to_string(),
                },
                user_id,
            )
            .await
            .unwrap();
    }

    /// Creates a project in the workspace with the caller as Owner.
    pub async fn create_project(
        &self,
        workspace_id: Uuid,
        creator_id: Uuid,
        name: &str,
        prefix: &str,
    ) -> Uuid {
        self.projects
            .create_project(
                CreateProjectRequest {
                    workspace_id,
                    name: name.to_string(),
                    project_prefix: prefix.to_string(),
                    description: None,
                },
                creator_id,
            )
            .await
            .unwrap()
            .id
    }
}
