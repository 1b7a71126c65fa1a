//! Repository ports consumed by the service layer.
//!
//! Lookups return `Ok(None)` when the record does not exist; only genuine
//! store failures are errors. Services branch on `None` to emit domain
//! errors (`NotFound`/`Forbidden`/`Conflict`) and let I/O failures
//! propagate as internal errors.
//!
//! Each adapter must enforce uniqueness on (workspace_id, user_id),
//! (project_id, user_id), (workspace_id, name), (workspace_id,
//! project_prefix), (project_id, position) and (project_id, status): the
//! service layer's read-check-then-write is a fast path, and the store
//! constraint is what actually wins the race between two concurrent adds.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    invitations::{Invitation, InvitationStatus, NewInvitation},
    pagination::PaginationRequest,
    projects::{NewProject, NewProjectMember, Project, ProjectMember, Workflow},
    users::User,
    workspaces::{NewWorkspace, NewWorkspaceMember, Workspace, WorkspaceMember},
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;
}

#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn create(&self, workspace: NewWorkspace) -> Result<Workspace>;

    async fn find_by_id(&self, workspace_id: Uuid) -> Result<Option<Workspace>>;

    async fn find_member_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>>;

    /// Fails with `Conflict` when the (workspace, user) pair already exists.
    async fn create_member(&self, member: NewWorkspaceMember) -> Result<WorkspaceMember>;
}

/// Keyword-filtered, paginated project member search. The pagination
/// request is expected to be normalized by the caller.
#[derive(Debug, Clone)]
pub struct SearchProjectMembersRequest {
    pub project_id: Uuid,
    pub keyword: Option<String>,
    pub pagination: PaginationRequest,
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: NewProject) -> Result<Project>;

    async fn find_by_workspace_and_name(
        &self,
        workspace_id: Uuid,
        name: &str,
    ) -> Result<Option<Project>>;

    async fn find_by_workspace_and_prefix(
        &self,
        workspace_id: Uuid,
        project_prefix: &str,
    ) -> Result<Option<Project>>;

    /// Projects in the workspace where the user holds a member record.
    async fn find_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Project>>;

    async fn find_by_project_id(&self, project_id: Uuid) -> Result<Option<Project>>;

    async fn find_member_by_project_and_user(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectMember>>;

    /// Returns the matching page plus the total match count.
    async fn search_members(
        &self,
        request: SearchProjectMembersRequest,
    ) -> Result<(Vec<ProjectMember>, i64)>;

    async fn add_positions(&self, project_id: Uuid, positions: Vec<String>) -> Result<()>;

    async fn find_positions(&self, project_id: Uuid) -> Result<Vec<String>>;

    async fn add_members(&self, project_id: Uuid, members: Vec<NewProjectMember>) -> Result<()>;

    async fn add_workflows(&self, project_id: Uuid, workflows: Vec<Workflow>) -> Result<()>;

    async fn find_workflows(&self, project_id: Uuid) -> Result<Vec<Workflow>>;
}

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, invitation: NewInvitation) -> Result<Invitation>;

    async fn find_by_id(&self, invitation_id: Uuid) -> Result<Option<Invitation>>;

    /// The actionable Pending invitation for this invitee, if any. Rows
    /// whose expiry has passed are not returned even when still stored as
    /// Pending.
    async fn find_pending_by_workspace_and_invitee(
        &self,
        workspace_id: Uuid,
        invitee_user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>>;

    async fn list_by_invitee(&self, invitee_user_id: Uuid) -> Result<Vec<Invitation>>;

    async fn list_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Invitation>>;

    /// Flips a Pending invitation to a terminal status and stamps
    /// responded_at. Returns `None` when the invitation is not Pending
    /// anymore (lost race), so the caller can re-read and decide.
    async fn update_status_and_responded_at(
        &self,
        invitation_id: Uuid,
        status: InvitationStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<Invitation>>;
}
