use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    pagination::{PaginationRequest, PaginationResponse},
    projects::ProjectMember,
    workspaces::{Workspace, WorkspaceMember},
};

/// Request for creating a workspace; the caller becomes its sole Owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
}

/// Result of workspace setup: the workspace plus its first member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkspaceResult {
    pub workspace: Workspace,
    pub owner_membership: WorkspaceMember,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub workspace_id: Uuid,
    pub name: String,
    pub project_prefix: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectResponse {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub project_prefix: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPositionsRequest {
    pub project_id: Uuid,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPositionsResponse {
    pub message: String,
}

/// One candidate member in an add-members batch. Role is carried as a
/// string literal and validated against the closed project role
/// enumeration by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMemberRequest {
    pub user_id: Uuid,
    pub position: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddProjectMembersRequest {
    pub project_id: Uuid,
    pub members: Vec<ProjectMemberRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddProjectMembersResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProjectMembersRequest {
    pub project_id: Uuid,
    pub keyword: Option<String>,
    #[serde(default)]
    pub pagination: PaginationRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProjectMembersResponse {
    pub members: Vec<ProjectMember>,
    pub pagination: PaginationResponse,
}

/// One status node in an add-workflows batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRequest {
    pub status: String,
    pub previous_statuses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddWorkflowsRequest {
    pub project_id: Uuid,
    pub workflows: Vec<WorkflowRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddWorkflowsResponse {
    pub message: String,
}

/// Request to invite a user into a workspace. Role is a string literal
/// validated against the invitation role enumeration (Owner is never
/// grantable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitationRequest {
    pub workspace_id: Uuid,
    pub invitee_user_id: Uuid,
    pub role: String,
    pub custom_message: Option<String>,
}

/// Request to accept or decline an invitation. Action is a string literal
/// (`ACCEPT` / `DECLINE`) validated by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondInvitationRequest {
    pub invitation_id: Uuid,
    pub action: String,
}
