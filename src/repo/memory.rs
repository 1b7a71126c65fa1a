//! In-memory repository adapter.
//!
//! Backs the integration tests and enforces the same uniqueness
//! constraints as the Postgres schema, so the service layer sees identical
//! conflict behavior from both adapters.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    invitations::{Invitation, InvitationStatus, NewInvitation},
    pagination::{MEMBER_SORT_JOINED_AT, ORDER_DESC},
    projects::{NewProject, NewProjectMember, Project, ProjectMember, Workflow},
    users::{NewUser, User},
    workspaces::{NewWorkspace, NewWorkspaceMember, Workspace, WorkspaceMember},
};
use crate::repo::{
    InvitationRepository, ProjectRepository, SearchProjectMembersRequest, UserRepository,
    WorkspaceRepository,
};

/// All entities behind one adapter, per-map locking.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    workspaces: RwLock<HashMap<Uuid, Workspace>>,
    workspace_members: RwLock<HashMap<(Uuid, Uuid), WorkspaceMember>>,
    projects: RwLock<HashMap<Uuid, Project>>,
    invitations: RwLock<HashMap<Uuid, Invitation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user record. User provisioning belongs to the identity
    /// layer, so it is not part of the repository port.
    pub fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut users = write_guard(&self.users)?;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(Error::Conflict(format!(
                "user with email '{}' already exists",
                new_user.email
            )));
        }
        let user = User {
            id: Uuid::now_v7(),
            email: new_user.email,
            full_name: new_user.full_name,
            display_name: new_user.display_name,
            profile_url: new_user.profile_url,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

fn write_guard<'a, T>(lock: &'a RwLock<T>) -> Result<std::sync::RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|_| Error::Internal("store lock poisoned".to_string()))
}

fn read_guard<'a, T>(lock: &'a RwLock<T>) -> Result<std::sync::RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| Error::Internal("store lock poisoned".to_string()))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(read_guard(&self.users)?.get(&user_id).cloned())
    }
}

#[async_trait]
impl WorkspaceRepository for MemoryStore {
    async fn create(&self, new_workspace: NewWorkspace) -> Result<Workspace> {
        let workspace = Workspace {
            id: Uuid::now_v7(),
            name: new_workspace.name,
            created_at: Utc::now(),
            created_by: new_workspace.created_by,
        };
        write_guard(&self.workspaces)?.insert(workspace.id, workspace.clone());
        Ok(workspace)
    }

    async fn find_by_id(&self, workspace_id: Uuid) -> Result<Option<Workspace>> {
        Ok(read_guard(&self.workspaces)?.get(&workspace_id).cloned())
    }

    async fn find_member_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>> {
        Ok(read_guard(&self.workspace_members)?
            .get(&(workspace_id, user_id))
            .cloned())
    }

    async fn create_member(&self, new_member: NewWorkspaceMember) -> Result<WorkspaceMember> {
        let mut members = write_guard(&self.workspace_members)?;
        let key = (new_member.workspace_id, new_member.user_id);
        if members.contains_key(&key) {
            return Err(Error::Conflict(
                "user is already a member of this workspace".to_string(),
            ));
        }
        let member = WorkspaceMember {
            workspace_id: new_member.workspace_id,
            user_id: new_member.user_id,
            display_name: new_member.display_name,
            profile_url: new_member.profile_url,
            role: new_member.role,
            joined_at: Utc::now(),
        };
        members.insert(key, member.clone());
        Ok(member)
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn create(&self, new_project: NewProject) -> Result<Project> {
        let mut projects = write_guard(&self.projects)?;
        // Same uniqueness the Postgres schema enforces with unique indexes.
        for existing in projects.values() {
            if existing.workspace_id == new_project.workspace_id {
                if existing.name == new_project.name {
                    return Err(Error::Conflict(format!(
                        "project name '{}' already exists in workspace",
                        new_project.name
                    )));
                }
                if existing.project_prefix == new_project.project_prefix {
                    return Err(Error::Conflict(format!(
                        "project prefix '{}' already exists in workspace",
                        new_project.project_prefix
                    )));
                }
            }
        }
        let now = Utc::now();
        let project_id = Uuid::now_v7();
        let owner = ProjectMember {
            project_id,
            user_id: new_project.owner.user_id,
            display_name: new_project.owner.display_name,
            profile_url: new_project.owner.profile_url,
            position: new_project.owner.position,
            role: new_project.owner.role,
            joined_at: now,
        };
        let project = Project {
            id: project_id,
            workspace_id: new_project.workspace_id,
            name: new_project.name,
            project_prefix: new_project.project_prefix,
            description: new_project.description,
            status: new_project.status,
            members: vec![owner],
            positions: vec![],
            workflows: new_project.workflows,
            created_at: now,
            created_by: new_project.created_by,
            updated_at: now,
        };
        projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_by_workspace_and_name(
        &self,
        workspace_id: Uuid,
        name: &str,
    ) -> Result<Option<Project>> {
        Ok(read_guard(&self.projects)?
            .values()
            .find(|p| p.workspace_id == workspace_id && p.name == name)
            .cloned())
    }

    async fn find_by_workspace_and_prefix(
        &self,
        workspace_id: Uuid,
        project_prefix: &str,
    ) -> Result<Option<Project>> {
        Ok(read_guard(&self.projects)?
            .values()
            .find(|p| p.workspace_id == workspace_id && p.project_prefix == project_prefix)
            .cloned())
    }

    async fn find_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Project>> {
        let mut found: Vec<Project> = read_guard(&self.projects)?
            .values()
            .filter(|p| {
                p.workspace_id == workspace_id && p.members.iter().any(|m| m.user_id == user_id)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn find_by_project_id(&self, project_id: Uuid) -> Result<Option<Project>> {
        Ok(read_guard(&self.projects)?.get(&project_id).cloned())
    }

    async fn find_member_by_project_and_user(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectMember>> {
        Ok(read_guard(&self.projects)?
            .get(&project_id)
            .and_then(|p| p.members.iter().find(|m| m.user_id == user_id).cloned()))
    }

    async fn search_members(
        &self,
        request: SearchProjectMembersRequest,
    ) -> Result<(Vec<ProjectMember>, i64)> {
        let projects = read_guard(&self.projects)?;
        let Some(project) = projects.get(&request.project_id) else {
            return Ok((vec![], 0));
        };

        let keyword = request
            .keyword
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let mut matches: Vec<ProjectMember> = project
            .members
            .iter()
            .filter(|m| keyword.is_empty() || m.display_name.to_lowercase().contains(&keyword))
            .cloned()
            .collect();

        if request.pagination.sort_by == MEMBER_SORT_JOINED_AT {
            matches.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        } else {
            matches.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        }
        if request.pagination.order == ORDER_DESC {
            matches.reverse();
        }

        let total = matches.len() as i64;
        let offset = ((request.pagination.page - 1) * request.pagination.page_size).max(0) as usize;
        let page: Vec<ProjectMember> = matches
            .into_iter()
            .skip(offset)
            .take(request.pagination.page_size.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn add_positions(&self, project_id: Uuid, positions: Vec<String>) -> Result<()> {
        let mut projects = write_guard(&self.projects)?;
        let project = projects
            .get_mut(&project_id)
            .ok_or_else(|| Error::NotFound("project not found".to_string()))?;
        for position in positions {
            // uniqueness on (project, position); duplicate inserts no-op
            if !project.positions.contains(&position) {
                project.positions.push(position);
            }
        }
        project.updated_at = Utc::now();
        Ok(())
    }

    async fn find_positions(&self, project_id: Uuid) -> Result<Vec<String>> {
        Ok(read_guard(&self.projects)?
            .get(&project_id)
            .map(|p| p.positions.clone())
            .unwrap_or_default())
    }

    async fn add_members(&self, project_id: Uuid, members: Vec<NewProjectMember>) -> Result<()> {
        let mut projects = write_guard(&self.projects)?;
        let project = projects
            .get_mut(&project_id)
            .ok_or_else(|| Error::NotFound("project not found".to_string()))?;
        let mut incoming = std::collections::HashSet::new();
        for new_member in &members {
            if project.members.iter().any(|m| m.user_id == new_member.user_id)
                || !incoming.insert(new_member.user_id)
            {
                return Err(Error::Conflict(
                    "user is already a member of this project".to_string(),
                ));
            }
        }
        let now = Utc::now();
        for new_member in members {
            project.members.push(ProjectMember {
                project_id,
                user_id: new_member.user_id,
                display_name: new_member.display_name,
                profile_url: new_member.profile_url,
                position: new_member.position,
                role: new_member.role,
                joined_at: now,
            });
        }
        project.updated_at = now;
        Ok(())
    }

    async fn add_workflows(&self, project_id: Uuid, workflows: Vec<Workflow>) -> Result<()> {
        let mut projects = write_guard(&self.projects)?;
        let project = projects
            .get_mut(&project_id)
            .ok_or_else(|| Error::NotFound("project not found".to_string()))?;
        for workflow in workflows {
            // uniqueness on (project, status); duplicate inserts no-op
            if !project.workflows.iter().any(|w| w.status == workflow.status) {
                project.workflows.push(workflow);
            }
        }
        project.updated_at = Utc::now();
        Ok(())
    }

    async fn find_workflows(&self, project_id: Uuid) -> Result<Vec<Workflow>> {
        Ok(read_guard(&self.projects)?
            .get(&project_id)
            .map(|p| p.workflows.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl InvitationRepository for MemoryStore {
    async fn create(&self, new_invitation: NewInvitation) -> Result<Invitation> {
        let now = Utc::now();
        let mut invitations = write_guard(&self.invitations)?;

        // Same backstop as the Postgres partial unique index: at most one
        // actionable Pending row per (workspace, invitee). Stale Pending
        // rows are retired rather than left to block the insert.
        for existing in invitations.values_mut() {
            if existing.workspace_id == new_invitation.workspace_id
                && existing.invitee_user_id == new_invitation.invitee_user_id
                && existing.status == InvitationStatus::Pending
            {
                if existing.expired_at <= now {
                    existing.status = InvitationStatus::Expired;
                } else {
                    return Err(Error::Conflict(
                        "a pending invitation already exists for this user".to_string(),
                    ));
                }
            }
        }

        let invitation = Invitation {
            id: Uuid::now_v7(),
            workspace_id: new_invitation.workspace_id,
            invitee_user_id: new_invitation.invitee_user_id,
            role: new_invitation.role,
            status: InvitationStatus::Pending,
            expired_at: new_invitation.expired_at,
            responded_at: None,
            custom_message: new_invitation.custom_message,
            created_at: now,
            created_by: new_invitation.created_by,
        };
        invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn find_by_id(&self, invitation_id: Uuid) -> Result<Option<Invitation>> {
        Ok(read_guard(&self.invitations)?.get(&invitation_id).cloned())
    }

    async fn find_pending_by_workspace_and_invitee(
        &self,
        workspace_id: Uuid,
        invitee_user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>> {
        Ok(read_guard(&self.invitations)?
            .values()
            .find(|i| {
                i.workspace_id == workspace_id
                    && i.invitee_user_id == invitee_user_id
                    && i.status == InvitationStatus::Pending
                    && i.expired_at > now
            })
            .cloned())
    }

    async fn list_by_invitee(&self, invitee_user_id: Uuid) -> Result<Vec<Invitation>> {
        let mut found: Vec<Invitation> = read_guard(&self.invitations)?
            .values()
            .filter(|i| i.invitee_user_id == invitee_user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn list_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Invitation>> {
        let mut found: Vec<Invitation> = read_guard(&self.invitations)?
            .values()
            .filter(|i| i.workspace_id == workspace_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update_status_and_responded_at(
        &self,
        invitation_id: Uuid,
        status: InvitationStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<Invitation>> {
        let mut invitations = write_guard(&self.invitations)?;
        let Some(invitation) = invitations.get_mut(&invitation_id) else {
            return Ok(None);
        };
        // guarded flip: only a Pending row may move to a terminal state
        if invitation.status != InvitationStatus::Pending {
            return Ok(None);
        }
        invitation.status = status;
        invitation.responded_at = Some(responded_at);
        Ok(Some(invitation.clone()))
    }
}
