//! Project authorization service.
//!
//! Every mutating operation resolves the caller's membership record first;
//! a missing record and an insufficient role are distinct failures. Set
//! additions (positions, members, workflow statuses) compute the
//! difference against the stored set and write only that difference; the
//! store's uniqueness constraints settle concurrent adds.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    pagination::PaginationResponse,
    projects::{NewProject, NewProjectMember, Project, ProjectStatus, Workflow},
    requests::{
        AddPositionsRequest, AddPositionsResponse, AddProjectMembersRequest,
        AddProjectMembersResponse, AddWorkflowsRequest, AddWorkflowsResponse,
        CreateProjectRequest, CreateProjectResponse, ListProjectMembersRequest,
        ListProjectMembersResponse,
    },
    roles::ProjectRole,
};
use crate::repo::{ProjectRepository, SearchProjectMembersRequest, WorkspaceRepository};

pub struct ProjectService {
    workspaces: Arc<dyn WorkspaceRepository>,
    projects: Arc<dyn ProjectRepository>,
    default_workflows: Vec<Workflow>,
}

impl ProjectService {
    /// `default_workflows` is the seed graph attached to every new project;
    /// pass [`Workflow::default_seed`] for the conventional shape.
    pub fn new(
        workspaces: Arc<dyn WorkspaceRepository>,
        projects: Arc<dyn ProjectRepository>,
        default_workflows: Vec<Workflow>,
    ) -> Self {
        Self {
            workspaces,
            projects,
            default_workflows,
        }
    }

    /// Creates a project. The caller must be a workspace Owner/Moderator;
    /// name and prefix must be unused within the workspace (exact match as
    /// stored). The caller becomes the sole initial member with role Owner
    /// and the project is seeded with the default workflow graph.
    pub async fn create_project(
        &self,
        request: CreateProjectRequest,
        creator_id: Uuid,
    ) -> Result<CreateProjectResponse> {
        if request.name.trim().is_empty() {
            return Err(Error::Validation("project name cannot be empty".to_string()));
        }
        if request.project_prefix.trim().is_empty() {
            return Err(Error::Validation(
                "project prefix cannot be empty".to_string(),
            ));
        }

        let member = self
            .workspaces
            .find_member_by_workspace_and_user(request.workspace_id, creator_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound("user is not a member of this workspace".to_string())
            })?;
        if !member.role.can_manage_workspace() {
            return Err(Error::Forbidden(
                "only a workspace owner or moderator can create projects".to_string(),
            ));
        }

        if self
            .projects
            .find_by_workspace_and_name(request.workspace_id, &request.name)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(format!(
                "project name '{}' already exists in workspace",
                request.name
            )));
        }
        if self
            .projects
            .find_by_workspace_and_prefix(request.workspace_id, &request.project_prefix)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(format!(
                "project prefix '{}' already exists in workspace",
                request.project_prefix
            )));
        }

        let owner = NewProjectMember {
            user_id: member.user_id,
            display_name: member.display_name,
            profile_url: member.profile_url,
            position: None,
            role: ProjectRole::Owner,
        };

        let project = self
            .projects
            .create(NewProject {
                workspace_id: request.workspace_id,
                name: request.name,
                project_prefix: request.project_prefix,
                description: request.description,
                status: ProjectStatus::Active,
                owner,
                workflows: self.default_workflows.clone(),
                created_by: creator_id,
            })
            .await?;

        tracing::info!(
            project_id = %project.id,
            workspace_id = %project.workspace_id,
            prefix = %project.project_prefix,
            "project created"
        );
        Ok(CreateProjectResponse {
            id: project.id,
            workspace_id: project.workspace_id,
            name: project.name,
            project_prefix: project.project_prefix,
            description: project.description,
        })
    }

    /// Projects in the workspace where the caller holds a member record.
    pub async fn list_my_projects(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Project>> {
        self.projects
            .find_by_workspace_and_user(workspace_id, user_id)
            .await
    }

    /// Full project document, visible only to its members. A missing
    /// project is a distinct failure from an unauthorized caller.
    pub async fn get_project_detail(&self, project_id: Uuid, user_id: Uuid) -> Result<Project> {
        self.projects
            .find_member_by_project_and_user(project_id, user_id)
            .await?
            .ok_or_else(|| {
                Error::Forbidden("user is not a member of this project".to_string())
            })?;

        self.projects
            .find_by_project_id(project_id)
            .await?
            .ok_or_else(|| Error::NotFound("project not found".to_string()))
    }

    /// Appends position labels not already present; a pure-subset request
    /// succeeds as a no-op with an informational message.
    pub async fn add_positions(
        &self,
        request: AddPositionsRequest,
        user_id: Uuid,
    ) -> Result<AddPositionsResponse> {
        let member = self
            .projects
            .find_member_by_project_and_user(request.project_id, user_id)
            .await?
            .ok_or_else(|| Error::NotFound("user is not a member of this project".to_string()))?;
        if !member.role.can_manage_project() {
            return Err(Error::Forbidden(
                "only a project owner or moderator can add positions".to_string(),
            ));
        }

        let existing = self.projects.find_positions(request.project_id).await?;
        let mut seen: HashSet<String> = existing.into_iter().collect();
        let mut new_positions = Vec::new();
        for title in request.titles {
            if seen.insert(title.clone()) {
                new_positions.push(title);
            }
        }

        if new_positions.is_empty() {
            return Ok(AddPositionsResponse {
                message: "No new position added".to_string(),
            });
        }

        self.projects
            .add_positions(request.project_id, new_positions)
            .await?;

        Ok(AddPositionsResponse {
            message: "Position added successfully".to_string(),
        })
    }

    pub async fn list_positions(&self, project_id: Uuid) -> Result<Vec<String>> {
        self.projects.find_positions(project_id).await
    }

    /// Adds members to a project. Candidates already in the project are
    /// skipped; a candidate who is not a member of the project's workspace
    /// rejects the whole batch before anything is written.
    pub async fn add_members(
        &self,
        request: AddProjectMembersRequest,
        user_id: Uuid,
    ) -> Result<AddProjectMembersResponse> {
        if request.members.is_empty() {
            return Ok(AddProjectMembersResponse {
                message: "No member added".to_string(),
            });
        }

        let project = self
            .projects
            .find_by_project_id(request.project_id)
            .await?
            .ok_or_else(|| Error::NotFound("project not found".to_string()))?;

        let member = self
            .projects
            .find_member_by_project_and_user(request.project_id, user_id)
            .await?
            .ok_or_else(|| Error::NotFound("user is not a member of this project".to_string()))?;
        if !member.role.can_manage_project() {
            return Err(Error::Forbidden(
                "only a project owner or moderator can add members".to_string(),
            ));
        }

        let mut new_members = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();
        for candidate in request.members {
            let role = ProjectRole::from_str(&candidate.role).ok_or_else(|| {
                Error::Validation(format!("invalid project role: {}", candidate.role))
            })?;

            if !seen.insert(candidate.user_id) {
                continue;
            }

            // idempotent: already a project member
            if self
                .projects
                .find_member_by_project_and_user(request.project_id, candidate.user_id)
                .await?
                .is_some()
            {
                continue;
            }

            // workspace membership is a hard precondition for project
            // membership; one outsider rejects the whole batch
            let workspace_member = self
                .workspaces
                .find_member_by_workspace_and_user(project.workspace_id, candidate.user_id)
                .await?
                .ok_or_else(|| {
                    Error::Forbidden(format!(
                        "user {} is not a member of the project's workspace",
                        candidate.user_id
                    ))
                })?;

            new_members.push(NewProjectMember {
                user_id: candidate.user_id,
                display_name: workspace_member.display_name,
                profile_url: workspace_member.profile_url,
                position: candidate.position,
                role,
            });
        }

        if new_members.is_empty() {
            return Ok(AddProjectMembersResponse {
                message: "No member added".to_string(),
            });
        }

        let added = new_members.len();
        self.projects
            .add_members(request.project_id, new_members)
            .await?;

        tracing::info!(
            project_id = %request.project_id,
            added,
            "project members added"
        );
        Ok(AddProjectMembersResponse {
            message: "Member added successfully".to_string(),
        })
    }

    /// Keyword-filtered, paginated member search with defaulted pagination
    /// fields.
    pub async fn list_members(
        &self,
        mut request: ListProjectMembersRequest,
    ) -> Result<ListProjectMembersResponse> {
        request.pagination.normalize_for_member_search();

        let (members, total_item) = self
            .projects
            .search_members(SearchProjectMembersRequest {
                project_id: request.project_id,
                keyword: request.keyword,
                pagination: request.pagination.clone(),
            })
            .await?;

        Ok(ListProjectMembersResponse {
            members,
            pagination: PaginationResponse::new(
                request.pagination.page,
                request.pagination.page_size,
                total_item,
            ),
        })
    }

    /// Extends the workflow graph with statuses whose names are not
    /// already present. Duplicates are silently dropped.
    ///
    /// Predecessor lists are intentionally not validated against the
    /// existing status set; the graph is permissive by design.
    pub async fn add_workflows(
        &self,
        request: AddWorkflowsRequest,
        user_id: Uuid,
    ) -> Result<AddWorkflowsResponse> {
        self.projects
            .find_by_project_id(request.project_id)
            .await?
            .ok_or_else(|| Error::NotFound("project not found".to_string()))?;

        let member = self
            .projects
            .find_member_by_project_and_user(request.project_id, user_id)
            .await?
            .ok_or_else(|| {
                Error::Forbidden("user is not a member of this project".to_string())
            })?;
        if !member.role.can_manage_project() {
            return Err(Error::Forbidden(
                "only a project owner or moderator can add workflows".to_string(),
            ));
        }

        let existing = self.projects.find_workflows(request.project_id).await?;
        let mut seen: HashSet<String> =
            existing.into_iter().map(|w| w.status).collect();
        let mut new_workflows = Vec::new();
        for workflow in request.workflows {
            if seen.insert(workflow.status.clone()) {
                new_workflows.push(Workflow {
                    status: workflow.status,
                    previous_statuses: workflow.previous_statuses,
                });
            }
        }

        if new_workflows.is_empty() {
            return Ok(AddWorkflowsResponse {
                message: "No new workflow added".to_string(),
            });
        }

        self.projects
            .add_workflows(request.project_id, new_workflows)
            .await?;

        Ok(AddWorkflowsResponse {
            message: "Workflow added successfully".to_string(),
        })
    }

    pub async fn list_workflows(&self, project_id: Uuid) -> Result<Vec<Workflow>> {
        self.projects.find_workflows(project_id).await
    }
}
