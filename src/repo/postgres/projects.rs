use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    pagination::{MEMBER_SORT_JOINED_AT, ORDER_DESC},
    projects::{NewProject, NewProjectMember, Project, ProjectMember, Workflow},
};
use crate::repo::{ProjectRepository, SearchProjectMembersRequest};

use super::{map_insert_error, parse_project_role, parse_project_status, PgRepository};

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    workspace_id: Uuid,
    name: String,
    project_prefix: String,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    created_by: Uuid,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ProjectMemberRow {
    project_id: Uuid,
    user_id: Uuid,
    display_name: String,
    profile_url: Option<String>,
    position: Option<String>,
    role: String,
    joined_at: DateTime<Utc>,
}

impl ProjectMemberRow {
    fn into_member(self) -> Result<ProjectMember> {
        Ok(ProjectMember {
            project_id: self.project_id,
            user_id: self.user_id,
            display_name: self.display_name,
            profile_url: self.profile_url,
            position: self.position,
            role: parse_project_role(&self.role)?,
            joined_at: self.joined_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct WorkflowRow {
    status: String,
    previous_statuses: Vec<String>,
}

impl From<WorkflowRow> for Workflow {
    fn from(row: WorkflowRow) -> Self {
        Workflow {
            status: row.status,
            previous_statuses: row.previous_statuses,
        }
    }
}

impl PgRepository {
    /// Assembles a full project document from its row and satellite tables.
    async fn assemble_project(&self, row: ProjectRow) -> Result<Project> {
        let members = sqlx::query_as::<_, ProjectMemberRow>(
            r#"
            SELECT project_id, user_id, display_name, profile_url, position, role, joined_at
            FROM project_members
            WHERE project_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(row.id)
        .fetch_all(self.pool())
        .await?
        .into_iter()
        .map(ProjectMemberRow::into_member)
        .collect::<Result<Vec<_>>>()?;

        let positions = self.find_positions(row.id).await?;
        let workflows = self.find_workflows(row.id).await?;

        Ok(Project {
            id: row.id,
            workspace_id: row.workspace_id,
            name: row.name,
            project_prefix: row.project_prefix,
            description: row.description,
            status: parse_project_status(&row.status)?,
            members,
            positions,
            workflows,
            created_at: row.created_at,
            created_by: row.created_by,
            updated_at: row.updated_at,
        })
    }

    async fn find_project_row(
        &self,
        where_clause: &str,
        workspace_or_project_id: Uuid,
        extra: Option<&str>,
    ) -> Result<Option<ProjectRow>> {
        let sql = format!(
            "SELECT id, workspace_id, name, project_prefix, description, status, \
             created_at, created_by, updated_at FROM projects WHERE {}",
            where_clause
        );
        let mut query = sqlx::query_as::<_, ProjectRow>(&sql).bind(workspace_or_project_id);
        if let Some(extra) = extra {
            query = query.bind(extra);
        }
        Ok(query.fetch_optional(self.pool()).await?)
    }
}

#[async_trait]
impl ProjectRepository for PgRepository {
    async fn create(&self, new_project: NewProject) -> Result<Project> {
        let mut tx = self.pool().begin().await?;
        let project_id = Uuid::now_v7();

        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects (id, workspace_id, name, project_prefix, description, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, workspace_id, name, project_prefix, description, status,
                      created_at, created_by, updated_at
            "#,
        )
        .bind(project_id)
        .bind(new_project.workspace_id)
        .bind(&new_project.name)
        .bind(&new_project.project_prefix)
        .bind(&new_project.description)
        .bind(new_project.status.as_str())
        .bind(new_project.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, "project name or prefix already exists in workspace"))?;

        let owner = new_project.owner;
        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id, display_name, profile_url, position, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(project_id)
        .bind(owner.user_id)
        .bind(&owner.display_name)
        .bind(&owner.profile_url)
        .bind(&owner.position)
        .bind(owner.role.as_str())
        .execute(&mut *tx)
        .await?;

        for workflow in &new_project.workflows {
            sqlx::query(
                r#"
                INSERT INTO project_workflows (project_id, status, previous_statuses)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(project_id)
            .bind(&workflow.status)
            .bind(&workflow.previous_statuses)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.assemble_project(row).await
    }

    async fn find_by_workspace_and_name(
        &self,
        workspace_id: Uuid,
        name: &str,
    ) -> Result<Option<Project>> {
        let row = self
            .find_project_row("workspace_id = $1 AND name = $2", workspace_id, Some(name))
            .await?;
        match row {
            Some(row) => Ok(Some(self.assemble_project(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_workspace_and_prefix(
        &self,
        workspace_id: Uuid,
        project_prefix: &str,
    ) -> Result<Option<Project>> {
        let row = self
            .find_project_row(
                "workspace_id = $1 AND project_prefix = $2",
                workspace_id,
                Some(project_prefix),
            )
            .await?;
        match row {
            Some(row) => Ok(Some(self.assemble_project(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT p.id, p.workspace_id, p.name, p.project_prefix, p.description, p.status,
                   p.created_at, p.created_by, p.updated_at
            FROM projects p
            JOIN project_members pm ON pm.project_id = p.id
            WHERE p.workspace_id = $1 AND pm.user_id = $2
            ORDER BY p.created_at ASC
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            projects.push(self.assemble_project(row).await?);
        }
        Ok(projects)
    }

    async fn find_by_project_id(&self, project_id: Uuid) -> Result<Option<Project>> {
        let row = self.find_project_row("id = $1", project_id, None).await?;
        match row {
            Some(row) => Ok(Some(self.assemble_project(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_member_by_project_and_user(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectMember>> {
        let row = sqlx::query_as::<_, ProjectMemberRow>(
            r#"
            SELECT project_id, user_id, display_name, profile_url, position, role, joined_at
            FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        row.map(ProjectMemberRow::into_member).transpose()
    }

    async fn search_members(
        &self,
        request: SearchProjectMembersRequest,
    ) -> Result<(Vec<ProjectMember>, i64)> {
        // sort key and order come from the normalized pagination request;
        // both are mapped through a whitelist before hitting the SQL text
        let sort_column = if request.pagination.sort_by == MEMBER_SORT_JOINED_AT {
            "joined_at"
        } else {
            "display_name"
        };
        let order = if request.pagination.order == ORDER_DESC {
            "DESC"
        } else {
            "ASC"
        };
        let keyword = request.keyword.unwrap_or_default().trim().to_string();
        let offset = (request.pagination.page - 1) * request.pagination.page_size;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM project_members
            WHERE project_id = $1 AND ($2 = '' OR display_name ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(request.project_id)
        .bind(&keyword)
        .fetch_one(self.pool())
        .await?;

        let sql = format!(
            "SELECT project_id, user_id, display_name, profile_url, position, role, joined_at \
             FROM project_members \
             WHERE project_id = $1 AND ($2 = '' OR display_name ILIKE '%' || $2 || '%') \
             ORDER BY {} {} LIMIT $3 OFFSET $4",
            sort_column, order
        );
        let members = sqlx::query_as::<_, ProjectMemberRow>(&sql)
            .bind(request.project_id)
            .bind(&keyword)
            .bind(request.pagination.page_size)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
            .into_iter()
            .map(ProjectMemberRow::into_member)
            .collect::<Result<Vec<_>>>()?;

        Ok((members, total))
    }

    async fn add_positions(&self, project_id: Uuid, positions: Vec<String>) -> Result<()> {
        let mut tx = self.pool().begin().await?;
        for position in positions {
            // duplicate inserts from concurrent adds are benign no-ops
            sqlx::query(
                r#"
                INSERT INTO project_positions (project_id, position)
                VALUES ($1, $2)
                ON CONFLICT (project_id, position) DO NOTHING
                "#,
            )
            .bind(project_id)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_positions(&self, project_id: Uuid) -> Result<Vec<String>> {
        let positions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT position
            FROM project_positions
            WHERE project_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;

        Ok(positions)
    }

    async fn add_members(&self, project_id: Uuid, members: Vec<NewProjectMember>) -> Result<()> {
        let mut tx = self.pool().begin().await?;
        for member in members {
            sqlx::query(
                r#"
                INSERT INTO project_members (project_id, user_id, display_name, profile_url, position, role)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(project_id)
            .bind(member.user_id)
            .bind(&member.display_name)
            .bind(&member.profile_url)
            .bind(&member.position)
            .bind(member.role.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_insert_error(e, "user is already a member of this project"))?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn add_workflows(&self, project_id: Uuid, workflows: Vec<Workflow>) -> Result<()> {
        let mut tx = self.pool().begin().await?;
        for workflow in workflows {
            // duplicate inserts from concurrent adds are benign no-ops
            sqlx::query(
                r#"
                INSERT INTO project_workflows (project_id, status, previous_statuses)
                VALUES ($1, $2, $3)
                ON CONFLICT (project_id, status) DO NOTHING
                "#,
            )
            .bind(project_id)
            .bind(&workflow.status)
            .bind(&workflow.previous_statuses)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_workflows(&self, project_id: Uuid) -> Result<Vec<Workflow>> {
        let workflows = sqlx::query_as::<_, WorkflowRow>(
            r#"
            SELECT status, previous_statuses
            FROM project_workflows
            WHERE project_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;

        Ok(workflows.into_iter().map(Workflow::from).collect())
    }
}
